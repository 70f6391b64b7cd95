// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-scene and per-selection context records.

use serde::{Deserialize, Serialize};

use scenegrid_core::Grid;
use scenegrid_segmentation::Segmentation;
use scenegrid_selection::{SelectionResult, ShapeHint, TraversalLimit};

use crate::describe::describe_regions;
use crate::error::Result;
use crate::snapshot::{
    point2, round2, round2_f32, vector2, BoundsSnapshot, ContextConfig, GridSnapshot,
    RegionSnapshot,
};

/// Everything a downstream reasoner gets about one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    pub grid: GridSnapshot,
    pub regions: Vec<RegionSnapshot>,
    pub description: String,
}

impl SceneContext {
    pub fn build(grid: &Grid, segmentation: &Segmentation, config: &ContextConfig) -> Self {
        let context = Self {
            grid: GridSnapshot::from_grid(grid, config),
            regions: segmentation
                .regions
                .iter()
                .map(RegionSnapshot::from)
                .collect(),
            description: describe_regions(&segmentation.regions),
        };
        tracing::debug!(
            cells = context.grid.cells.len(),
            total_cells = context.grid.total_cells,
            regions = context.regions.len(),
            "Scene context built"
        );
        context
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSnapshot {
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
    Ellipsoid {
        center: [f64; 3],
        radii: [f64; 3],
    },
    Box {
        center: [f64; 3],
        half_extents: [f64; 3],
    },
}

impl From<&ShapeHint> for ShapeSnapshot {
    fn from(shape: &ShapeHint) -> Self {
        match shape {
            ShapeHint::Sphere { center, radius } => ShapeSnapshot::Sphere {
                center: point2(center),
                radius: round2(*radius),
            },
            ShapeHint::Ellipsoid { center, radii } => ShapeSnapshot::Ellipsoid {
                center: point2(center),
                radii: vector2(radii),
            },
            ShapeHint::Box {
                center,
                half_extents,
            } => ShapeSnapshot::Box {
                center: point2(center),
                half_extents: vector2(half_extents),
            },
        }
    }
}

/// Compact record of one click selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub seed: [u32; 3],
    pub cells: usize,
    pub points: u64,
    pub bounds: BoundsSnapshot,
    pub centroid: [f64; 3],
    pub shape: ShapeSnapshot,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<TraversalLimit>,
    pub floor_filter_applied: bool,
    /// Human-readable summary, not meant to be parsed.
    pub diagnostic: String,
}

impl SelectionSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Snapshots a selection together with its diagnostic line.
pub fn selection_context(result: &SelectionResult) -> SelectionSnapshot {
    SelectionSnapshot {
        seed: result.seed_cell.as_array(),
        cells: result.cell_count(),
        points: result.point_count,
        bounds: BoundsSnapshot::from(&result.bounds),
        centroid: point2(&result.centroid),
        shape: ShapeSnapshot::from(&result.suggested_shape),
        confidence: round2_f32(result.confidence),
        limit: result.diagnostics.limit_hit,
        floor_filter_applied: result.diagnostics.floor_filter_applied,
        diagnostic: result.diagnostic_line(),
    }
}
