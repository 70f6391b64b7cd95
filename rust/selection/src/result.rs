// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection output handed to the edit pipeline.

use std::fmt;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use scenegrid_core::{Aabb, CellKey, LookupKind};

use crate::shape::ShapeHint;

/// A traversal bound that stopped or pruned cluster growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalLimit {
    VisitedCells,
    ClusterSize,
    Depth,
}

impl TraversalLimit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraversalLimit::VisitedCells => "visited_cells",
            TraversalLimit::ClusterSize => "cluster_size",
            TraversalLimit::Depth => "depth",
        }
    }
}

impl fmt::Display for TraversalLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened while growing and filtering one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDiagnostics {
    pub seed_lookup: LookupKind,
    /// Cells examined, including the seed.
    pub visited_cells: usize,
    /// Visited cells rejected for colour distance.
    pub color_rejected: usize,
    /// Deepest BFS level that admitted a cell.
    pub max_depth_reached: u32,
    /// First traversal bound that was hit, if any.
    pub limit_hit: Option<TraversalLimit>,
    /// Cells the floor filter rejects, including those level with the
    /// cutoff. Populated whether or not the filter was applied.
    pub floor_rejected_cells: usize,
    pub floor_filter_applied: bool,
    pub accepted_before_floor: usize,
    pub accepted_after_floor: usize,
    /// Mean colour distance of the final members from the seed colour.
    pub mean_color_distance: f32,
}

impl SelectionDiagnostics {
    pub(crate) fn new(seed_lookup: LookupKind) -> Self {
        Self {
            seed_lookup,
            visited_cells: 1,
            color_rejected: 0,
            max_depth_reached: 0,
            limit_hit: None,
            floor_rejected_cells: 0,
            floor_filter_applied: false,
            accepted_before_floor: 1,
            accepted_after_floor: 1,
            mean_color_distance: 0.0,
        }
    }

    /// Records `limit` unless an earlier bound was already hit.
    pub(crate) fn note_limit(&mut self, limit: TraversalLimit) {
        if self.limit_hit.is_none() {
            self.limit_hit = Some(limit);
        }
    }
}

/// A cluster grown from one click point.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub seed_cell: CellKey,
    /// Members in discovery order, seed first unless floor-filtered out.
    pub member_cells: Vec<CellKey>,
    /// Union of the members' occupied extents.
    pub bounds: Aabb,
    /// Count-weighted centroid, biased upward when the floor filter applied.
    pub centroid: Point3<f64>,
    pub suggested_shape: ShapeHint,
    /// `1 - mean colour distance / threshold`, clamped to `[0, 1]`.
    pub confidence: f32,
    pub point_count: u64,
    pub diagnostics: SelectionDiagnostics,
}

impl SelectionResult {
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.member_cells.len()
    }

    /// Human-readable summary for an upstream reasoning context.
    pub fn diagnostic_line(&self) -> String {
        let d = &self.diagnostics;
        let mut line = format!(
            "selection seed={} cells={} points={} confidence={:.2} shape={}; rejected: color={}, floor={}",
            self.seed_cell,
            self.cell_count(),
            self.point_count,
            self.confidence,
            self.suggested_shape.kind(),
            d.color_rejected,
            if d.floor_filter_applied {
                d.floor_rejected_cells
            } else {
                0
            },
        );
        if d.floor_rejected_cells > 0 && !d.floor_filter_applied {
            line.push_str(&format!(
                "; floor filter skipped ({} of {} cells would remain)",
                d.accepted_before_floor - d.floor_rejected_cells,
                d.accepted_before_floor
            ));
        }
        if let Some(limit) = d.limit_hit {
            line.push_str(&format!("; stopped at {limit} limit"));
        }
        match d.seed_lookup {
            LookupKind::Exact => {}
            LookupKind::Clamped => line.push_str("; seed clamped into bounds"),
            LookupKind::Ring { radius } => {
                line.push_str(&format!("; seed found {radius} ring(s) away"))
            }
        }
        line
    }
}
