// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compact, rounded snapshots of grid cells and regions.
//!
//! Snapshots own plain arrays and strings only, so they can outlive the grid
//! they were taken from. Point-level data never appears here.

use serde::{Deserialize, Serialize};

use scenegrid_core::{Aabb, Cell, Grid, Point3, Vector3};
use scenegrid_segmentation::{Label, Region};

/// Limits applied when snapshotting a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Cells with fewer points are left out.
    pub min_cell_points: u32,
    /// At most this many cells are kept, highest point count first.
    pub max_cells: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            min_cell_points: 10,
            max_cells: 600,
        }
    }
}

/// Rounds to two decimal places. Non-finite values become zero.
#[inline]
pub fn round2(v: f64) -> f64 {
    if v.is_finite() {
        (v * 100.0).round() / 100.0
    } else {
        0.0
    }
}

#[inline]
pub(crate) fn round2_f32(v: f32) -> f64 {
    round2(v as f64)
}

#[inline]
pub(crate) fn point2(p: &Point3<f64>) -> [f64; 3] {
    [round2(p.x), round2(p.y), round2(p.z)]
}

#[inline]
pub(crate) fn vector2(v: &Vector3<f64>) -> [f64; 3] {
    [round2(v.x), round2(v.y), round2(v.z)]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsSnapshot {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl From<&Aabb> for BoundsSnapshot {
    fn from(b: &Aabb) -> Self {
        Self {
            min: point2(&b.min),
            max: point2(&b.max),
        }
    }
}

/// One occupied cell, with abbreviated field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Grid index.
    pub k: [u32; 3],
    /// Nominal world centre.
    pub c: [f64; 3],
    /// Occupied extent size.
    pub s: [f64; 3],
    /// Point count.
    pub n: u32,
    /// Mean colour as six hex digits.
    pub col: String,
    /// Colour variance.
    pub v: f64,
    /// Density over the nominal cell volume.
    pub d: f64,
}

impl CellSnapshot {
    pub fn from_cell(cell: &Cell, grid: &Grid) -> Self {
        Self {
            k: cell.key.as_array(),
            c: point2(&grid.cell_world_center(cell.key)),
            s: vector2(&cell.occupied_size()),
            n: cell.count,
            col: cell.mean_color.to_hex(),
            v: round2_f32(cell.color_variance),
            d: round2_f32(cell.density),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub resolution: [u32; 3],
    pub bounds: BoundsSnapshot,
    pub cell_size: [f64; 3],
    /// Occupied cells in the grid before filtering and truncation.
    pub total_cells: usize,
    /// Kept cells, point count descending, key ascending on ties.
    pub cells: Vec<CellSnapshot>,
}

impl GridSnapshot {
    pub fn from_grid(grid: &Grid, config: &ContextConfig) -> Self {
        let mut kept: Vec<&Cell> = grid
            .cells()
            .iter()
            .filter(|c| c.count >= config.min_cell_points)
            .collect();
        // Cells are stored in key order, so a stable sort keeps keys ascending
        // within equal counts.
        kept.sort_by(|a, b| b.count.cmp(&a.count));
        if kept.len() > config.max_cells {
            tracing::debug!(
                eligible = kept.len(),
                max_cells = config.max_cells,
                "Truncating grid snapshot"
            );
            kept.truncate(config.max_cells);
        }

        Self {
            resolution: grid.resolution(),
            bounds: BoundsSnapshot::from(grid.bounds()),
            cell_size: vector2(&grid.cell_size()),
            total_cells: grid.len(),
            cells: kept
                .into_iter()
                .map(|c| CellSnapshot::from_cell(c, grid))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub label: Label,
    /// Member cell count.
    pub cells: usize,
    pub bounds: BoundsSnapshot,
    /// Dominant colour as six hex digits.
    pub color: String,
    pub confidence: f64,
}

impl From<&Region> for RegionSnapshot {
    fn from(region: &Region) -> Self {
        Self {
            label: region.label,
            cells: region.cell_count(),
            bounds: BoundsSnapshot::from(&region.bounds),
            color: region.dominant_color.to_hex(),
            confidence: round2_f32(region.confidence),
        }
    }
}
