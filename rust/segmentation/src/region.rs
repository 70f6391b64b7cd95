// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connected region extraction.
//!
//! Labelled cells form a graph whose edges join 6-connected (face-adjacent)
//! cells carrying the identical label. Each connected component becomes one
//! [`Region`]. The visited set and queue live only for the duration of one
//! [`segment`] call.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use scenegrid_core::{Aabb, CellKey, Grid, Rgb};

use crate::classify::{classify_cell, CellFeatures, Classification};
use crate::label::Label;

/// Segmentation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Cells with fewer points are left unlabelled.
    pub min_cell_points: u32,
    /// Normalised heights below this are in the low band.
    pub low_height: f64,
    /// Normalised heights at or above this are in the high band.
    pub high_height: f64,
    /// Minimum occupied Y extent, as a fraction of the nominal cell height,
    /// for a cell to count as vertical.
    pub vertical_extent_fraction: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_cell_points: 10,
            low_height: 0.25,
            high_height: 0.70,
            vertical_extent_fraction: 0.6,
        }
    }
}

/// A maximal connected group of same-labelled cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub label: Label,
    pub member_cells: BTreeSet<CellKey>,
    /// Union of the members' occupied extents.
    pub bounds: Aabb,
    /// Point-count-weighted mean of the members' colours.
    pub dominant_color: Rgb,
    /// Mean of the members' classification confidences.
    pub confidence: f32,
    pub point_count: u64,
}

impl Region {
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.member_cells.len()
    }

    /// One-line description suitable for a prompt or log.
    pub fn summary(&self) -> String {
        let c = self.bounds.center();
        let cells = self.cell_count();
        format!(
            "{} area of {} cell{} ({} points) around ({:.2}, {:.2}, {:.2})",
            self.label.human_name(),
            cells,
            if cells == 1 { "" } else { "s" },
            self.point_count,
            c.x,
            c.y,
            c.z
        )
    }
}

/// Output of one segmentation pass.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Regions sorted by point count, descending; ties keep discovery order.
    pub regions: Vec<Region>,
    /// Per-cell classification of every labelled cell.
    pub cell_labels: FxHashMap<CellKey, Classification>,
    pub labeled_cells: usize,
    /// Occupied cells below `min_cell_points`.
    pub skipped_sparse: usize,
}

impl Segmentation {
    /// Classification of a cell, or `None` if it was too sparse or empty.
    pub fn label_of(&self, key: CellKey) -> Option<&Classification> {
        self.cell_labels.get(&key)
    }

    /// Index of the region containing `key`.
    pub fn region_of(&self, key: CellKey) -> Option<usize> {
        self.regions
            .iter()
            .position(|r| r.member_cells.contains(&key))
    }
}

/// Labels every sufficiently populated cell and groups them into regions.
pub fn segment(grid: &Grid, config: &SegmentationConfig) -> Segmentation {
    let mut out = Segmentation::default();

    for cell in grid.cells() {
        if cell.count < config.min_cell_points {
            out.skipped_sparse += 1;
            continue;
        }
        let features = CellFeatures::from_cell(cell, grid, config);
        out.cell_labels.insert(cell.key, classify_cell(&features));
    }
    out.labeled_cells = out.cell_labels.len();

    let mut visited: FxHashSet<CellKey> = FxHashSet::default();
    let mut queue: VecDeque<CellKey> = VecDeque::new();

    // Seeds are taken in flat-index order so discovery order is stable.
    for seed in grid.cells() {
        let Some(seed_class) = out.cell_labels.get(&seed.key) else {
            continue;
        };
        if !visited.insert(seed.key) {
            continue;
        }

        let label = seed_class.label;
        let mut acc = RegionAccumulator::default();
        queue.push_back(seed.key);

        while let Some(key) = queue.pop_front() {
            let Some(cell) = grid.cell(key) else { continue };
            let confidence = out.cell_labels.get(&key).map_or(0.0, |c| c.confidence);
            acc.add(key, cell.count, &cell.bounds, &cell.mean_color, confidence);

            for neighbor in grid.face_neighbors(key) {
                let same_label = out
                    .cell_labels
                    .get(&neighbor.key)
                    .is_some_and(|c| c.label == label);
                if same_label && visited.insert(neighbor.key) {
                    queue.push_back(neighbor.key);
                }
            }
        }

        out.regions.push(acc.finish(label));
    }

    // Stable sort keeps discovery order among equal counts.
    out.regions.sort_by(|a, b| b.point_count.cmp(&a.point_count));

    tracing::debug!(
        regions = out.regions.len(),
        labeled_cells = out.labeled_cells,
        skipped_sparse = out.skipped_sparse,
        "Segmented grid into regions"
    );

    out
}

#[derive(Default)]
struct RegionAccumulator {
    members: BTreeSet<CellKey>,
    bounds: Option<Aabb>,
    color_sum: [f64; 3],
    confidence_sum: f64,
    point_count: u64,
}

impl RegionAccumulator {
    fn add(&mut self, key: CellKey, count: u32, bounds: &Aabb, color: &Rgb, confidence: f32) {
        self.members.insert(key);
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(bounds),
            None => *bounds,
        });
        let w = count as f64;
        self.color_sum[0] += color.r as f64 * w;
        self.color_sum[1] += color.g as f64 * w;
        self.color_sum[2] += color.b as f64 * w;
        self.confidence_sum += confidence as f64;
        self.point_count += count as u64;
    }

    fn finish(self, label: Label) -> Region {
        let weight = self.point_count.max(1) as f64;
        let cells = self.members.len().max(1) as f64;
        Region {
            label,
            bounds: self.bounds.unwrap_or_default(),
            dominant_color: Rgb::new(
                (self.color_sum[0] / weight) as f32,
                (self.color_sum[1] / weight) as f32,
                (self.color_sum[2] / weight) as f32,
            ),
            confidence: (self.confidence_sum / cells) as f32,
            point_count: self.point_count,
            member_cells: self.members,
        }
    }
}
