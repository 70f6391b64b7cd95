// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection parameters.

use serde::{Deserialize, Serialize};

use scenegrid_core::DEFAULT_MAX_SEARCH_RINGS;

/// Floor exclusion applied after the cluster is grown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorProtection {
    /// Fraction of member cells, ranked by height, removed from the bottom.
    pub bottom_quantile_reject: f64,
    /// The filter is skipped if it would leave fewer cells than this.
    pub min_protected_cells: usize,
    /// Upward centroid shift, as a fraction of the cluster height, applied
    /// when the filter removed cells.
    pub upward_center_bias_factor: f64,
}

impl Default for FloorProtection {
    fn default() -> Self {
        Self {
            bottom_quantile_reject: 0.2,
            min_protected_cells: 3,
            upward_center_bias_factor: 0.1,
        }
    }
}

/// Parameters for [`select_cluster`](crate::select_cluster).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum RGB distance from the seed colour for a cell to be admitted.
    pub color_distance_threshold: f32,
    /// Cells examined, including the seed, before traversal stops.
    pub max_visited_cells: usize,
    /// Cells admitted, including the seed, before traversal stops.
    pub max_cluster_cells: usize,
    /// BFS depth beyond which cells are not expanded.
    pub max_depth: u32,
    /// Chebyshev radius of the neighbourhood expanded from each cell.
    pub neighbor_radius: u32,
    /// Ring-search cap for locating the seed cell.
    pub max_search_rings: u32,
    /// Clusters with a max/min extent ratio below this get a sphere.
    pub sphere_max_ratio: f64,
    /// The largest extent must exceed the second largest by this factor for
    /// an ellipsoid.
    pub ellipsoid_dominance: f64,
    /// Half-extent multiplier for box hints.
    pub box_padding: f64,
    pub floor_protection: Option<FloorProtection>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            color_distance_threshold: 0.25,
            max_visited_cells: 2000,
            max_cluster_cells: 500,
            max_depth: 8,
            neighbor_radius: 1,
            max_search_rings: DEFAULT_MAX_SEARCH_RINGS,
            sphere_max_ratio: 1.6,
            ellipsoid_dominance: 1.8,
            box_padding: 1.12,
            floor_protection: Some(FloorProtection::default()),
        }
    }
}
