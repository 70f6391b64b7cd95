// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The uniform grid and its occupied cells.
//!
//! Cells live in a dense vector ordered by flat index. A slot table with one
//! entry per grid position maps `(x * ry + y) * rz + z` to the cell's slot,
//! giving O(1) lookup without hashing. Unoccupied positions hold
//! [`EMPTY_SLOT`].

use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::color::Rgb;

/// Slot table marker for an unoccupied grid position.
pub(crate) const EMPTY_SLOT: u32 = u32::MAX;

/// Integer grid coordinates of a cell, each `< resolution` on its axis.
///
/// Ordering is lexicographic `(x, y, z)`, which matches flat-index order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct CellKey {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CellKey {
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn as_array(&self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    /// Signed grid position, convenient for offset arithmetic.
    #[inline]
    pub fn grid_pos(&self) -> (i32, i32, i32) {
        (self.x as i32, self.y as i32, self.z as i32)
    }

    /// Returns the key displaced by `(dx, dy, dz)`, or `None` if the result
    /// leaves the grid.
    pub fn offset(&self, dx: i32, dy: i32, dz: i32, resolution: [u32; 3]) -> Option<CellKey> {
        let shift = |v: u32, d: i32, res: u32| -> Option<u32> {
            let n = v as i64 + d as i64;
            (n >= 0 && n < res as i64).then_some(n as u32)
        };
        Some(CellKey::new(
            shift(self.x, dx, resolution[0])?,
            shift(self.y, dy, resolution[1])?,
            shift(self.z, dz, resolution[2])?,
        ))
    }

    /// Chebyshev distance in grid coordinates.
    pub fn chebyshev(&self, other: &CellKey) -> u32 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl From<[u32; 3]> for CellKey {
    fn from(v: [u32; 3]) -> Self {
        CellKey::new(v[0], v[1], v[2])
    }
}

/// Aggregate statistics for one occupied grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub key: CellKey,
    /// Number of indexed points. Always at least 1.
    pub count: u32,
    pub mean_position: Point3<f64>,
    pub mean_color: Rgb,
    /// Mean of the per-channel colour variances.
    pub color_variance: f32,
    /// Occupied extent, often tighter than the nominal cell.
    pub bounds: Aabb,
    /// Points per unit of nominal cell volume.
    pub density: f32,
    pub point_indices: Vec<u32>,
}

impl Cell {
    /// Signed grid position of this cell.
    #[inline]
    pub fn grid_pos(&self) -> (i32, i32, i32) {
        self.key.grid_pos()
    }

    /// Size of the occupied extent.
    #[inline]
    pub fn occupied_size(&self) -> Vector3<f64> {
        self.bounds.size()
    }
}

/// Counters gathered while building a grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDiagnostics {
    /// Points reported by the source.
    pub total_points: usize,
    /// Points that landed in a cell.
    pub indexed_points: usize,
    /// Points outside the cropped bounds.
    pub dropped_outside: usize,
    /// Points with non-finite positions or validity at or below the threshold.
    pub skipped_invalid: usize,
    pub occupied_cells: usize,
    /// The vertical crop collapsed the box and the raw bounds were used.
    pub used_fallback: bool,
    /// The raw bounds were unusable and the grid is empty.
    pub degenerate_bounds: bool,
}

impl BuildDiagnostics {
    /// Fraction of source points that did not land in any cell.
    pub fn drop_rate(&self) -> f64 {
        if self.total_points == 0 {
            return 0.0;
        }
        1.0 - self.indexed_points as f64 / self.total_points as f64
    }
}

/// A uniform 3D grid over a point cloud, built once per scene.
#[derive(Debug, Clone)]
pub struct Grid {
    resolution: [u32; 3],
    bounds: Aabb,
    raw_bounds: Aabb,
    cell_size: Vector3<f64>,
    cells: Vec<Cell>,
    slots: Vec<u32>,
    diagnostics: BuildDiagnostics,
}

impl Grid {
    pub(crate) fn from_parts(
        resolution: [u32; 3],
        bounds: Aabb,
        raw_bounds: Aabb,
        cell_size: Vector3<f64>,
        cells: Vec<Cell>,
        slots: Vec<u32>,
        diagnostics: BuildDiagnostics,
    ) -> Self {
        Self {
            resolution,
            bounds,
            raw_bounds,
            cell_size,
            cells,
            slots,
            diagnostics,
        }
    }

    /// An empty grid over unusable bounds. Every lookup returns `None`.
    pub(crate) fn degenerate(
        resolution: [u32; 3],
        raw_bounds: Aabb,
        diagnostics: BuildDiagnostics,
    ) -> Self {
        Self::from_parts(
            resolution,
            raw_bounds,
            raw_bounds,
            Vector3::zeros(),
            Vec::new(),
            Vec::new(),
            diagnostics,
        )
    }

    #[inline]
    pub fn resolution(&self) -> [u32; 3] {
        self.resolution
    }

    /// The (possibly cropped) bounds the grid indexes.
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Bounds reported by the bounding volume provider, before cropping.
    #[inline]
    pub fn raw_bounds(&self) -> &Aabb {
        &self.raw_bounds
    }

    /// Nominal cell size per axis. Zero on axes without extent.
    #[inline]
    pub fn cell_size(&self) -> Vector3<f64> {
        self.cell_size
    }

    #[inline]
    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }

    /// Occupied cells in flat-index order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of occupied cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when the grid was built over degenerate bounds.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.slots.is_empty()
    }

    /// Flat index of a key, or `None` if it lies outside the resolution.
    #[inline]
    pub fn flat_index(&self, key: CellKey) -> Option<usize> {
        flat_index(key, self.resolution)
    }

    /// Returns the occupied cell at `key`.
    #[inline]
    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        let flat = self.flat_index(key)?;
        match *self.slots.get(flat)? {
            EMPTY_SLOT => None,
            slot => self.cells.get(slot as usize),
        }
    }

    #[inline]
    pub fn contains_key(&self, key: CellKey) -> bool {
        self.cell(key).is_some()
    }

    /// Nominal world-space box of the grid position `key`.
    pub fn cell_world_bounds(&self, key: CellKey) -> Aabb {
        let offset = Vector3::new(
            key.x as f64 * self.cell_size.x,
            key.y as f64 * self.cell_size.y,
            key.z as f64 * self.cell_size.z,
        );
        let min = self.bounds.min + offset;
        Aabb::new(min, min + self.cell_size)
    }

    /// Nominal world-space centre of the grid position `key`.
    pub fn cell_world_center(&self, key: CellKey) -> Point3<f64> {
        self.cell_world_bounds(key).center()
    }

    /// Position normalised to `[0, 1]` per axis relative to the grid bounds.
    /// Axes without extent normalise to 0.
    pub fn normalized(&self, p: &Point3<f64>) -> Point3<f64> {
        normalize_in(&self.bounds, p)
    }

    /// Grid position containing `p`, or `None` if `p` lies outside the
    /// grid bounds (or the grid is degenerate).
    pub fn key_for_point(&self, p: &Point3<f64>) -> Option<CellKey> {
        if self.is_degenerate() || !self.bounds.contains(p) {
            return None;
        }
        Some(self.key_unchecked(p))
    }

    /// Grid position of `p` after clamping it into the grid bounds.
    pub fn clamped_key(&self, p: &Point3<f64>) -> Option<CellKey> {
        if self.is_degenerate() || !p.iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(self.key_unchecked(&self.bounds.clamp_point(p)))
    }

    fn key_unchecked(&self, p: &Point3<f64>) -> CellKey {
        key_within(&self.bounds, self.resolution, p)
    }
}

/// Flat index `(x * ry + y) * rz + z`, or `None` outside the resolution.
#[inline]
pub(crate) fn flat_index(key: CellKey, resolution: [u32; 3]) -> Option<usize> {
    if key.x >= resolution[0] || key.y >= resolution[1] || key.z >= resolution[2] {
        return None;
    }
    let [_, ry, rz] = resolution.map(|r| r as usize);
    Some((key.x as usize * ry + key.y as usize) * rz + key.z as usize)
}

/// Normalises `p` to `[0, 1]` per axis of `bounds`; flat axes map to 0.
pub(crate) fn normalize_in(bounds: &Aabb, p: &Point3<f64>) -> Point3<f64> {
    let size = bounds.size();
    let axis = |v: f64, min: f64, extent: f64| {
        if extent > 0.0 {
            (v - min) / extent
        } else {
            0.0
        }
    };
    Point3::new(
        axis(p.x, bounds.min.x, size.x),
        axis(p.y, bounds.min.y, size.y),
        axis(p.z, bounds.min.z, size.z),
    )
}

/// Grid position of `p` within `bounds`. Callers check containment first.
pub(crate) fn key_within(bounds: &Aabb, resolution: [u32; 3], p: &Point3<f64>) -> CellKey {
    let n = normalize_in(bounds, p);
    CellKey::new(
        axis_index(n.x, resolution[0]),
        axis_index(n.y, resolution[1]),
        axis_index(n.z, resolution[2]),
    )
}

/// Cell index along one axis for a normalised coordinate. The maximum
/// boundary maps to the last cell.
#[inline]
pub(crate) fn axis_index(normalized: f64, resolution: u32) -> u32 {
    let n = normalized.clamp(0.0, 1.0);
    let idx = (n * resolution as f64).floor() as i64;
    idx.clamp(0, resolution as i64 - 1) as u32
}
