// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-to-cell and cell-to-neighbour queries.
//!
//! [`Grid::locate`] tries, in order: the exact cell containing the point,
//! the cell containing the point clamped into the grid bounds, and an
//! expanding Chebyshev ring search around the clamped cell.
//!
//! Ring `r` cannot contain anything closer than `min(cell_size) * (r - 1)`
//! to the clamped query point, so the search keeps expanding until that
//! bound exceeds the best distance found so far. Stopping at the first hit
//! would be wrong: a diagonal cell in a later ring can sit closer in world
//! space than an axial cell in an earlier one when cells are not cubic or
//! points cluster near cell faces.

use nalgebra::Point3;

use crate::grid::{Cell, CellKey, Grid};

/// Ring-search cap used by [`Grid::cell_at`].
pub const DEFAULT_MAX_SEARCH_RINGS: u32 = 5;

/// How a lookup found its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// The point's own cell is occupied.
    Exact,
    /// The point lay outside the bounds; its clamped cell is occupied.
    Clamped,
    /// Found by ring search at the given Chebyshev radius.
    Ring { radius: u32 },
}

/// Result of a point-to-cell lookup.
#[derive(Debug, Clone, Copy)]
pub struct CellHit<'a> {
    pub cell: &'a Cell,
    pub kind: LookupKind,
    /// World distance from the clamped query point to the cell's mean
    /// position. Zero for exact and clamped hits.
    pub distance: f64,
}

const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

impl Grid {
    /// Returns the occupied cell for `point`, falling back to the nearest
    /// occupied cell within [`DEFAULT_MAX_SEARCH_RINGS`] rings.
    pub fn cell_at(&self, point: &Point3<f64>) -> Option<&Cell> {
        self.locate(point).map(|hit| hit.cell)
    }

    /// Like [`Grid::cell_at`], but reports how the cell was found.
    pub fn locate(&self, point: &Point3<f64>) -> Option<CellHit<'_>> {
        self.locate_within(point, DEFAULT_MAX_SEARCH_RINGS)
    }

    /// Point-to-cell lookup with an explicit ring-search cap.
    pub fn locate_within(&self, point: &Point3<f64>, max_rings: u32) -> Option<CellHit<'_>> {
        if let Some(cell) = self.key_for_point(point).and_then(|k| self.cell(k)) {
            return Some(CellHit {
                cell,
                kind: LookupKind::Exact,
                distance: 0.0,
            });
        }

        let origin = self.clamped_key(point)?;
        if let Some(cell) = self.cell(origin) {
            return Some(CellHit {
                cell,
                kind: LookupKind::Clamped,
                distance: 0.0,
            });
        }

        let clamped = self.bounds().clamp_point(point);
        self.ring_search(origin, &clamped, max_rings)
    }

    fn ring_search(
        &self,
        origin: CellKey,
        query: &Point3<f64>,
        max_rings: u32,
    ) -> Option<CellHit<'_>> {
        let cs = self.cell_size();
        let min_cell = cs.x.min(cs.y).min(cs.z);
        let mut best: Option<(&Cell, f64, u32)> = None;

        for radius in 1..=max_rings {
            if let Some((_, best_sq, _)) = best {
                let ring_min = min_cell * (radius - 1) as f64;
                if ring_min * ring_min > best_sq {
                    break;
                }
            }
            if !self.ring_intersects_grid(origin, radius) {
                break;
            }

            self.for_each_ring_key(origin, radius, |key| {
                if let Some(cell) = self.cell(key) {
                    let d_sq = (cell.mean_position - query).norm_squared();
                    if best.map_or(true, |(_, b, _)| d_sq < b) {
                        best = Some((cell, d_sq, radius));
                    }
                }
            });
        }

        best.map(|(cell, d_sq, radius)| CellHit {
            cell,
            kind: LookupKind::Ring { radius },
            distance: d_sq.sqrt(),
        })
    }

    /// True if any position at Chebyshev distance `radius` from `origin`
    /// lies inside the resolution.
    fn ring_intersects_grid(&self, origin: CellKey, radius: u32) -> bool {
        let res = self.resolution();
        let axis = |v: u32, n: u32| v >= radius || v + radius < n;
        axis(origin.x, res[0]) || axis(origin.y, res[1]) || axis(origin.z, res[2])
    }

    /// Visits every in-grid key on the surface of the cube of half-width
    /// `radius` around `origin`.
    fn for_each_ring_key(&self, origin: CellKey, radius: u32, mut visit: impl FnMut(CellKey)) {
        let r = radius as i64;
        let res = self.resolution();
        let (ox, oy, oz) = (origin.x as i64, origin.y as i64, origin.z as i64);
        let range = |o: i64, n: u32| (o - r).max(0)..=(o + r).min(n as i64 - 1);

        for x in range(ox, res[0]) {
            let x_face = (x - ox).abs() == r;
            for y in range(oy, res[1]) {
                let y_face = (y - oy).abs() == r;
                if x_face || y_face {
                    for z in range(oz, res[2]) {
                        visit(CellKey::new(x as u32, y as u32, z as u32));
                    }
                } else {
                    // Only the two z faces are on the ring surface.
                    for z in [oz - r, oz + r] {
                        if z >= 0 && z < res[2] as i64 {
                            visit(CellKey::new(x as u32, y as u32, z as u32));
                        }
                    }
                }
            }
        }
    }

    /// Occupied cells inside the `(2 * radius + 1)^3` window around `key`,
    /// including the cell at `key` itself when occupied.
    pub fn neighbors(&self, key: CellKey, radius: u32) -> Vec<&Cell> {
        let r = radius as i64;
        let res = self.resolution();
        let range = |o: u32, n: u32| (o as i64 - r).max(0)..=(o as i64 + r).min(n as i64 - 1);

        let mut out = Vec::new();
        for x in range(key.x, res[0]) {
            for y in range(key.y, res[1]) {
                for z in range(key.z, res[2]) {
                    if let Some(cell) = self.cell(CellKey::new(x as u32, y as u32, z as u32)) {
                        out.push(cell);
                    }
                }
            }
        }
        out
    }

    /// Occupied cells sharing a face with `key`.
    pub fn face_neighbors(&self, key: CellKey) -> impl Iterator<Item = &Cell> + '_ {
        let res = self.resolution();
        FACE_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy, dz)| key.offset(dx, dy, dz, res))
            .filter_map(move |k| self.cell(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::builder::{GridBuilder, GridConfig};
    use crate::color::Rgb;
    use crate::source::PointBuffer;
    use approx::assert_relative_eq;

    fn build(points: &[(f64, f64, f64)], world: f64, res: u32) -> Grid {
        let buffer: PointBuffer = points
            .iter()
            .map(|&(x, y, z)| (Point3::new(x, y, z), Rgb::WHITE))
            .collect();
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(world, world, world));
        GridBuilder::new(GridConfig {
            resolution: [res, res, res],
            vertical_crop: (0.0, 0.0),
            ..Default::default()
        })
        .build(&buffer, &bounds)
        .unwrap()
    }

    #[test]
    fn exact_hit() {
        let grid = build(&[(2.5, 2.5, 2.5)], 10.0, 10);
        let hit = grid.locate(&Point3::new(2.1, 2.9, 2.0)).unwrap();
        assert_eq!(hit.kind, LookupKind::Exact);
        assert_eq!(hit.cell.key, CellKey::new(2, 2, 2));
    }

    #[test]
    fn clamped_hit_outside_bounds() {
        let grid = build(&[(9.5, 9.5, 9.5)], 10.0, 10);
        let hit = grid.locate(&Point3::new(14.0, 12.0, 30.0)).unwrap();
        assert_eq!(hit.kind, LookupKind::Clamped);
        assert_eq!(hit.cell.key, CellKey::new(9, 9, 9));
    }

    #[test]
    fn cell_contains_normalized_coordinate() {
        let points: Vec<_> = (1..10)
            .map(|i| {
                let t = i as f64 * 1.07;
                (t, 10.0 - t, (t * 3.3) % 10.0)
            })
            .collect();
        let grid = build(&points, 10.0, 7);
        let res = grid.resolution();
        for &(x, y, z) in &points {
            let p = Point3::new(x, y, z);
            let cell = grid.cell_at(&p).unwrap();
            let n = grid.normalized(&p);
            let k = cell.key;
            let scaled = [n.x * res[0] as f64, n.y * res[1] as f64, n.z * res[2] as f64];
            for (axis, &v) in k.as_array().iter().enumerate() {
                assert!(v as f64 <= scaled[axis] && scaled[axis] <= (v + 1) as f64);
            }
        }
    }

    #[test]
    fn cell_contains_coordinate_normalised_against_cropped_bounds() {
        // Default crop trims y to [1, 9] in a 10-unit world.
        let points: Vec<_> = (1..12)
            .map(|i| {
                let t = i as f64 * 0.83;
                (t, 1.05 + t * 0.71, (t * 2.9) % 10.0)
            })
            .collect();
        let buffer: PointBuffer = points
            .iter()
            .map(|&(x, y, z)| (Point3::new(x, y, z), Rgb::WHITE))
            .collect();
        let world = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let grid = GridBuilder::new(GridConfig::with_resolution([7, 7, 7]))
            .build(&buffer, &world)
            .unwrap();
        assert_relative_eq!(grid.bounds().min.y, 1.0);
        assert_relative_eq!(grid.bounds().max.y, 9.0);
        assert_eq!(grid.diagnostics().indexed_points, points.len());

        for &(x, y, z) in &points {
            let key = grid.cell_at(&Point3::new(x, y, z)).unwrap().key;
            let scaled = [x / 10.0 * 7.0, (y - 1.0) / 8.0 * 7.0, z / 10.0 * 7.0];
            for (axis, &v) in key.as_array().iter().enumerate() {
                assert!(v as f64 <= scaled[axis] + 1e-9 && scaled[axis] <= (v + 1) as f64 + 1e-9);
            }
        }
    }

    #[test]
    fn non_finite_query_finds_nothing() {
        let grid = build(&[(4.5, 4.5, 4.5)], 10.0, 10);
        assert!(grid.locate(&Point3::new(f64::NAN, 4.5, 4.5)).is_none());
        assert!(grid.locate(&Point3::new(4.5, f64::INFINITY, 4.5)).is_none());
        assert!(grid.cell_at(&Point3::new(4.5, 4.5, f64::NEG_INFINITY)).is_none());
    }

    #[test]
    fn ring_search_beyond_cap_returns_none() {
        // Only the corner cell is occupied; cell size is 5.
        let grid = build(&[(0.5, 0.5, 0.5)], 100.0, 20);
        assert_relative_eq!(grid.cell_size().x, 5.0);
        assert!(grid.cell_at(&Point3::new(99.0, 99.0, 99.0)).is_none());

        let hit = grid.locate(&Point3::new(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(hit.cell.key, CellKey::new(0, 0, 0));
        assert_eq!(hit.kind, LookupKind::Ring { radius: 1 });
    }

    #[test]
    fn ring_search_prefers_closer_cell_in_later_ring() {
        // Cells are 10 wide on x and 1 wide on y/z. The query sits in the
        // empty cell (5, 5, 5). Ring 1 holds a point far along x; ring 2
        // holds a point just two thin cells away along y.
        let mut buffer = PointBuffer::new();
        buffer.push(Point3::new(69.9, 5.5, 5.5), Rgb::WHITE, 1.0); // cell (6,5,5), ring 1
        buffer.push(Point3::new(55.0, 7.1, 5.5), Rgb::WHITE, 1.0); // cell (5,7,5), ring 2
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 10.0, 10.0));
        let grid = GridBuilder::new(GridConfig {
            resolution: [10, 10, 10],
            vertical_crop: (0.0, 0.0),
            ..Default::default()
        })
        .build(&buffer, &bounds)
        .unwrap();

        let hit = grid.locate(&Point3::new(55.0, 5.5, 5.5)).unwrap();
        assert_eq!(hit.cell.key, CellKey::new(5, 7, 5));
        assert_eq!(hit.kind, LookupKind::Ring { radius: 2 });
        assert_relative_eq!(hit.distance, 1.6, epsilon = 1e-9);
    }

    #[test]
    fn ring_search_prefers_closer_diagonal_over_first_axial_hit() {
        // Cubic cells of size 1. Ring 1 holds a point on the far face of the
        // axial neighbour; ring 2 holds a diagonal point hugging the shared
        // corner, which is closer in world space.
        let mut buffer = PointBuffer::new();
        buffer.push(Point3::new(6.99, 5.5, 5.5), Rgb::WHITE, 1.0); // cell (6,5,5), ring 1
        buffer.push(Point3::new(4.5, 7.01, 5.5), Rgb::WHITE, 1.0); // cell (4,7,5), ring 2
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let grid = GridBuilder::new(GridConfig {
            resolution: [10, 10, 10],
            vertical_crop: (0.0, 0.0),
            ..Default::default()
        })
        .build(&buffer, &bounds)
        .unwrap();

        let hit = grid.locate(&Point3::new(5.0, 5.99, 5.5)).unwrap();
        assert_eq!(hit.cell.key, CellKey::new(4, 7, 5));
        assert_eq!(hit.kind, LookupKind::Ring { radius: 2 });
    }

    #[test]
    fn ring_search_respects_explicit_cap() {
        let grid = build(&[(0.5, 0.5, 0.5), (9.5, 9.5, 9.5)], 10.0, 10);
        assert!(grid.locate_within(&Point3::new(4.5, 4.5, 4.5), 3).is_none());
        let hit = grid.locate_within(&Point3::new(4.5, 4.5, 4.5), 5).unwrap();
        assert_eq!(hit.kind, LookupKind::Ring { radius: 4 });
    }

    #[test]
    fn neighbors_window() {
        let grid = build(
            &[(0.5, 0.5, 0.5), (1.5, 0.5, 0.5), (1.5, 1.5, 1.5), (3.5, 0.5, 0.5)],
            10.0,
            10,
        );
        let keys = |cells: Vec<&Cell>| -> Vec<CellKey> { cells.iter().map(|c| c.key).collect() };

        assert_eq!(keys(grid.neighbors(CellKey::new(0, 0, 0), 0)), vec![CellKey::new(0, 0, 0)]);
        assert_eq!(
            keys(grid.neighbors(CellKey::new(0, 0, 0), 1)),
            vec![CellKey::new(0, 0, 0), CellKey::new(1, 0, 0), CellKey::new(1, 1, 1)]
        );
        assert_eq!(grid.neighbors(CellKey::new(0, 0, 0), 3).len(), 4);
        // Empty centre cells still report their occupied neighbours.
        assert_eq!(grid.neighbors(CellKey::new(2, 0, 0), 1).len(), 3);
    }

    #[test]
    fn face_neighbors_skip_diagonals() {
        let grid = build(&[(0.5, 0.5, 0.5), (1.5, 0.5, 0.5), (1.5, 1.5, 0.5)], 10.0, 10);
        let faces: Vec<_> = grid.face_neighbors(CellKey::new(0, 0, 0)).map(|c| c.key).collect();
        assert_eq!(faces, vec![CellKey::new(1, 0, 0)]);
    }
}
