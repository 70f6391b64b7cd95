// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot grid construction.
//!
//! The builder reads every point exactly once:
//!
//! 1. Fetch the raw bounds. Degenerate bounds yield an empty grid.
//! 2. Shrink the vertical (Y) axis by the configured crop fractions, falling
//!    back to the raw bounds when the crop collapses the box.
//! 3. Divide the cropped box into `resolution` cells per axis.
//! 4. Bin each point, dropping points outside the cropped box.
//! 5. Accumulate running sums, extents and point indices per touched cell.
//! 6. Finalise means, colour variance and nominal density.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::grid::{flat_index, key_within, BuildDiagnostics, Cell, CellKey, Grid, EMPTY_SLOT};
use crate::source::{BoundsProvider, PointRecord, PointSource};

/// Grid construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per axis (x, y, z).
    pub resolution: [u32; 3],
    /// Fractions of the scene height removed at the (bottom, top) before
    /// binning.
    pub vertical_crop: (f64, f64),
    /// Points with validity at or below this value are skipped.
    pub min_validity: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: [20, 20, 20],
            vertical_crop: (0.10, 0.10),
            min_validity: 0.0,
        }
    }
}

impl GridConfig {
    /// Default configuration with a custom resolution.
    pub fn with_resolution(resolution: [u32; 3]) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }
}

/// Crops the vertical axis of `raw` by `(bottom, top)` fractions of its
/// height.
///
/// Returns the cropped box and `false`, or `raw` unchanged and `true` when
/// the cropped height would not be positive.
pub fn crop_vertical(raw: &Aabb, crop: (f64, f64)) -> (Aabb, bool) {
    let bottom = crop.0.clamp(0.0, 1.0);
    let top = crop.1.clamp(0.0, 1.0);
    let height = raw.max.y - raw.min.y;

    let mut cropped = *raw;
    cropped.min.y = raw.min.y + height * bottom;
    cropped.max.y = raw.max.y - height * top;

    let cropped_height = cropped.max.y - cropped.min.y;
    if cropped_height.is_finite() && cropped_height > 0.0 {
        (cropped, false)
    } else {
        (*raw, true)
    }
}

/// Builds a [`Grid`] from a point source.
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    config: GridConfig,
}

impl GridBuilder {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Reads every point once and returns the finished grid.
    ///
    /// Fails only on a zero resolution axis or an empty source. Degenerate
    /// bounds produce an empty grid with `degenerate_bounds` set.
    pub fn build<S, B>(&self, source: &S, bounds: &B) -> Result<Grid>
    where
        S: PointSource + ?Sized,
        B: BoundsProvider + ?Sized,
    {
        let [rx, ry, rz] = self.config.resolution;
        if rx == 0 || ry == 0 || rz == 0 {
            return Err(Error::InvalidResolution(rx, ry, rz));
        }
        let slot_count = (rx as usize)
            .checked_mul(ry as usize)
            .and_then(|n| n.checked_mul(rz as usize))
            .filter(|&n| n < EMPTY_SLOT as usize)
            .ok_or(Error::ResolutionOverflow(rx, ry, rz))?;

        let reported = source.point_count();
        if reported == 0 {
            return Err(Error::EmptyPointSource);
        }

        let raw = bounds.bounds();
        if raw.is_degenerate() {
            tracing::warn!(
                min = ?raw.min,
                max = ?raw.max,
                points = reported,
                "Degenerate point cloud bounds, returning empty grid"
            );
            let diagnostics = BuildDiagnostics {
                total_points: reported,
                degenerate_bounds: true,
                ..Default::default()
            };
            return Ok(Grid::degenerate(self.config.resolution, raw, diagnostics));
        }

        let (cropped, used_fallback) = crop_vertical(&raw, self.config.vertical_crop);
        if used_fallback {
            tracing::warn!(
                height = raw.size().y,
                crop = ?self.config.vertical_crop,
                "Vertical crop collapsed the bounds, using uncropped bounds"
            );
        }

        let size = cropped.size();
        let cell_size = Vector3::new(
            axis_cell_size(size.x, rx),
            axis_cell_size(size.y, ry),
            axis_cell_size(size.z, rz),
        );

        let mut slots = vec![EMPTY_SLOT; slot_count];
        let mut accumulators: Vec<CellAccumulator> = Vec::new();
        let mut diagnostics = BuildDiagnostics {
            used_fallback,
            ..Default::default()
        };

        let resolution = self.config.resolution;
        let min_validity = self.config.min_validity;
        source.visit_points(&mut |record: &PointRecord| {
            diagnostics.total_points += 1;

            // Copy out of the borrowed record before anything else.
            let point = *record;
            if !(point.validity > min_validity) || !is_finite(&point.position) {
                diagnostics.skipped_invalid += 1;
                return;
            }
            if !cropped.contains(&point.position) {
                diagnostics.dropped_outside += 1;
                return;
            }

            let key = key_within(&cropped, resolution, &point.position);
            let Some(flat) = flat_index(key, resolution) else {
                diagnostics.dropped_outside += 1;
                return;
            };
            let slot = match slots[flat] {
                EMPTY_SLOT => {
                    slots[flat] = accumulators.len() as u32;
                    accumulators.push(CellAccumulator::new(key));
                    accumulators.len() - 1
                }
                slot => slot as usize,
            };
            accumulators[slot].add(&point);
            diagnostics.indexed_points += 1;
        });

        // Cells are stored in flat-index order; CellKey ordering matches it.
        accumulators.sort_unstable_by_key(|acc| acc.key);
        slots.fill(EMPTY_SLOT);

        let nominal_volume = nominal_volume(&cell_size);
        let mut cells = Vec::with_capacity(accumulators.len());
        for (slot, acc) in accumulators.into_iter().enumerate() {
            if let Some(flat) = flat_index(acc.key, resolution) {
                slots[flat] = slot as u32;
            }
            cells.push(acc.finish(nominal_volume));
        }
        diagnostics.occupied_cells = cells.len();

        tracing::info!(
            total_points = diagnostics.total_points,
            indexed_points = diagnostics.indexed_points,
            dropped_outside = diagnostics.dropped_outside,
            skipped_invalid = diagnostics.skipped_invalid,
            occupied_cells = diagnostics.occupied_cells,
            resolution = ?resolution,
            "Grid built"
        );
        if diagnostics.drop_rate() > 0.5 {
            tracing::warn!(
                drop_rate = diagnostics.drop_rate(),
                "More than half of the points were not indexed"
            );
        }

        Ok(Grid::from_parts(
            resolution,
            cropped,
            raw,
            cell_size,
            cells,
            slots,
            diagnostics,
        ))
    }
}

#[inline]
fn axis_cell_size(extent: f64, resolution: u32) -> f64 {
    if extent > 0.0 {
        extent / resolution as f64
    } else {
        0.0
    }
}

/// Product of the positive cell dimensions; flat axes contribute 1.
fn nominal_volume(cell_size: &Vector3<f64>) -> f64 {
    cell_size
        .iter()
        .filter(|&&s| s > 0.0)
        .product::<f64>()
}

#[inline]
fn is_finite(p: &Point3<f64>) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// Running sums for one cell.
struct CellAccumulator {
    key: CellKey,
    count: u32,
    position_sum: Vector3<f64>,
    color_sum: [f64; 3],
    color_sq_sum: [f64; 3],
    bounds: Aabb,
    indices: Vec<u32>,
}

impl CellAccumulator {
    fn new(key: CellKey) -> Self {
        Self {
            key,
            count: 0,
            position_sum: Vector3::zeros(),
            color_sum: [0.0; 3],
            color_sq_sum: [0.0; 3],
            bounds: Aabb::empty(),
            indices: Vec::new(),
        }
    }

    fn add(&mut self, point: &PointRecord) {
        self.count += 1;
        self.position_sum += point.position.coords;
        let channels = [point.color.r, point.color.g, point.color.b];
        for (i, &c) in channels.iter().enumerate() {
            let c = c as f64;
            self.color_sum[i] += c;
            self.color_sq_sum[i] += c * c;
        }
        self.bounds.expand(&point.position);
        self.indices.push(point.index);
    }

    fn finish(self, nominal_volume: f64) -> Cell {
        let n = self.count.max(1) as f64;
        let mean = self.color_sum.map(|s| s / n);
        let variance: f64 = (0..3)
            .map(|i| (self.color_sq_sum[i] / n - mean[i] * mean[i]).max(0.0))
            .sum::<f64>()
            / 3.0;

        Cell {
            key: self.key,
            count: self.count,
            mean_position: Point3::from(self.position_sum / n),
            mean_color: Rgb::new(mean[0] as f32, mean[1] as f32, mean[2] as f32),
            color_variance: variance as f32,
            bounds: self.bounds,
            density: (self.count as f64 / nominal_volume) as f32,
            point_indices: self.indices,
        }
    }
}
