// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point source and bounding volume contracts.
//!
//! Renderers typically expose their splats or points through a callback that
//! reuses one scratch buffer per invocation. [`PointSource::visit_points`]
//! hands the visitor a borrow that cannot escape the call, so anything the
//! consumer keeps must be copied out of the [`PointRecord`].

use std::sync::OnceLock;

use nalgebra::Point3;

use crate::bounds::Aabb;
use crate::color::Rgb;

/// One point as delivered by a [`PointSource`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    /// Stable index of the point in the source.
    pub index: u32,
    pub position: Point3<f64>,
    pub color: Rgb,
    /// Validity or opacity scalar. Non-positive values mark invisible points.
    pub validity: f32,
}

/// Synchronous traversal over every point in a scene.
pub trait PointSource {
    /// Total number of points the source will visit.
    fn point_count(&self) -> usize;

    /// Calls `visitor` once per point. The record may live in memory that is
    /// overwritten before the next call.
    fn visit_points(&self, visitor: &mut dyn FnMut(&PointRecord));
}

/// Supplies the axis-aligned bounds of all points in a scene.
pub trait BoundsProvider {
    fn bounds(&self) -> Aabb;
}

/// In-memory point storage implementing both source contracts.
///
/// Bounds are computed on first request and cached until the next push.
#[derive(Debug, Default)]
pub struct PointBuffer {
    points: Vec<PointRecord>,
    bounds: OnceLock<Aabb>,
}

impl PointBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            bounds: OnceLock::new(),
        }
    }

    /// Appends a point, assigning it the next sequential index.
    pub fn push(&mut self, position: Point3<f64>, color: Rgb, validity: f32) -> u32 {
        let index = self.points.len() as u32;
        self.points.push(PointRecord {
            index,
            position,
            color,
            validity,
        });
        self.bounds = OnceLock::new();
        index
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }
}

impl PointSource for PointBuffer {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn visit_points(&self, visitor: &mut dyn FnMut(&PointRecord)) {
        for point in &self.points {
            visitor(point);
        }
    }
}

impl BoundsProvider for PointBuffer {
    fn bounds(&self) -> Aabb {
        *self
            .bounds
            .get_or_init(|| Aabb::from_points(self.points.iter().map(|p| &p.position)))
    }
}

impl BoundsProvider for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}

impl FromIterator<(Point3<f64>, Rgb)> for PointBuffer {
    fn from_iter<I: IntoIterator<Item = (Point3<f64>, Rgb)>>(iter: I) -> Self {
        let mut buffer = PointBuffer::new();
        for (position, color) in iter {
            buffer.push(position, color, 1.0);
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_sequential_indices() {
        let mut buffer = PointBuffer::new();
        assert_eq!(buffer.push(Point3::new(0.0, 0.0, 0.0), Rgb::WHITE, 1.0), 0);
        assert_eq!(buffer.push(Point3::new(1.0, 0.0, 0.0), Rgb::WHITE, 1.0), 1);
        assert_eq!(buffer.point_count(), 2);

        let mut seen = Vec::new();
        buffer.visit_points(&mut |p| seen.push(p.index));
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn bounds_refresh_after_push() {
        let mut buffer = PointBuffer::new();
        buffer.push(Point3::new(0.0, 0.0, 0.0), Rgb::WHITE, 1.0);
        assert_eq!(buffer.bounds().max, Point3::new(0.0, 0.0, 0.0));

        buffer.push(Point3::new(2.0, 3.0, 4.0), Rgb::WHITE, 1.0);
        assert_eq!(buffer.bounds().max, Point3::new(2.0, 3.0, 4.0));
    }
}
