// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes in f64 precision.

use nalgebra::{Point3, Vector3};

/// An axis-aligned bounding box.
///
/// A box built with [`Aabb::empty`] is inverted (`min > max`) until the
/// first point is added, and reports itself as degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a box from explicit corners.
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Creates an inverted box that any point will expand.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point, or an empty box.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand(p);
        }
        aabb
    }

    /// True while the box is inverted, i.e. no point has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expands the box to include a point.
    #[inline]
    pub fn expand(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Smallest box containing both boxes. Empty operands are ignored.
    pub fn union(&self, other: &Aabb) -> Aabb {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.expand(&other.min);
        out.expand(&other.max);
        out
    }

    /// Extent along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Centre point.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Volume, or zero for empty and flat boxes.
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Inclusive containment test on every axis.
    #[inline]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Projects a point onto the box.
    #[inline]
    pub fn clamp_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// True when a corner is non-finite or an axis has negative extent.
    ///
    /// Zero-extent axes are allowed: a perfectly flat scene is still a valid
    /// grid domain.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.min.iter().chain(self.max.iter()).all(|v| v.is_finite());
        !finite || self.is_empty()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn expand_and_measure() {
        let pts = [Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 4.0, 0.0)];
        let aabb = Aabb::from_points(pts.iter());
        assert_eq!(aabb.min, Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 4.0, 3.0));
        assert_relative_eq!(aabb.volume(), 12.0);
        assert_eq!(aabb.center(), Point3::new(0.0, 3.0, 1.5));
    }

    #[test]
    fn empty_box_is_degenerate() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert!(aabb.is_degenerate());
        assert_eq!(aabb.volume(), 0.0);
    }

    #[test]
    fn flat_box_is_not_degenerate() {
        let aabb = Aabb::new(Point3::new(0.0, 1.0, 0.0), Point3::new(10.0, 1.0, 10.0));
        assert!(!aabb.is_degenerate());
        assert_eq!(aabb.volume(), 0.0);
    }

    #[test]
    fn non_finite_box_is_degenerate() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(f64::NAN, 1.0, 1.0));
        assert!(aabb.is_degenerate());
    }

    #[test]
    fn union_ignores_empty() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(a.union(&Aabb::empty()), a);
        assert_eq!(Aabb::empty().union(&a), a);

        let b = Aabb::new(Point3::new(2.0, -1.0, 0.5), Point3::new(3.0, 0.5, 0.7));
        let u = a.union(&b);
        assert_eq!(u.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Point3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn clamp_and_contains() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        assert!(a.contains(&Point3::new(10.0, 0.0, 5.0)));
        assert!(!a.contains(&Point3::new(10.1, 0.0, 5.0)));
        assert_eq!(
            a.clamp_point(&Point3::new(-3.0, 12.0, 5.0)),
            Point3::new(0.0, 10.0, 5.0)
        );
    }
}
