// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Best-fit edit shape for a selected cluster.

use nalgebra::{Point3, Vector3};

use scenegrid_core::Aabb;

use crate::config::SelectionConfig;

/// Extents at or below this are treated as zero.
const FLAT_EPSILON: f64 = 1e-9;

/// Shape suggested to the edit pipeline for a selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeHint {
    Sphere {
        center: Point3<f64>,
        radius: f64,
    },
    Ellipsoid {
        center: Point3<f64>,
        radii: Vector3<f64>,
    },
    Box {
        center: Point3<f64>,
        half_extents: Vector3<f64>,
    },
}

impl ShapeHint {
    pub fn center(&self) -> Point3<f64> {
        match *self {
            ShapeHint::Sphere { center, .. }
            | ShapeHint::Ellipsoid { center, .. }
            | ShapeHint::Box { center, .. } => center,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ShapeHint::Sphere { .. } => "sphere",
            ShapeHint::Ellipsoid { .. } => "ellipsoid",
            ShapeHint::Box { .. } => "box",
        }
    }
}

/// Picks a shape for a cluster with the given bounds, centred on `center`.
///
/// Nearly isotropic bounds get a sphere of the average half-extent. Bounds
/// dominated by one axis get an ellipsoid. Everything else gets a padded box.
pub fn suggest_shape(bounds: &Aabb, center: Point3<f64>, config: &SelectionConfig) -> ShapeHint {
    let half = bounds.size() * 0.5;

    let mut dims = [half.x, half.y, half.z];
    dims.sort_by(|a, b| a.total_cmp(b));
    let [smallest, middle, largest] = dims;

    let ratio = if largest <= FLAT_EPSILON {
        1.0
    } else if smallest <= FLAT_EPSILON {
        f64::INFINITY
    } else {
        largest / smallest
    };

    if ratio < config.sphere_max_ratio {
        return ShapeHint::Sphere {
            center,
            radius: (half.x + half.y + half.z) / 3.0,
        };
    }

    if largest > config.ellipsoid_dominance * middle {
        return ShapeHint::Ellipsoid {
            center,
            radii: half,
        };
    }

    ShapeHint::Box {
        center,
        half_extents: half * config.box_padding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds(x: f64, y: f64, z: f64) -> Aabb {
        Aabb::new(Point3::origin(), Point3::new(x, y, z))
    }

    #[test]
    fn cube_gets_sphere() {
        let b = bounds(2.0, 2.2, 1.8);
        match suggest_shape(&b, b.center(), &SelectionConfig::default()) {
            ShapeHint::Sphere { radius, .. } => assert_relative_eq!(radius, 1.0),
            other => panic!("expected sphere, got {other:?}"),
        }
    }

    #[test]
    fn one_dominant_axis_gets_ellipsoid() {
        let b = bounds(1.0, 6.0, 1.5);
        match suggest_shape(&b, b.center(), &SelectionConfig::default()) {
            ShapeHint::Ellipsoid { radii, .. } => {
                assert_relative_eq!(radii, Vector3::new(0.5, 3.0, 0.75));
            }
            other => panic!("expected ellipsoid, got {other:?}"),
        }
    }

    #[test]
    fn slab_gets_padded_box() {
        let b = bounds(4.0, 1.0, 3.0);
        let config = SelectionConfig::default();
        match suggest_shape(&b, b.center(), &config) {
            ShapeHint::Box { half_extents, .. } => {
                assert_relative_eq!(half_extents, Vector3::new(2.0, 0.5, 1.5) * config.box_padding);
            }
            other => panic!("expected box, got {other:?}"),
        }
    }

    #[test]
    fn point_cluster_gets_zero_sphere() {
        let b = bounds(0.0, 0.0, 0.0);
        assert_eq!(
            suggest_shape(&b, b.center(), &SelectionConfig::default()).kind(),
            "sphere"
        );
    }

    #[test]
    fn flat_square_gets_box() {
        let b = bounds(2.0, 0.0, 2.0);
        assert_eq!(
            suggest_shape(&b, b.center(), &SelectionConfig::default()).kind(),
            "box"
        );
    }
}
