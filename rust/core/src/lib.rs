// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SceneGrid Core
//!
//! Uniform spatial grid over large, unordered, coloured point clouds.
//!
//! A [`Grid`] is built once per scene by [`GridBuilder`] from a
//! [`PointSource`] and a [`BoundsProvider`]. Every occupied [`Cell`] carries
//! aggregate statistics (count, mean position, mean colour, colour variance,
//! occupied extent, nominal density and the contributing point indices).
//! Empty cells are absent from the grid.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scenegrid_core::{GridBuilder, GridConfig, PointBuffer, PointRecord, Rgb};
//! use nalgebra::Point3;
//!
//! let mut points = PointBuffer::new();
//! points.push(Point3::new(0.5, 0.5, 0.5), Rgb::new(0.2, 0.6, 0.1), 1.0);
//!
//! let grid = GridBuilder::new(GridConfig::default()).build(&points, &points)?;
//! let cell = grid.cell_at(&Point3::new(0.5, 0.5, 0.5));
//! ```
//!
//! ## Ownership
//!
//! The grid is immutable after construction. Segmentation and selection read
//! it through shared references, so concurrent readers need no locking.

pub mod bounds;
pub mod builder;
pub mod color;
pub mod error;
pub mod grid;
pub mod query;
pub mod source;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use bounds::Aabb;
pub use builder::{crop_vertical, GridBuilder, GridConfig};
pub use color::Rgb;
pub use error::{Error, Result};
pub use grid::{BuildDiagnostics, Cell, CellKey, Grid};
pub use query::{CellHit, LookupKind, DEFAULT_MAX_SEARCH_RINGS};
pub use source::{BoundsProvider, PointBuffer, PointRecord, PointSource};
