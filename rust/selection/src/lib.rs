// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SceneGrid Selection
//!
//! Grows a tight local cluster of grid cells from a single click point.
//!
//! Growth is a breadth-first traversal from the seed cell, admitting cells
//! whose mean colour is close to the seed's. Traversal is bounded by visited
//! cell count, cluster size and depth; whichever bound trips first is
//! recorded in the diagnostics. An optional floor filter then drops the
//! lowest-ranked cells of the cluster, and a best-fit [`ShapeHint`] is
//! suggested for the edit pipeline.

pub mod cluster;
pub mod config;
pub mod result;
pub mod shape;

pub use cluster::select_cluster;
pub use config::{FloorProtection, SelectionConfig};
pub use result::{SelectionDiagnostics, SelectionResult, TraversalLimit};
pub use shape::{suggest_shape, ShapeHint};
