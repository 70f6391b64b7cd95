// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SceneGrid Segmentation
//!
//! Labels sufficiently populated grid cells with a deterministic, ordered
//! rule table and merges face-adjacent cells that share a label into
//! [`Region`]s.
//!
//! Cells with different labels never merge, however close they are.

pub mod classify;
pub mod label;
pub mod region;

pub use classify::{classify_cell, CellFeatures, Classification, HeightBand, Rule, RULES};
pub use label::Label;
pub use region::{segment, Region, Segmentation, SegmentationConfig};
