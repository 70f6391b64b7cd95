// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SceneGrid Context
//!
//! Turns a built grid, its segmentation and click selections into small
//! JSON records for a downstream reasoner.
//!
//! Only occupied cells with enough points are kept, highest point count
//! first, with abbreviated field names and every number rounded to two
//! decimal places.
//!
//! ```rust,ignore
//! use scenegrid_context::{ContextConfig, SceneContext};
//!
//! let context = SceneContext::build(&grid, &segmentation, &ContextConfig::default());
//! println!("{}", context.to_json()?);
//! ```

pub mod describe;
pub mod error;
pub mod scene;
pub mod snapshot;

pub use describe::describe_regions;
pub use error::{Error, Result};
pub use scene::{selection_context, SceneContext, SelectionSnapshot, ShapeSnapshot};
pub use snapshot::{
    round2, BoundsSnapshot, CellSnapshot, ContextConfig, GridSnapshot, RegionSnapshot,
};
