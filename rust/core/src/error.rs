// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for grid construction.
//!
//! Only misconfiguration is an error. Recoverable anomalies such as
//! degenerate bounds or the crop fallback are reported through
//! [`BuildDiagnostics`](crate::grid::BuildDiagnostics) instead.

use thiserror::Error;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Every resolution axis must be at least one cell wide.
    #[error("invalid grid resolution {0}x{1}x{2}: every axis must be positive")]
    InvalidResolution(u32, u32, u32),

    /// The point source reported no points at all.
    #[error("point source is empty")]
    EmptyPointSource,

    /// The resolution does not fit in addressable memory.
    #[error("grid resolution {0}x{1}x{2} exceeds the addressable cell count")]
    ResolutionOverflow(u32, u32, u32),
}
