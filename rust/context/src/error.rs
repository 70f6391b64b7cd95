// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for context serialization.

/// Result type alias for context operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding a scene context.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The JSON payload could not be produced or parsed.
    #[error("scene context JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
