// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for feature cutting
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while cutting and storing features
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] cutlite_geometry::Error),

    #[error("Cutting feature {object_id} failed: {message}")]
    FeatureFailed { object_id: i64, message: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("The operation was cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
