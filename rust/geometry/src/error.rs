// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for cut and reshape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while cutting or reshaping geometries
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// The operation requires simple input; callers may simplify and retry
    #[error("The operation cannot be performed on a non-simple geometry: {0}")]
    NonSimpleGeometry(String),

    #[error("The cut operation has significantly changed the polygon area! Original area: {original}, result area: {result}")]
    AreaNotConserved { original: f64, result: f64 },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("{0}")]
    DegenerateResultGeometry(String),

    #[error("Reshape failed: {0}")]
    Reshape(String),

    #[error("Geometry model error: {0}")]
    Core(#[from] cutlite_core::Error),
}
