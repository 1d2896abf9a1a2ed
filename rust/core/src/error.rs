// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or decomposing geometries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unsupported multipatch part: {0}")]
    UnsupportedPatch(String),
}
