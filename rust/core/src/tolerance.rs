// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial tolerances used by every tolerance-aware predicate.

/// Default XY tolerance (1 mm in metric coordinate systems)
pub const DEFAULT_XY_TOLERANCE: f64 = 0.001;

/// Default Z tolerance
pub const DEFAULT_Z_TOLERANCE: f64 = 0.001;

/// XY and Z tolerance of a dataset.
///
/// Two points closer than `xy` in the plane are considered equal by the cut
/// engine; `z` governs plane fitting and Z comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub xy: f64,
    pub z: f64,
}

impl Tolerance {
    pub const fn new(xy: f64, z: f64) -> Self {
        Self { xy, z }
    }

    /// Same tolerance in XY and Z
    pub const fn uniform(value: f64) -> Self {
        Self { xy: value, z: value }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(DEFAULT_XY_TOLERANCE, DEFAULT_Z_TOLERANCE)
    }
}
