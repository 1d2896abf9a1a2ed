// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Options steering how cut results are built

/// Where Z values of vertices created by a cut come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZSource {
    /// Take Z from the cut line where it has one
    #[default]
    UseCutPathZ,
    /// Take Z from the plane fitted through the cut ring
    FitSourcePlane,
    /// Interpolate Z along the source ring
    InterpolateFromSource,
}

/// What to do with a multipatch cut result whose footprint collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DegenerateFootprintPolicy {
    #[default]
    Throw,
    Discard,
    Keep,
}
