// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use cutlite_core::ZSource;

use crate::feature::Feature;

/// Per feature source of the Z values of vertices created by a cut
pub trait ZSourceProvider {
    /// The policy for `feature` and an optional advisory message for the user
    fn z_source(&self, feature: &Feature) -> (ZSource, Option<String>);
}

/// Uses the same policy for every feature
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedZSource(pub ZSource);

impl ZSourceProvider for FixedZSource {
    fn z_source(&self, _feature: &Feature) -> (ZSource, Option<String>) {
        (self.0, None)
    }
}
