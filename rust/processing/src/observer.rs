// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Result;
use crate::feature::Feature;

/// Notified when a feature is split into several features while saving.
///
/// `splitting` runs before the original is updated, `split` after all pieces
/// were stored. Both run inside the edit transaction; an error rolls it back.
pub trait EditObserver {
    fn splitting(&mut self, _original: &Feature, _inserts: &[Feature]) -> Result<()> {
        Ok(())
    }

    fn split(&mut self, _original: &Feature, _inserts: &[Feature]) -> Result<()> {
        Ok(())
    }
}
