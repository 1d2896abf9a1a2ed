// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use cutlite_core::{Geometry, Tolerance};
use cutlite_geometry::footprint;

use crate::feature::Feature;

/// Chooses the cut result that is written back into the original feature;
/// the other results become new features.
pub trait UpdateSelector {
    /// Index into `results`, which is never empty
    fn select_update(&self, original: &Feature, results: &[Geometry]) -> usize;
}

/// Size of a cut result: area of polygons and multipatch footprints, length
/// of polylines
pub fn result_size(geometry: &Geometry, tolerance: &Tolerance) -> f64 {
    match geometry {
        Geometry::Multipatch(multipatch) => match multipatch.ring_groups() {
            Ok(groups) => footprint(&groups, tolerance).area(),
            Err(_) => multipatch.area_3d(),
        },
        other => other.size(),
    }
}

/// Keeps the largest result in the original feature
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestResultSelector {
    pub tolerance: Tolerance,
}

impl UpdateSelector for LargestResultSelector {
    fn select_update(&self, _original: &Feature, results: &[Geometry]) -> usize {
        results
            .iter()
            .map(|g| result_size(g, &self.tolerance))
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map_or(0, |(index, _)| index)
    }
}
