// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use cutlite_core::{Geometry, Point3, Polyline};

use crate::error::Result;
use crate::feature::Feature;
use crate::workspace::FeatureStore;

/// Edges of a linear network that must be split by the network itself to
/// keep junctions and connectivity consistent.
pub trait NetworkEdges {
    fn is_network_edge(&self, feature: &Feature) -> bool;

    /// Points at which `geometry` would be split by `cut_path`
    fn calculate_split_points(&self, geometry: &Geometry, cut_path: &Polyline) -> Vec<Point3<f64>>;

    /// Split the edge at the points, store the changes and return the
    /// resulting edges, the updated original first.
    fn split_network_edge(
        &mut self,
        store: &mut dyn FeatureStore,
        feature: &Feature,
        split_points: &[Point3<f64>],
    ) -> Result<Vec<Feature>>;
}
