// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use cutlite_core::{Geometry, GeometryKind};
use serde_json::{Map, Value};

/// Feature of a feature class: an object id, an optional shape and its
/// attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Assigned by the store; negative until the feature was stored
    pub object_id: i64,
    pub class_name: String,
    pub shape: Option<Geometry>,
    pub attributes: Map<String, Value>,
}

impl Feature {
    pub fn new(object_id: i64, class_name: impl Into<String>, shape: Geometry) -> Self {
        Self {
            object_id,
            class_name: class_name.into(),
            shape: Some(shape),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn shape_kind(&self) -> Option<GeometryKind> {
        self.shape.as_ref().map(Geometry::kind)
    }

    /// Display label used in log messages
    pub fn label(&self) -> String {
        format!("{} <oid> {}", self.class_name, self.object_id)
    }
}
