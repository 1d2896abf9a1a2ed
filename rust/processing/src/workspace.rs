// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transactional feature storage.
//!
//! Hosts implement [`EditWorkspace`] on top of their data store. The
//! [`MemoryWorkspace`] keeps features in memory and applies all writes of one
//! [`EditWorkspace::execute`] call or none of them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::feature::Feature;

/// Cooperative cancellation signal shared with the host
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear a cancellation, e.g. to store the results collected before it
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Write access to features inside an edit transaction
pub trait FeatureStore {
    /// Insert or update the feature. New features (negative object id) get
    /// their object id assigned.
    fn store(&mut self, feature: &mut Feature) -> Result<()>;

    /// Create a new, stored feature with the attributes of `original`
    fn duplicate_feature(&mut self, original: &Feature, exclude_shape: bool) -> Result<Feature>;

    fn feature(&self, object_id: i64) -> Option<&Feature>;
}

/// Runs edit actions as one transaction
pub trait EditWorkspace {
    fn execute(
        &mut self,
        description: &str,
        cancel: &CancelToken,
        action: &mut dyn FnMut(&mut dyn FeatureStore) -> Result<()>,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
struct FeatureTable {
    features: BTreeMap<i64, Feature>,
    next_id: i64,
}

impl FeatureTable {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FeatureStore for FeatureTable {
    fn store(&mut self, feature: &mut Feature) -> Result<()> {
        if feature.object_id < 0 {
            feature.object_id = self.allocate_id();
        } else if feature.object_id > self.next_id {
            self.next_id = feature.object_id;
        }
        self.features.insert(feature.object_id, feature.clone());
        Ok(())
    }

    fn duplicate_feature(&mut self, original: &Feature, exclude_shape: bool) -> Result<Feature> {
        let mut duplicate = Feature {
            object_id: -1,
            class_name: original.class_name.clone(),
            shape: if exclude_shape { None } else { original.shape.clone() },
            attributes: original.attributes.clone(),
        };
        self.store(&mut duplicate)?;
        Ok(duplicate)
    }

    fn feature(&self, object_id: i64) -> Option<&Feature> {
        self.features.get(&object_id)
    }
}

/// In-memory feature storage with all-or-nothing edit operations
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    table: FeatureTable,
    operations: Vec<String>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature outside of any edit operation; returns its object id
    pub fn insert(&mut self, mut feature: Feature) -> Result<i64> {
        self.table.store(&mut feature)?;
        Ok(feature.object_id)
    }

    pub fn feature(&self, object_id: i64) -> Option<&Feature> {
        self.table.features.get(&object_id)
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.table.features.values()
    }

    pub fn len(&self) -> usize {
        self.table.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.features.is_empty()
    }

    /// Descriptions of the committed edit operations
    pub fn operations(&self) -> &[String] {
        &self.operations
    }
}

impl EditWorkspace for MemoryWorkspace {
    fn execute(
        &mut self,
        description: &str,
        cancel: &CancelToken,
        action: &mut dyn FnMut(&mut dyn FeatureStore) -> Result<()>,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut staged = self.table.clone();
        if let Err(error) = action(&mut staged) {
            tracing::debug!(operation = description, error = %error, "Edit operation rolled back");
            return Err(error);
        }
        if cancel.is_cancelled() {
            tracing::debug!(operation = description, "Edit operation cancelled");
            return Err(Error::Cancelled);
        }

        self.table = staged;
        self.operations.push(description.to_string());
        Ok(())
    }
}
