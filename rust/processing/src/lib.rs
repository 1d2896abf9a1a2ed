// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CutLite Processing
//!
//! Cuts features of a data store with a cut line or a cut surface and stores
//! the results in one edit operation.
//!
//! ```rust,ignore
//! use cutlite_processing::{CutterConfig, FeatureCutter, MemoryWorkspace};
//!
//! let mut cutter = FeatureCutter::new(features, CutterConfig::from_env());
//! cutter.cut(&cut_line)?;
//! let stored = cutter.save_results(&mut workspace)?;
//! ```
//!
//! Storage, network edges, observers and the Z source of new vertices are
//! supplied by the host through the traits in [`workspace`], [`network`],
//! [`observer`] and [`zsource`].

pub mod config;
pub mod cutter;
pub mod error;
pub mod feature;
pub mod network;
pub mod observer;
pub mod outcome;
pub mod selector;
pub mod spatial;
pub mod targets;
pub mod workspace;
pub mod zsource;

pub use config::CutterConfig;
pub use cutter::{CutterState, FeatureCutter, FeatureFilter, CUT_OPERATION};
pub use error::{Error, Result};
pub use feature::Feature;
pub use network::NetworkEdges;
pub use observer::EditObserver;
pub use outcome::{CutOutcome, FailedFeature, ProcessedCutLine};
pub use selector::{result_size, LargestResultSelector, UpdateSelector};
pub use spatial::SpatialHashSearcher;
pub use targets::insert_vertices;
pub use workspace::{CancelToken, EditWorkspace, FeatureStore, MemoryWorkspace};
pub use zsource::{FixedZSource, ZSourceProvider};
