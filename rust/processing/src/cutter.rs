// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature Cutting
//!
//! [`FeatureCutter`] cuts a set of candidate features with a cut line or a
//! cut surface and stores the results in one edit operation:
//!
//! ```text
//! Idle -> Cutting -> ResultsCollected -> Saving -> Saved
//!            |                              |
//!            +-----------> Failed <---------+
//! ```
//!
//! Per feature the largest result (see [`UpdateSelector`]) is written back
//! into the original feature; all other results become new features with
//! the attributes of the original.

use std::collections::BTreeMap;

use cutlite_core::{Envelope, Geometry, Multipatch, Path, Point3, Polyline, ZSource};
use cutlite_geometry::{
    intersection_lines, planar_cut_line, trimmed_cut_lines, try_cut_multipatch, try_cut_polygon,
    try_cut_polyline, CutOptions, MultipatchCutOptions,
};

use crate::config::CutterConfig;
use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::network::NetworkEdges;
use crate::observer::EditObserver;
use crate::outcome::{CutOutcome, FailedFeature, ProcessedCutLine};
use crate::selector::{result_size, LargestResultSelector, UpdateSelector};
use crate::spatial::SpatialHashSearcher;
use crate::targets::insert_vertices;
use crate::workspace::{CancelToken, EditWorkspace, FeatureStore};
use crate::zsource::{FixedZSource, ZSourceProvider};

/// Description of the edit operation that stores cut results
pub const CUT_OPERATION: &str = "Cut features";

/// Lifecycle of a [`FeatureCutter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutterState {
    Idle,
    Cutting,
    ResultsCollected,
    Saving,
    Saved,
    Failed,
}

/// Decides whether a feature is cut with the given cut line
pub type FeatureFilter = Box<dyn Fn(&Feature, &Polyline) -> bool>;

/// Cuts candidate features and stores the results.
pub struct FeatureCutter {
    config: CutterConfig,
    state: CutterState,
    candidates: Vec<Feature>,
    searcher: Option<SpatialHashSearcher>,
    filter: Option<FeatureFilter>,
    z_source: Box<dyn ZSourceProvider>,
    network: Option<Box<dyn NetworkEdges>>,
    observers: Vec<Box<dyn EditObserver>>,
    selector: Box<dyn UpdateSelector>,
    cancel: CancelToken,

    /// Cut results per candidate index
    results: BTreeMap<usize, Vec<Geometry>>,
    /// Network edges to split, per candidate index
    split_points: BTreeMap<usize, Vec<Point3<f64>>>,
    applied_cut_lines: BTreeMap<i64, Vec<Path>>,
    target_features: Vec<Feature>,
    updated_targets: Vec<usize>,
    failures: Vec<FailedFeature>,
    outcomes: Vec<CutOutcome>,
    processed_cut_lines: Vec<ProcessedCutLine>,
    refresh_extent: Envelope,
}

impl FeatureCutter {
    pub fn new(candidates: Vec<Feature>, config: CutterConfig) -> Self {
        let tolerance = config.tolerance();
        Self {
            config,
            state: CutterState::Idle,
            candidates,
            searcher: None,
            filter: None,
            z_source: Box::new(FixedZSource(ZSource::UseCutPathZ)),
            network: None,
            observers: Vec::new(),
            selector: Box::new(LargestResultSelector { tolerance }),
            cancel: CancelToken::new(),
            results: BTreeMap::new(),
            split_points: BTreeMap::new(),
            applied_cut_lines: BTreeMap::new(),
            target_features: Vec::new(),
            updated_targets: Vec::new(),
            failures: Vec::new(),
            outcomes: Vec::new(),
            processed_cut_lines: Vec::new(),
            refresh_extent: Envelope::empty(),
        }
    }

    /// Skip features for which `filter` returns false
    pub fn with_filter(mut self, filter: impl Fn(&Feature, &Polyline) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn with_z_source_provider(mut self, provider: impl ZSourceProvider + 'static) -> Self {
        self.z_source = Box::new(provider);
        self
    }

    pub fn with_network_edges(mut self, network: impl NetworkEdges + 'static) -> Self {
        self.network = Some(Box::new(network));
        self
    }

    pub fn with_observer(mut self, observer: impl EditObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn with_update_selector(mut self, selector: impl UpdateSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Features that receive a vertex where a subcurve cut crosses them
    pub fn with_target_features(mut self, targets: Vec<Feature>) -> Self {
        self.target_features = targets;
        self
    }

    pub fn state(&self) -> CutterState {
        self.state
    }

    pub fn config(&self) -> &CutterConfig {
        &self.config
    }

    /// Cut results of the feature, kept result first
    pub fn results(&self, object_id: i64) -> Option<&[Geometry]> {
        let index = self.candidate_index(object_id)?;
        self.results.get(&index).map(Vec::as_slice)
    }

    /// Object ids of the features that were cut
    pub fn cut_feature_ids(&self) -> Vec<i64> {
        self.results
            .keys()
            .chain(self.split_points.keys())
            .map(|&i| self.candidates[i].object_id)
            .collect()
    }

    pub fn failures(&self) -> &[FailedFeature] {
        &self.failures
    }

    pub fn outcomes(&self) -> &[CutOutcome] {
        &self.outcomes
    }

    pub fn processed_cut_lines(&self) -> &[ProcessedCutLine] {
        &self.processed_cut_lines
    }

    /// The parts of the cut lines that separate the results of the feature
    pub fn applied_cut_lines(&self, object_id: i64) -> &[Path] {
        self.applied_cut_lines
            .get(&object_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Union of the extents of all cut geometries so far
    pub fn refresh_extent(&self) -> Envelope {
        self.refresh_extent
    }

    fn candidate_index(&self, object_id: i64) -> Option<usize> {
        self.candidates.iter().position(|f| f.object_id == object_id)
    }

    /// Candidates whose extent intersects `extent`, using a spatial index
    /// for large candidate sets.
    fn candidate_indices(&mut self, extent: &Envelope) -> Vec<usize> {
        let tolerance = self.config.xy_tolerance;
        if self.candidates.len() <= self.config.spatial_index_threshold {
            return self
                .candidates
                .iter()
                .enumerate()
                .filter(|(_, f)| f.shape.as_ref().is_some_and(|s| s.envelope().intersects(extent, tolerance)))
                .map(|(i, _)| i)
                .collect();
        }

        let candidates = &self.candidates;
        let searcher = self.searcher.get_or_insert_with(|| {
            tracing::debug!(candidates = candidates.len(), "Building spatial index for cut candidates");
            SpatialHashSearcher::new(candidates, |f| {
                f.shape.as_ref().map_or_else(Envelope::empty, Geometry::envelope)
            })
        });
        searcher.search(extent, tolerance)
    }

    fn check_can_cut(&self) -> Result<()> {
        match self.state {
            CutterState::Idle | CutterState::ResultsCollected => Ok(()),
            state => Err(Error::InvalidOperation(format!(
                "Cannot cut features in state {state:?}"
            ))),
        }
    }

    /// Cut the candidate features with `cut_line`; returns the number of
    /// features that were cut.
    ///
    /// Features that are not cut, or that a filter rejects, keep no results.
    /// If cancelled between two features the results collected so far are
    /// kept and [`Error::Cancelled`] is returned.
    pub fn cut(&mut self, cut_line: &Polyline) -> Result<usize> {
        self.check_can_cut()?;
        let span = tracing::info_span!("cut", candidates = self.candidates.len());
        let _guard = span.enter();

        let extent = cut_line.envelope();
        self.refresh_extent.union(&extent);
        let indices = self.candidate_indices(&extent);
        self.run_batch(indices, |cutter, index| {
            if let Some(filter) = &cutter.filter {
                if !filter(&cutter.candidates[index], cut_line) {
                    return Ok(None);
                }
            }
            cutter.cut_feature(index, cut_line, None)
        })
    }

    /// Cut with several subcurves merged into one cut line, then insert
    /// vertices into the target features where the cut line crosses them.
    ///
    /// Targets are only touched if there are cut results.
    pub fn cut_with_subcurves(&mut self, subcurves: &[Polyline]) -> Result<usize> {
        let merged = Polyline::new(
            subcurves.iter().flat_map(|c| c.paths.iter().cloned()).collect(),
            !subcurves.is_empty() && subcurves.iter().all(|c| c.z_aware),
        );
        let cut_count = self.cut(&merged)?;
        if cut_count == 0 {
            tracing::debug!("No feature was cut, target features stay unchanged");
            return Ok(cut_count);
        }

        let tolerance = self.config.xy_tolerance;
        for (index, target) in self.target_features.iter_mut().enumerate() {
            let inserted = insert_vertices(target, &merged, tolerance);
            if inserted > 0 {
                tracing::debug!(feature = %target.label(), inserted, "Inserted vertices into target feature");
                if !self.updated_targets.contains(&index) {
                    self.updated_targets.push(index);
                }
            }
        }
        Ok(cut_count)
    }

    /// Cut the multipatch candidates with a cut surface.
    ///
    /// Each multipatch is cut with the planar projection of its intersection
    /// lines with `surface`. New vertices take their Z from the plane of the
    /// ring they are inserted into. Every intersection line is recorded as a
    /// processed cut line.
    pub fn cut_3d(&mut self, surface: &Multipatch) -> Result<usize> {
        self.check_can_cut()?;
        let span = tracing::info_span!("cut_3d", candidates = self.candidates.len());
        let _guard = span.enter();

        let extent = surface.envelope();
        self.refresh_extent.union(&extent);
        let indices: Vec<usize> = self
            .candidate_indices(&extent)
            .into_iter()
            .filter(|&i| matches!(self.candidates[i].shape, Some(Geometry::Multipatch(_))))
            .collect();

        self.run_batch(indices, |cutter, index| {
            let Some(Geometry::Multipatch(multipatch)) = &cutter.candidates[index].shape else {
                return Ok(None);
            };
            let tolerance = cutter.config.tolerance();
            let lines = intersection_lines(multipatch, surface, &tolerance)?;
            let Some(cut_line) = planar_cut_line(&lines, tolerance.xy) else {
                return Ok(None);
            };
            if let Some(filter) = &cutter.filter {
                if !filter(&cutter.candidates[index], &cut_line) {
                    return Ok(None);
                }
            }

            let result = cutter.cut_feature(index, &cut_line, Some(ZSource::FitSourcePlane));
            let success = matches!(result, Ok(Some(_)));
            let object_id = cutter.candidates[index].object_id;
            cutter
                .processed_cut_lines
                .extend(lines.into_iter().map(|line| ProcessedCutLine { object_id, line, success }));
            result
        })
    }

    /// Run `cut_one` for every candidate, applying the failure policy.
    fn run_batch(
        &mut self,
        indices: Vec<usize>,
        mut cut_one: impl FnMut(&mut Self, usize) -> Result<Option<usize>>,
    ) -> Result<usize> {
        self.state = CutterState::Cutting;
        let mut cut_count = 0;
        let mut result_count = 0;

        for index in indices {
            if self.cancel.is_cancelled() {
                tracing::info!(cut = cut_count, "Cut cancelled, keeping the results collected so far");
                self.state = CutterState::ResultsCollected;
                return Err(Error::Cancelled);
            }

            match cut_one(self, index) {
                Ok(Some(count)) => {
                    cut_count += 1;
                    result_count += count;
                }
                Ok(None) => {}
                Err(error) => {
                    let feature = &self.candidates[index];
                    let message = error.to_string();
                    if !self.config.continue_on_failure {
                        tracing::warn!(feature = %feature.label(), error = %message, "Cutting feature failed");
                        self.state = CutterState::Failed;
                        return Err(Error::FeatureFailed {
                            object_id: feature.object_id,
                            message,
                        });
                    }
                    tracing::warn!(
                        feature = %feature.label(),
                        error = %message,
                        "Cutting feature failed, continuing with the next feature"
                    );
                    self.failures.push(FailedFeature {
                        object_id: feature.object_id,
                        message,
                    });
                }
            }
        }

        if cut_count == 1 {
            tracing::info!("The selected feature was cut into {result_count} features");
        } else if cut_count > 1 {
            tracing::info!("{cut_count} features were cut into {result_count} features");
        }
        if !self.failures.is_empty() {
            tracing::warn!(failed = self.failures.len(), "Some features could not be cut");
        }
        self.state = CutterState::ResultsCollected;
        Ok(cut_count)
    }

    /// Cut one candidate; `None` if the cut line does not cut it.
    ///
    /// `z_source` replaces the one of the Z source provider.
    fn cut_feature(
        &mut self,
        index: usize,
        cut_line: &Polyline,
        z_source: Option<ZSource>,
    ) -> Result<Option<usize>> {
        let feature = &self.candidates[index];
        let Some(shape) = feature.shape.as_ref() else {
            return Ok(None);
        };
        let tolerance = self.config.tolerance();
        if !shape.envelope().intersects(&cut_line.envelope(), tolerance.xy) {
            return Ok(None);
        }

        let z_source = match z_source {
            Some(z_source) => z_source,
            None => {
                let (z_source, advisory) = self.z_source.z_source(feature);
                if let Some(message) = advisory {
                    tracing::info!(feature = %feature.label(), "{message}");
                }
                z_source
            }
        };

        let results: Option<Vec<Geometry>> = match shape {
            Geometry::Polygon(polygon) => {
                let options = CutOptions {
                    z_source,
                    tolerance,
                    use_custom_intersect: self.config.use_custom_intersect,
                    area_tolerance_ratio: self.config.area_tolerance_ratio,
                };
                try_cut_polygon(polygon, cut_line, &options)?
                    .map(|pieces| pieces.into_iter().map(Geometry::Polygon).collect())
            }
            Geometry::Polyline(polyline) => {
                if let Some(network) = self.network.as_ref().filter(|n| n.is_network_edge(feature)) {
                    let points = network.calculate_split_points(shape, cut_line);
                    if points.is_empty() {
                        return Ok(None);
                    }
                    let count = points.len() + 1;
                    tracing::debug!(feature = %feature.label(), points = points.len(), "Network edge will be split");
                    self.split_points.insert(index, points);
                    return Ok(Some(count));
                }
                try_cut_polyline(polyline, cut_line, tolerance.xy)
                    .map(|pieces| pieces.into_iter().map(Geometry::Polyline).collect())
            }
            Geometry::Multipatch(multipatch) => {
                let options = MultipatchCutOptions {
                    z_source,
                    tolerance,
                    degenerate_policy: self.config.degenerate_footprint_policy,
                };
                let parts = try_cut_multipatch(multipatch, cut_line, &options)?;
                (parts.len() > 1)
                    .then(|| parts.into_iter().map(|p| Geometry::Multipatch(p.multipatch)).collect())
            }
            Geometry::Multipoint(_) => {
                return Err(Error::InvalidOperation("Unsupported geometry type".into()));
            }
        };

        let Some(results) = results.filter(|r| r.len() > 1) else {
            return Ok(None);
        };

        let object_id = feature.object_id;
        let sizes: Vec<f64> = results.iter().map(|g| result_size(g, &tolerance)).collect();
        let outcome = CutOutcome::new(object_id, result_size(shape, &tolerance), &sizes);
        let applied = trimmed_cut_lines(cut_line, &results, tolerance.xy);
        tracing::debug!(
            feature = %feature.label(),
            results = results.len(),
            smallest_percent = outcome.smallest_size_percent,
            "Feature cut"
        );

        let count = results.len();
        self.outcomes.retain(|o| o.object_id != object_id);
        self.outcomes.push(outcome);
        self.applied_cut_lines.entry(object_id).or_default().extend(applied);
        self.results.insert(index, results);
        Ok(Some(count))
    }

    /// Store all cut results in one edit operation and return the stored
    /// features: per cut feature the updated original followed by the new
    /// features, then the updated target features.
    pub fn save_results(&mut self, workspace: &mut dyn EditWorkspace) -> Result<Vec<Feature>> {
        if self.state != CutterState::ResultsCollected {
            return Err(Error::InvalidOperation(format!(
                "Cannot save results in state {:?}",
                self.state
            )));
        }
        self.state = CutterState::Saving;

        let Self {
            candidates,
            results,
            split_points,
            target_features,
            updated_targets,
            observers,
            network,
            selector,
            cancel,
            ..
        } = self;

        let mut stored: Vec<Feature> = Vec::new();
        let outcome = workspace.execute(CUT_OPERATION, cancel, &mut |store: &mut dyn FeatureStore| -> Result<()> {
            stored.clear();
            for (&index, pieces) in results.iter() {
                let original = &candidates[index];
                stored.extend(store_pieces(store, original, pieces, &**selector, observers.as_mut_slice())?);
            }

            for (&index, points) in split_points.iter() {
                let original = &candidates[index];
                let Some(network) = network.as_mut() else {
                    return Err(Error::InvalidOperation("No network to split edges in".into()));
                };
                stored.extend(network.split_network_edge(store, original, points)?);
            }

            for &index in updated_targets.iter() {
                let mut target = target_features[index].clone();
                store.store(&mut target)?;
                stored.push(target);
            }
            Ok(())
        });

        match outcome {
            Ok(()) => {
                tracing::info!(stored = stored.len(), "Saved cut results");
                self.state = CutterState::Saved;
                Ok(stored)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Saving cut results failed");
                self.state = CutterState::Failed;
                Err(error)
            }
        }
    }
}

/// Write the selected piece into the original and insert the other pieces
fn store_pieces(
    store: &mut dyn FeatureStore,
    original: &Feature,
    pieces: &[Geometry],
    selector: &dyn UpdateSelector,
    observers: &mut [Box<dyn EditObserver>],
) -> Result<Vec<Feature>> {
    let update_index = selector.select_update(original, pieces).min(pieces.len().saturating_sub(1));

    let mut inserts: Vec<Feature> = pieces
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != update_index)
        .map(|(_, piece)| Feature {
            object_id: -1,
            class_name: original.class_name.clone(),
            shape: Some(piece.clone()),
            attributes: original.attributes.clone(),
        })
        .collect();

    for observer in observers.iter_mut() {
        observer.splitting(original, &inserts)?;
    }

    let mut updated = original.clone();
    updated.shape = pieces.get(update_index).cloned();
    store.store(&mut updated)?;

    for insert in &mut inserts {
        let mut duplicate = store.duplicate_feature(original, true)?;
        duplicate.shape = insert.shape.take();
        store.store(&mut duplicate)?;
        *insert = duplicate;
    }

    for observer in observers.iter_mut() {
        observer.split(&updated, &inserts)?;
    }

    let mut stored = Vec::with_capacity(inserts.len() + 1);
    stored.push(updated);
    stored.extend(inserts);
    Ok(stored)
}
