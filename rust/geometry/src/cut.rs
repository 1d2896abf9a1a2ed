// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon Cutting
//!
//! [`try_cut_polygon`] splits every connected component (ring group) of a
//! polygon along the cut line. Per component the largest piece stays with the
//! original, all other pieces become new polygons. The result lists the union
//! of the kept pieces first, followed by the new pieces, or is `None` if the
//! cut line did not divide anything.
//!
//! Two strategies exist:
//!
//! - the XY cut, which nodes rings and cut line directly and assigns the Z
//!   values of new vertices afterwards
//! - the topological cut, which requires simple input and recovers from
//!   non-simple components by simplifying them once, then verifies the Z
//!   values of the result and recuts once if they look corrupted
//!
//! The two retries are empirical safeguards, not a convergence guarantee.

use cutlite_core::{Plane3D, Polygon, Polyline, Ring, RingGroup, Tolerance, ZSource};

use crate::arrangement::{has_self_intersections, simplify_rings, split_rings, ZOptions};
use crate::error::{Error, Result};
use crate::planar_cut::{assign_new_zs, cut_ring_group_planar, prepare_cut_paths};

/// Default relative tolerance for the area conservation check
pub const DEFAULT_AREA_TOLERANCE_RATIO: f64 = 0.001;

/// Options for polygon cutting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutOptions {
    pub z_source: ZSource,
    pub tolerance: Tolerance,
    /// Use the XY cut for inputs without measures
    pub use_custom_intersect: bool,
    /// Maximum relative area change before the cut is rejected as defective
    pub area_tolerance_ratio: f64,
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            z_source: ZSource::default(),
            tolerance: Tolerance::default(),
            use_custom_intersect: true,
            area_tolerance_ratio: DEFAULT_AREA_TOLERANCE_RATIO,
        }
    }
}

impl CutOptions {
    pub fn with_z_source(z_source: ZSource) -> Self {
        Self {
            z_source,
            ..Self::default()
        }
    }
}

/// Cut a polygon along the cut line.
///
/// Returns `Ok(None)` if the cut line does not divide any component. Fails
/// if the summed result area deviates from the input area by more than the
/// configured ratio.
pub fn try_cut_polygon(
    polygon: &Polygon,
    cut_line: &Polyline,
    options: &CutOptions,
) -> Result<Option<Vec<Polygon>>> {
    let original_area = simplified_area(polygon, &options.tolerance);

    let result = if options.use_custom_intersect && !polygon.m_aware {
        cut_xy(polygon, cut_line, options)
    } else {
        cut_topological(polygon, cut_line, options)
    };

    if let Some(pieces) = &result {
        let new_area: f64 = pieces.iter().map(Polygon::area).sum();
        let tolerance = original_area * options.area_tolerance_ratio;
        if (new_area - original_area).abs() > tolerance {
            tracing::debug!(polygon = ?polygon, cut_line = ?cut_line, "Area check failed");
            return Err(Error::AreaNotConserved {
                original: original_area,
                result: new_area,
            });
        }
    }

    Ok(result)
}

/// Area of the polygon with self-intersecting components resolved under the
/// even-odd rule
fn simplified_area(polygon: &Polygon, tolerance: &Tolerance) -> f64 {
    polygon
        .groups
        .iter()
        .map(|group| {
            let rings: Vec<&Ring> = group.rings().collect();
            if has_self_intersections(&rings, tolerance.xy) {
                simplify_rings(&rings, tolerance.xy).iter().map(RingGroup::area).sum()
            } else {
                group.area()
            }
        })
        .sum()
}

/// Split components into the kept union and the new pieces
struct Partition {
    kept: Vec<RingGroup>,
    new: Vec<RingGroup>,
}

impl Partition {
    fn new() -> Self {
        Self {
            kept: Vec::new(),
            new: Vec::new(),
        }
    }

    fn add_uncut(&mut self, group: RingGroup) {
        self.kept.push(group);
    }

    fn add_pieces(&mut self, pieces: Vec<RingGroup>) {
        let largest = pieces
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.area().total_cmp(&b.area()))
            .map(|(i, _)| i);
        for (i, piece) in pieces.into_iter().enumerate() {
            if Some(i) == largest {
                self.kept.push(piece);
            } else {
                self.new.push(piece);
            }
        }
    }

    fn into_result(self, template: &Polygon) -> Option<Vec<Polygon>> {
        if self.new.is_empty() {
            return None;
        }
        let make = |groups: Vec<RingGroup>| {
            let mut polygon = Polygon {
                groups,
                z_aware: template.z_aware,
                m_aware: template.m_aware,
            };
            if !template.z_aware {
                polygon.drop_zs();
            }
            polygon
        };
        let mut result = vec![make(self.kept)];
        result.extend(self.new.into_iter().map(|g| make(vec![g])));
        Some(result)
    }
}

fn component_plane(group: &RingGroup, z_source: ZSource) -> Option<Plane3D> {
    match z_source {
        ZSource::FitSourcePlane => group.plane(),
        _ => None,
    }
}

fn cut_xy(polygon: &Polygon, cut_line: &Polyline, options: &CutOptions) -> Option<Vec<Polygon>> {
    let cut_paths = prepare_cut_paths(cut_line, options.z_source);
    let z_options = ZOptions {
        keep_cut_z: options.z_source == ZSource::UseCutPathZ,
        interpolate_boundary_z: false,
    };

    let mut partition = Partition::new();
    for group in &polygon.groups {
        let rings: Vec<&Ring> = group.rings().collect();
        let mut pieces = split_rings(&rings, &cut_paths, options.tolerance.xy, z_options);
        if pieces.len() < 2 {
            partition.add_uncut(group.clone());
            continue;
        }

        let plane = component_plane(group, options.z_source);
        for piece in &mut pieces {
            assign_new_zs(piece, plane.as_ref());
        }
        partition.add_pieces(pieces);
    }
    partition.into_result(polygon)
}

fn cut_topological(
    polygon: &Polygon,
    cut_line: &Polyline,
    options: &CutOptions,
) -> Option<Vec<Polygon>> {
    let mut partition = Partition::new();
    for group in &polygon.groups {
        let pieces = match cut_component(group, cut_line, options) {
            Ok(pieces) => pieces,
            Err(e) => {
                tracing::debug!(error = %e, "Unable to cut polygon");
                return None;
            }
        };
        if pieces.len() < 2 {
            partition.add_uncut(group.clone());
            continue;
        }

        let pieces = verified_pieces(polygon, pieces, cut_line, || {
            recut_component(group, cut_line, options)
        });
        partition.add_pieces(pieces);
    }
    partition.into_result(polygon)
}

/// Keep `pieces` if their Z values verify, otherwise replace them with the
/// recut. A recut that fails verification again is only reported.
fn verified_pieces(
    original: &Polygon,
    pieces: Vec<RingGroup>,
    cut_line: &Polyline,
    recut: impl FnOnce() -> Vec<RingGroup>,
) -> Vec<RingGroup> {
    if verify_zs(original, &pieces, cut_line) {
        return pieces;
    }

    let recut = recut();
    if !verify_zs(original, &recut, cut_line) {
        tracing::warn!(
            "Z verification failed. Please review Z values carefully and report in case of wrong Z values."
        );
    }
    if recut.len() < 2 {
        pieces
    } else {
        recut
    }
}

/// Second cut of a component whose first result failed Z verification.
/// Vertices still without Z take it from the source rings.
fn recut_component(group: &RingGroup, cut_line: &Polyline, options: &CutOptions) -> Vec<RingGroup> {
    let mut pieces = cut_component(group, cut_line, options).unwrap_or_default();
    for piece in &mut pieces {
        piece.interpolate_undefined_zs();
    }
    pieces
}

/// Topological cut of one component, retried once after simplification if
/// the component is not simple
fn cut_component(
    group: &RingGroup,
    cut_line: &Polyline,
    options: &CutOptions,
) -> Result<Vec<RingGroup>> {
    match cut_simple_component(group, cut_line, options) {
        Err(Error::NonSimpleGeometry(reason)) => {
            tracing::debug!(reason = %reason, "Cut failed. Trying again after simplify...");
            let rings: Vec<&Ring> = group.rings().collect();
            let simplified = simplify_rings(&rings, options.tolerance.xy);
            let mut pieces = Vec::new();
            let mut divided = false;
            for part in &simplified {
                let part_pieces = cut_simple_component(part, cut_line, options)?;
                divided |= part_pieces.len() > 1;
                pieces.extend(part_pieces);
            }
            if !divided {
                return Ok(vec![group.clone()]);
            }
            Ok(pieces)
        }
        other => other,
    }
}

fn cut_simple_component(
    group: &RingGroup,
    cut_line: &Polyline,
    options: &CutOptions,
) -> Result<Vec<RingGroup>> {
    let rings: Vec<&Ring> = group.rings().collect();
    if has_self_intersections(&rings, options.tolerance.xy) {
        return Err(Error::NonSimpleGeometry(
            "ring group with self-intersections".into(),
        ));
    }

    let cut_paths = prepare_cut_paths(cut_line, options.z_source);
    let z_options = ZOptions {
        keep_cut_z: options.z_source == ZSource::UseCutPathZ,
        interpolate_boundary_z: true,
    };
    let mut pieces = split_rings(&rings, &cut_paths, options.tolerance.xy, z_options);
    if pieces.len() < 2 {
        return Ok(vec![group.clone()]);
    }

    let plane = component_plane(group, options.z_source);
    match (plane, options.z_source) {
        (Some(plane), _) => pieces.iter_mut().for_each(|p| p.assign_undefined_zs(&plane)),
        (None, ZSource::InterpolateFromSource) => pieces.iter_mut().for_each(|p| {
            p.interpolate_undefined_zs();
        }),
        _ => {}
    }
    Ok(pieces)
}

/// Check that a cut did not introduce undefined or zero Z values
pub fn verify_zs(original: &Polygon, pieces: &[RingGroup], cut_line: &Polyline) -> bool {
    for piece in pieces {
        if piece.has_undefined_z() && !original.has_undefined_z() && !cut_line.has_undefined_z()
        {
            tracing::debug!(piece = ?piece, "Result polygon with NaN Zs");
            return false;
        }

        let zero_min = piece.min_z().map_or(false, |z| z.abs() < f64::EPSILON);
        let positive = |z: Option<f64>| z.map_or(false, |z| z > 0.0);
        if original.z_aware && zero_min && positive(original.min_z()) && positive(cut_line.min_z())
        {
            return false;
        }
    }
    true
}

/// Cut each component of a polygon (for example a multipatch footprint) with
/// the planar ring group cut.
///
/// Returns the union of the kept pieces followed by the new pieces, or `None`
/// if nothing was cut.
pub fn cut_ring_groups(
    polygon: &Polygon,
    cut_line: &Polyline,
    z_source: ZSource,
    tolerance: &Tolerance,
) -> Option<Vec<Polygon>> {
    let mut partition = Partition::new();
    for group in &polygon.groups {
        let pieces = cut_ring_group_planar(group, cut_line, z_source, tolerance);
        if pieces.len() < 2 {
            partition.add_uncut(group.clone());
        } else {
            partition.add_pieces(pieces);
        }
    }
    partition.into_result(polygon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutlite_core::Path;

    fn square(z: f64) -> Polygon {
        Polygon::from_ring(
            Ring::from_xyz(&[
                (100.0, 100.0, z),
                (200.0, 100.0, z),
                (200.0, 200.0, z),
                (100.0, 200.0, z),
            ]),
            true,
        )
    }

    fn vertical_cut(x: f64, z: f64) -> Polyline {
        Polyline::single(Path::from_xyz(&[(x, 50.0, z), (x, 250.0, z)]))
    }

    #[test]
    fn test_cut_square_keeps_largest_first() {
        let result = try_cut_polygon(&square(10.0), &vertical_cut(175.0, 10.0), &CutOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!((result[0].area() - 7500.0).abs() < 1e-6);
        assert!((result[1].area() - 2500.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_cut_returns_none() {
        let result =
            try_cut_polygon(&square(10.0), &vertical_cut(300.0, 10.0), &CutOptions::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_both_strategies_conserve_area() {
        let cut = Polyline::single(Path::from_xy(&[(90.0, 90.0), (150.0, 180.0), (210.0, 120.0)]));
        for use_custom_intersect in [true, false] {
            let options = CutOptions {
                use_custom_intersect,
                z_source: ZSource::InterpolateFromSource,
                ..CutOptions::default()
            };
            let result = try_cut_polygon(&square(10.0), &cut, &options).unwrap().unwrap();
            let total: f64 = result.iter().map(Polygon::area).sum();
            assert!((total - 10_000.0).abs() < 1e-6);
            assert!(result.iter().all(|p| !p.has_undefined_z()));
        }
    }

    #[test]
    fn test_cut_path_z_is_used_for_new_vertices() {
        let result = try_cut_polygon(&square(10.0), &vertical_cut(150.0, 30.0), &CutOptions::default())
            .unwrap()
            .unwrap();
        for polygon in &result {
            let zs: Vec<f64> = polygon.rings().flat_map(|r| r.points.iter().map(|p| p.z)).collect();
            assert_eq!(zs.iter().filter(|&&z| z == 30.0).count(), 2);
        }
    }

    #[test]
    fn test_non_z_aware_results_stay_non_z_aware() {
        let polygon = Polygon::from_ring(
            Ring::from_xy(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0), (100.0, 200.0)]),
            false,
        );
        let options = CutOptions {
            use_custom_intersect: false,
            ..CutOptions::default()
        };
        let result = try_cut_polygon(&polygon, &vertical_cut(175.0, 10.0), &options)
            .unwrap()
            .unwrap();
        assert!(result.iter().all(|p| !p.z_aware && p.has_undefined_z()));
    }

    #[test]
    fn test_self_intersecting_component_is_simplified_and_cut() {
        let bow_tie = Polygon::from_ring(
            Ring::from_xy(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]),
            false,
        );
        let options = CutOptions {
            use_custom_intersect: false,
            ..CutOptions::default()
        };
        let cut = Polyline::single(Path::from_xy(&[(2.0, -1.0), (2.0, 11.0)]));
        let result = try_cut_polygon(&bow_tie, &cut, &options).unwrap().unwrap();
        let total: f64 = result.iter().map(Polygon::area).sum();
        assert!((total - 50.0).abs() < 1e-9);

        // The untouched lobe is the largest piece; the cut lobe yields two new ones
        assert_eq!(result.len(), 3);
        assert!((result[0].area() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_verify_zs_detects_zero_z() {
        let original = square(10.0);
        let cut = vertical_cut(150.0, 10.0);
        let mut piece = original.groups[0].clone();
        piece.exterior.points[0].z = 0.0;
        assert!(!verify_zs(&original, &[piece.clone()], &cut));

        piece.exterior.points[0].z = f64::NAN;
        assert!(!verify_zs(&original, &[piece], &cut));
        assert!(verify_zs(&original, &original.groups, &cut));
    }

    #[test]
    fn test_failed_z_verification_takes_the_recut() {
        let original = square(10.0);
        let cut = vertical_cut(150.0, 10.0);
        let options = CutOptions {
            use_custom_intersect: false,
            ..CutOptions::default()
        };
        let good = cut_component(&original.groups[0], &cut, &options).unwrap();
        assert_eq!(good.len(), 2);
        assert!(verify_zs(&original, &good, &cut));

        let mut corrupted = good.clone();
        corrupted[0].exterior.points[1].z = f64::NAN;

        let mut recut_calls = 0;
        let pieces = verified_pieces(&original, corrupted, &cut, || {
            recut_calls += 1;
            good.clone()
        });
        assert_eq!(recut_calls, 1);
        assert_eq!(pieces, good);

        // Verified pieces are kept without recutting
        let pieces = verified_pieces(&original, good.clone(), &cut, || unreachable!());
        assert_eq!(pieces, good);
    }

    #[test]
    fn test_recut_fills_undefined_zs_from_the_source() {
        let original = square(10.0);
        let cut = Polyline::single(Path::from_xyz(&[
            (150.0, 50.0, 10.0),
            (150.0, 150.0, f64::NAN),
            (150.0, 250.0, 10.0),
        ]));
        let options = CutOptions {
            use_custom_intersect: false,
            ..CutOptions::default()
        };
        let pieces = recut_component(&original.groups[0], &cut, &options);
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().all(|p| !p.has_undefined_z()));
    }

    #[test]
    fn test_cut_ring_groups_without_cut() {
        let footprint = square(f64::NAN);
        let cut = vertical_cut(300.0, 0.0);
        assert!(cut_ring_groups(&footprint, &cut, ZSource::UseCutPathZ, &Tolerance::default()).is_none());
    }
}
