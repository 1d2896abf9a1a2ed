// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multipatch Cutting
//!
//! A multipatch is cut by cutting its 2D footprint first. Every ring group is
//! then cut in its own plane and each resulting piece is assigned to exactly
//! one footprint part:
//!
//! - non-vertical pieces by interior intersection with the footprint part
//! - vertical pieces (walls) by a shared boundary stretch with the footprint
//!   part, or else by containment
//!
//! One multipatch is assembled per footprint part. A result whose footprint
//! fails the degenerate footprint check is handled per
//! [`DegenerateFootprintPolicy`].

use std::f64::consts::SQRT_2;

use cutlite_core::{
    DegenerateFootprintPolicy, Multipatch, Polygon, Polyline, Ring, RingGroup, Tolerance,
    ZSource,
};

use crate::arrangement::simplify_rings;
use crate::bool2d;
use crate::crossings::rings_have_linear_intersection;
use crate::cut::cut_ring_groups;
use crate::error::{Error, Result};
use crate::planar_cut::cut_ring_group_planar;

/// Options for multipatch cutting
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MultipatchCutOptions {
    pub z_source: ZSource,
    pub tolerance: Tolerance,
    pub degenerate_policy: DegenerateFootprintPolicy,
}

/// Detects result multipatches with a broken footprint
pub trait FootprintCheck {
    fn is_degenerate(&self, multipatch: &Multipatch, tolerance: &Tolerance) -> bool;
}

/// Compares the ring length of single ring multipatches with the length of
/// their footprint boundary
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryLengthCheck;

impl FootprintCheck for BoundaryLengthCheck {
    fn is_degenerate(&self, multipatch: &Multipatch, tolerance: &Tolerance) -> bool {
        is_multipatch_with_degenerate_footprint(multipatch, tolerance)
    }
}

/// One cut result: the footprint part and the multipatch assembled for it
#[derive(Debug, Clone, PartialEq)]
pub struct MultipatchPart {
    pub footprint: Polygon,
    pub multipatch: Multipatch,
}

/// 2D footprint of ring groups: the union of the non-vertical groups
pub fn footprint(groups: &[RingGroup], tolerance: &Tolerance) -> Polygon {
    let oriented: Vec<RingGroup> = groups
        .iter()
        .filter(|g| !g.is_vertical(tolerance))
        .map(|g| {
            let mut g = g.clone();
            if g.is_inverted() {
                g.reverse();
            }
            g
        })
        .collect();
    bool2d::union_groups(&oriented)
}

/// Cut a multipatch along the cut line with the boundary length check
pub fn try_cut_multipatch(
    multipatch: &Multipatch,
    cut_line: &Polyline,
    options: &MultipatchCutOptions,
) -> Result<Vec<MultipatchPart>> {
    try_cut_multipatch_with(multipatch, cut_line, options, &BoundaryLengthCheck)
}

/// Cut a multipatch along the cut line.
///
/// Returns one part per footprint piece, or an empty list if the footprint
/// itself cannot be cut.
pub fn try_cut_multipatch_with(
    multipatch: &Multipatch,
    cut_line: &Polyline,
    options: &MultipatchCutOptions,
    check: &dyn FootprintCheck,
) -> Result<Vec<MultipatchPart>> {
    if multipatch.patches.iter().any(|p| p.kind.is_triangle_based()) {
        return Err(Error::UnsupportedGeometry(
            "The multipatch geometry contains triangles, triangle fans or triangle strips, \
             which are currently not supported"
                .into(),
        ));
    }

    let tolerance = &options.tolerance;
    let groups = multipatch.ring_groups()?;
    let footprint = footprint(&groups, tolerance);

    let footprint_parts = cut_ring_groups(&footprint, cut_line, ZSource::UseCutPathZ, tolerance)
        .unwrap_or_default();
    if footprint_parts.is_empty() {
        tracing::debug!("Not even the footprint could be cut. No multipatch cutting performed.");
        return Ok(Vec::new());
    }

    let mut assigned: Vec<Vec<RingGroup>> = vec![Vec::new(); footprint_parts.len()];
    for group in &groups {
        cut_and_assign(group, cut_line, options, &footprint_parts, &mut assigned)?;
    }

    build_result_multipatches(footprint_parts, assigned, options, check)
}

fn cut_and_assign(
    group: &RingGroup,
    cut_line: &Polyline,
    options: &MultipatchCutOptions,
    footprint_parts: &[Polygon],
    assigned: &mut [Vec<RingGroup>],
) -> Result<()> {
    let tolerance = &options.tolerance;
    let mut group = group.clone();
    let inverted = group.is_inverted();
    if inverted {
        group.reverse();
    }

    let pieces = cut_ring_group_planar(&group, cut_line, options.z_source, tolerance);

    for mut piece in pieces {
        let targets: Vec<usize> = footprint_parts
            .iter()
            .enumerate()
            .filter(|(_, part)| belongs_to(&piece, part, tolerance))
            .map(|(i, _)| i)
            .collect();

        if targets.len() != 1 {
            return Err(Error::Assertion(
                "Unexpected number of assignments to footprint parts.".into(),
            ));
        }

        if inverted {
            piece.reverse();
        }
        assigned[targets[0]].push(piece);
    }
    Ok(())
}

fn belongs_to(piece: &RingGroup, part: &Polygon, tolerance: &Tolerance) -> bool {
    if piece.is_vertical(tolerance) {
        let linear = part
            .rings()
            .any(|ring| rings_have_linear_intersection(ring, &piece.exterior, tolerance.xy));
        linear || contains_ring_xy(part, &piece.exterior, tolerance.xy)
    } else {
        let mut polygon = Polygon::new(vec![piece.clone()], false);
        polygon.normalize_orientation();
        bool2d::interior_intersects(part, &polygon, tolerance.xy)
    }
}

/// All vertices of `ring` inside `polygon` or on its boundary
fn contains_ring_xy(polygon: &Polygon, ring: &Ring, tolerance: f64) -> bool {
    ring.points.iter().all(|p| {
        let p = nalgebra::Point2::new(p.x, p.y);
        polygon.contains_point_xy(&p) || polygon.rings().any(|r| r.distance_to_boundary(&p) <= tolerance)
    })
}

fn build_result_multipatches(
    footprint_parts: Vec<Polygon>,
    assigned: Vec<Vec<RingGroup>>,
    options: &MultipatchCutOptions,
    check: &dyn FootprintCheck,
) -> Result<Vec<MultipatchPart>> {
    let mut result = Vec::with_capacity(footprint_parts.len());
    for (footprint, groups) in footprint_parts.into_iter().zip(assigned) {
        let multipatch = Multipatch::from_ring_groups(&groups);

        if check.is_degenerate(&multipatch, &options.tolerance) {
            match options.degenerate_policy {
                DegenerateFootprintPolicy::Throw => {
                    return Err(Error::DegenerateResultGeometry(
                        "The multipatch cut operation resulted in a multipatch with degenerate footprint."
                            .into(),
                    ));
                }
                DegenerateFootprintPolicy::Discard => {
                    tracing::debug!(
                        multipatch = ?multipatch,
                        "Discarding result multipatch with degenerate boundary"
                    );
                    continue;
                }
                DegenerateFootprintPolicy::Keep => {
                    tracing::warn!(
                        multipatch = ?multipatch,
                        "Detected result multipatch with degenerate boundary (it will be kept)"
                    );
                }
            }
        }

        result.push(MultipatchPart {
            footprint,
            multipatch,
        });
    }
    Ok(result)
}

/// Whether a single ring multipatch has a footprint whose boundary length
/// disagrees with the ring length, even after simplifying the ring.
///
/// Only rectangular footprints (boundary of 5 points) are diagnosed; the
/// length tolerance is the diagonal of two tolerance squares.
pub fn is_multipatch_with_degenerate_footprint(
    multipatch: &Multipatch,
    tolerance: &Tolerance,
) -> bool {
    if multipatch.patches.len() != 1 {
        return false;
    }
    let Ok(groups) = multipatch.ring_groups() else {
        return false;
    };
    let Some(group) = groups.first() else {
        return false;
    };
    let ring = &group.exterior;

    let mut oriented = RingGroup::new(ring.clone());
    if oriented.is_inverted() {
        oriented.reverse();
    }
    let boundary = bool2d::union_groups(&[oriented]);
    if boundary.point_count() != 5 {
        return false;
    }

    let length_tolerance = 2.0 * SQRT_2 * tolerance.xy;
    let boundary_length = boundary.length_xy();
    if (ring.length_xy() - boundary_length).abs() <= length_tolerance {
        return false;
    }

    let simplified_length: f64 = simplify_rings(&[ring], tolerance.xy)
        .iter()
        .flat_map(|g| g.rings().map(Ring::length_xy).collect::<Vec<_>>())
        .sum();
    (simplified_length - boundary_length).abs() > length_tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutlite_core::{Patch, PatchKind, Path};
    use nalgebra::Point3;

    fn pts(coords: &[(f64, f64, f64)]) -> Vec<Point3<f64>> {
        let mut points: Vec<Point3<f64>> =
            coords.iter().map(|&(x, y, z)| Point3::new(x, y, z)).collect();
        points.push(points[0]);
        points
    }

    fn flat_roof() -> Multipatch {
        Multipatch::new(vec![Patch::new(
            PatchKind::OuterRing,
            pts(&[(0.0, 0.0, 10.0), (100.0, 0.0, 10.0), (100.0, 100.0, 10.0), (0.0, 100.0, 10.0)]),
        )])
    }

    fn cut_at(x: f64) -> Polyline {
        Polyline::single(Path::from_xy(&[(x, -10.0), (x, 110.0)]))
    }

    struct AlwaysDegenerate;

    impl FootprintCheck for AlwaysDegenerate {
        fn is_degenerate(&self, _: &Multipatch, _: &Tolerance) -> bool {
            true
        }
    }

    #[test]
    fn test_cut_flat_roof() {
        let parts = try_cut_multipatch(&flat_roof(), &cut_at(51.0), &MultipatchCutOptions::default())
            .unwrap();
        assert_eq!(parts.len(), 2);
        assert!((parts[0].footprint.area() - 5100.0).abs() < 1e-6);
        assert!((parts[0].multipatch.area_3d() - 5100.0).abs() < 1e-6);
        assert!((parts[1].multipatch.area_3d() - 4900.0).abs() < 1e-6);
        assert!(parts
            .iter()
            .all(|p| p.multipatch.patches.iter().all(|patch| patch.points.iter().all(|q| q.z == 10.0))));
    }

    #[test]
    fn test_footprint_miss_is_a_no_op() {
        let parts = try_cut_multipatch(&flat_roof(), &cut_at(300.0), &MultipatchCutOptions::default())
            .unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_triangles_are_rejected() {
        let multipatch = Multipatch::new(vec![Patch::new(
            PatchKind::TriangleStrip,
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        )]);
        let err = try_cut_multipatch(&multipatch, &cut_at(0.5), &MultipatchCutOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("currently not supported"));
    }

    #[test]
    fn test_degenerate_policies() {
        let mut options = MultipatchCutOptions::default();

        options.degenerate_policy = DegenerateFootprintPolicy::Throw;
        let err = try_cut_multipatch_with(&flat_roof(), &cut_at(51.0), &options, &AlwaysDegenerate)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateResultGeometry(_)));

        options.degenerate_policy = DegenerateFootprintPolicy::Discard;
        let parts =
            try_cut_multipatch_with(&flat_roof(), &cut_at(51.0), &options, &AlwaysDegenerate).unwrap();
        assert!(parts.is_empty());

        options.degenerate_policy = DegenerateFootprintPolicy::Keep;
        let parts =
            try_cut_multipatch_with(&flat_roof(), &cut_at(51.0), &options, &AlwaysDegenerate).unwrap();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_rectangle_footprint_is_not_degenerate() {
        assert!(!is_multipatch_with_degenerate_footprint(&flat_roof(), &Tolerance::default()));
    }

    /// Single ring running around a rectangle and, over a bridge, around a
    /// smaller rectangle inside it. Its boundary is the outer rectangle only.
    fn rectangle_minus_rectangle() -> Multipatch {
        Multipatch::new(vec![Patch::new(
            PatchKind::OuterRing,
            pts(&[
                (0.0, 0.0, 10.0),
                (100.0, 0.0, 10.0),
                (100.0, 100.0, 10.0),
                (0.0, 100.0, 10.0),
                (0.0, 0.0, 10.0),
                (40.0, 40.0, 10.0),
                (60.0, 40.0, 10.0),
                (60.0, 60.0, 10.0),
                (40.0, 60.0, 10.0),
                (40.0, 40.0, 10.0),
            ]),
        )])
    }

    #[test]
    fn test_rectangle_minus_rectangle_is_degenerate() {
        let multipatch = rectangle_minus_rectangle();
        let groups = multipatch.ring_groups().unwrap();
        assert_eq!(groups[0].exterior.len(), 10);

        let boundary = bool2d::union_groups(&groups);
        assert_eq!(boundary.point_count(), 5);
        assert!((boundary.length_xy() - 400.0).abs() < 1e-6);

        assert!(is_multipatch_with_degenerate_footprint(&multipatch, &Tolerance::default()));
    }

    #[test]
    fn test_degenerate_result_is_handled_per_policy() {
        let footprint = Polygon::from_ring(
            Ring::from_xy(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]),
            false,
        );
        let groups = rectangle_minus_rectangle().ring_groups().unwrap();
        let build = |policy| {
            let options = MultipatchCutOptions {
                degenerate_policy: policy,
                ..MultipatchCutOptions::default()
            };
            build_result_multipatches(
                vec![footprint.clone()],
                vec![groups.clone()],
                &options,
                &BoundaryLengthCheck,
            )
        };

        let err = build(DegenerateFootprintPolicy::Throw).unwrap_err();
        assert!(matches!(err, Error::DegenerateResultGeometry(_)));
        assert!(build(DegenerateFootprintPolicy::Discard).unwrap().is_empty());

        let kept = build(DegenerateFootprintPolicy::Keep).unwrap();
        assert_eq!(kept.len(), 1);
        assert!((kept[0].footprint.area() - 10_000.0).abs() < 1e-6);
        assert_eq!(kept[0].multipatch.patches.len(), 1);
    }
}
