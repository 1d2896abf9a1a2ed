// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cutting a single ring group in its own plane
//!
//! The cut line acts as a vertical curtain: sloped and flat ring groups are
//! cut in their XY projection, vertical ring groups (walls) in a local frame
//! spanned by their horizontal direction and Z.

use cutlite_core::segment::{intersect_segments, xy};
use cutlite_core::{Path, Plane3D, Polyline, Ring, RingGroup, Tolerance, ZSource};
use nalgebra::Point3;

use crate::arrangement::{split_rings, ZOptions};
use crate::vertical::WallFrame;

/// Prepare the cut paths for the Z source: only [`ZSource::UseCutPathZ`]
/// keeps the Z values of the cut line
pub fn prepare_cut_paths(cut_line: &Polyline, z_source: ZSource) -> Vec<Path> {
    cut_line
        .paths
        .iter()
        .map(|path| {
            let mut path = path.clone();
            if z_source != ZSource::UseCutPathZ {
                for p in &mut path.points {
                    p.z = f64::NAN;
                }
            }
            path
        })
        .collect()
}

/// Fill the undefined Z values of a cut result per Z source
pub fn assign_new_zs(group: &mut RingGroup, plane: Option<&Plane3D>) {
    match plane {
        Some(plane) => group.assign_undefined_zs(plane),
        None => {
            group.interpolate_undefined_zs();
        }
    }
}

/// Cut a ring group along the cut line.
///
/// Returns the cut pieces with the id and orientation of the input, or the
/// uncut input if the cut line does not divide it.
pub fn cut_ring_group_planar(
    group: &RingGroup,
    cut_line: &Polyline,
    z_source: ZSource,
    tolerance: &Tolerance,
) -> Vec<RingGroup> {
    let cut_paths = prepare_cut_paths(cut_line, z_source);

    let mut pieces = if group.is_vertical(tolerance) {
        cut_vertical_group(group, &cut_paths, tolerance.xy)
    } else {
        let rings: Vec<&Ring> = group.rings().collect();
        let z_options = ZOptions {
            keep_cut_z: z_source == ZSource::UseCutPathZ,
            interpolate_boundary_z: false,
        };
        let mut pieces = split_rings(&rings, &cut_paths, tolerance.xy, z_options);
        if group.is_inverted() {
            for piece in &mut pieces {
                piece.reverse();
            }
        }
        pieces
    };

    if pieces.len() < 2 {
        return vec![group.clone()];
    }

    let plane = match z_source {
        ZSource::FitSourcePlane => group.plane(),
        _ => None,
    };
    for piece in &mut pieces {
        piece.id = group.id;
        assign_new_zs(piece, plane.as_ref());
    }

    tracing::debug!(
        pieces = pieces.len(),
        vertical = group.is_vertical(tolerance),
        "Cut ring group"
    );
    pieces
}

fn cut_vertical_group(group: &RingGroup, cut_paths: &[Path], tolerance: f64) -> Vec<RingGroup> {
    let Some(frame) = WallFrame::new(&group.exterior) else {
        return Vec::new();
    };
    let (zmin, zmax) = group.exterior.z_range();
    if !zmin.is_finite() {
        return Vec::new();
    }

    // Each crossing of the cut line with the wall line becomes a vertical cut
    let (a, b) = (frame.origin, frame.end());
    let mut local_cuts = Vec::new();
    for path in cut_paths {
        for (p0, p1) in path.segments() {
            let hits = intersect_segments(&xy(p0), &xy(p1), &a, &b, tolerance);
            if hits.len() != 1 {
                continue;
            }
            let u = hits[0].t_b * frame.length;
            local_cuts.push(Path::new(vec![
                Point3::new(u, zmin - 1.0, f64::NAN),
                Point3::new(u, zmax + 1.0, f64::NAN),
            ]));
        }
    }
    if local_cuts.is_empty() {
        return Vec::new();
    }

    let local_rings: Vec<Ring> = group
        .rings()
        .map(|ring| Ring {
            points: ring.points.iter().map(|p| frame.to_local(p)).collect(),
        })
        .collect();
    let counter_clockwise = !local_rings[0].is_clockwise();
    let ring_refs: Vec<&Ring> = local_rings.iter().collect();

    let z_options = ZOptions {
        keep_cut_z: false,
        interpolate_boundary_z: true,
    };
    split_rings(&ring_refs, &local_cuts, tolerance, z_options)
        .into_iter()
        .map(|mut piece| {
            if !counter_clockwise {
                piece.reverse();
            }
            for ring in piece.rings_mut() {
                for p in &mut ring.points {
                    *p = frame.to_world(p);
                }
            }
            piece
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall() -> RingGroup {
        RingGroup::new(Ring::from_xyz(&[
            (0.0, 500.0, 0.0),
            (0.0, 500.0, 50.0),
            (100.0, 500.0, 50.0),
            (100.0, 500.0, 0.0),
        ]))
    }

    #[test]
    fn test_cut_vertical_wall() {
        let cut = Polyline::single(Path::from_xy(&[(51.0, 400.0), (51.0, 600.0)]));
        let pieces = cut_ring_group_planar(&wall(), &cut, ZSource::UseCutPathZ, &Tolerance::default());
        assert_eq!(pieces.len(), 2);

        let mut areas: Vec<f64> = pieces.iter().map(RingGroup::area_3d).collect();
        areas.sort_by(f64::total_cmp);
        assert_relative_eq!(areas[0], 49.0 * 50.0, epsilon = 1e-6);
        assert_relative_eq!(areas[1], 51.0 * 50.0, epsilon = 1e-6);

        for piece in &pieces {
            assert!(piece.is_vertical(&Tolerance::default()));
            assert!(!piece.has_undefined_z());
            assert!(piece.exterior.points.iter().all(|p| (p.y - 500.0).abs() < 1e-9));
        }
    }

    #[test]
    fn test_cut_roof_takes_plane_z() {
        // z = x / 10
        let mut roof = RingGroup::new(Ring::from_xyz(&[
            (0.0, 0.0, 0.0),
            (100.0, 0.0, 10.0),
            (100.0, 100.0, 10.0),
            (0.0, 100.0, 0.0),
        ]));
        roof.id = Some(4);
        let cut = Polyline::single(Path::from_xyz(&[(30.0, -10.0, 99.0), (30.0, 110.0, 99.0)]));
        let pieces = cut_ring_group_planar(&roof, &cut, ZSource::FitSourcePlane, &Tolerance::default());
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            assert_eq!(piece.id, Some(4));
            for p in &piece.exterior.points {
                assert_relative_eq!(p.z, p.x / 10.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_uncut_group_is_returned_unchanged() {
        let cut = Polyline::single(Path::from_xy(&[(200.0, 400.0), (200.0, 600.0)]));
        let pieces = cut_ring_group_planar(&wall(), &cut, ZSource::UseCutPathZ, &Tolerance::default());
        assert_eq!(pieces, vec![wall()]);
    }

    #[test]
    fn test_inverted_group_keeps_orientation() {
        let floor = RingGroup::new(Ring::from_xyz(&[
            (0.0, 0.0, 5.0),
            (0.0, 100.0, 5.0),
            (100.0, 100.0, 5.0),
            (100.0, 0.0, 5.0),
        ]));
        assert!(floor.is_inverted());
        let cut = Polyline::single(Path::from_xy(&[(50.0, -10.0), (50.0, 110.0)]));
        let pieces = cut_ring_group_planar(&floor, &cut, ZSource::InterpolateFromSource, &Tolerance::default());
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().all(RingGroup::is_inverted));
        for piece in &pieces {
            assert!(piece.exterior.points.iter().all(|p| (p.z - 5.0).abs() < 1e-9));
        }
    }
}
