// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 3D Intersection Lines
//!
//! Intersects the planar ring groups of a multipatch with the ring groups of
//! a cut surface. Each pair of non-parallel planes meets in a line; the parts
//! of that line inside both ring groups are the intersection segments. The
//! segments are chained into lines, and the lines can be projected into one
//! planar cut line for [`try_cut_multipatch`](crate::try_cut_multipatch).

use std::collections::VecDeque;

use cutlite_core::segment::xy;
use cutlite_core::{Multipatch, Path, Plane3D, Polyline, RingGroup, Tolerance};
use nalgebra::{Point3, Vector3};

use crate::error::Result;

type Segment = [Point3<f64>; 2];

/// Line in which two planes meet: a point on it and its unit direction
fn plane_intersection(a: &Plane3D, b: &Plane3D) -> Option<(Point3<f64>, Vector3<f64>)> {
    let direction = a.normal.cross(&b.normal);
    let sin = direction.norm();
    if sin < 1e-9 {
        return None;
    }

    let (ha, hb) = (a.normal.dot(&a.point.coords), b.normal.dot(&b.point.coords));
    let cos = a.normal.dot(&b.normal);
    let det = 1.0 - cos * cos;
    let point = (a.normal * (ha - hb * cos) + b.normal * (hb - ha * cos)) / det;
    Some((Point3::from(point), direction / sin))
}

/// Parameter intervals of the line `(origin, direction)` inside `group`.
///
/// The line lies in the plane of `group`; `other` is the second plane
/// through it. Boundary edges crossing `other` bound the intervals.
fn inside_intervals(
    group: &RingGroup,
    other: &Plane3D,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Vec<(f64, f64)> {
    let mut ts: Vec<f64> = Vec::new();
    for ring in group.rings() {
        for (a, b) in ring.segments() {
            let (da, db) = (other.signed_distance(a), other.signed_distance(b));
            if (da > 0.0) == (db > 0.0) {
                continue;
            }
            let crossing = a + (b - a) * (da / (da - db));
            ts.push((crossing - origin).dot(direction));
        }
    }
    ts.sort_by(f64::total_cmp);
    ts.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

fn overlap(a: &[(f64, f64)], b: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    let mut result = Vec::new();
    for &(a0, a1) in a {
        for &(b0, b1) in b {
            let (t0, t1) = (a0.max(b0), a1.min(b1));
            if t1 - t0 > tolerance {
                result.push((t0, t1));
            }
        }
    }
    result
}

/// Segments in which two planar ring groups intersect
pub fn ring_group_intersections(
    group: &RingGroup,
    surface: &RingGroup,
    tolerance: &Tolerance,
) -> Vec<Segment> {
    let (Some(plane), Some(surface_plane)) = (group.plane(), surface.plane()) else {
        return Vec::new();
    };
    let Some((origin, direction)) = plane_intersection(&plane, &surface_plane) else {
        return Vec::new();
    };

    let inside_group = inside_intervals(group, &surface_plane, &origin, &direction);
    let inside_surface = inside_intervals(surface, &plane, &origin, &direction);
    overlap(&inside_group, &inside_surface, tolerance.xy)
        .into_iter()
        .map(|(t0, t1)| [origin + direction * t0, origin + direction * t1])
        .collect()
}

fn same_segment(a: &Segment, b: &Segment, tolerance: f64) -> bool {
    let near = |p: &Point3<f64>, q: &Point3<f64>| (p - q).norm() <= tolerance;
    (near(&a[0], &b[0]) && near(&a[1], &b[1])) || (near(&a[0], &b[1]) && near(&a[1], &b[0]))
}

/// Chain segments sharing end points (in XY) into paths
fn chain_segments(mut segments: Vec<Segment>, tolerance: f64) -> Vec<Path> {
    let near = |p: &Point3<f64>, q: &Point3<f64>| (xy(p) - xy(q)).norm() <= tolerance;
    let mut paths = Vec::new();
    while let Some([a, b]) = segments.pop() {
        let mut points: VecDeque<Point3<f64>> = VecDeque::from([a, b]);
        loop {
            let (Some(&front), Some(&back)) = (points.front(), points.back()) else {
                break;
            };
            let Some(index) = segments.iter().position(|[s, e]| {
                near(s, &back) || near(e, &back) || near(s, &front) || near(e, &front)
            }) else {
                break;
            };
            let [s, e] = segments.swap_remove(index);
            if near(&s, &back) {
                points.push_back(e);
            } else if near(&e, &back) {
                points.push_back(s);
            } else if near(&s, &front) {
                points.push_front(e);
            } else {
                points.push_front(s);
            }
        }
        paths.push(Path::new(points.into()));
    }
    paths
}

/// Intersection lines of a multipatch with a cut surface.
///
/// Segments without XY extent (where a wall meets a vertical surface) carry
/// no cut information and are dropped.
pub fn intersection_lines(
    multipatch: &Multipatch,
    surface: &Multipatch,
    tolerance: &Tolerance,
) -> Result<Vec<Path>> {
    let groups = multipatch.ring_groups()?;
    let surface_groups = surface.ring_groups()?;

    let mut segments: Vec<Segment> = Vec::new();
    for group in &groups {
        for surface_group in &surface_groups {
            for segment in ring_group_intersections(group, surface_group, tolerance) {
                if (xy(&segment[1]) - xy(&segment[0])).norm() <= tolerance.xy {
                    continue;
                }
                if segments.iter().any(|s| same_segment(s, &segment, tolerance.xy)) {
                    continue;
                }
                segments.push(segment);
            }
        }
    }

    let lines = chain_segments(segments, tolerance.xy);
    tracing::debug!(
        groups = groups.len(),
        surface_groups = surface_groups.len(),
        lines = lines.len(),
        "Intersected multipatch with cut surface"
    );
    Ok(lines)
}

/// Union of intersection lines as one planar cut line; `None` if empty
pub fn planar_cut_line(lines: &[Path], tolerance: f64) -> Option<Polyline> {
    let segments: Vec<Segment> = lines
        .iter()
        .flat_map(|line| line.segments().map(|(a, b)| [*a, *b]))
        .collect();
    let paths = chain_segments(segments, tolerance);
    (!paths.is_empty()).then(|| Polyline::new(paths, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cutlite_core::{Patch, PatchKind};

    fn patch(points: &[(f64, f64, f64)]) -> Patch {
        let mut points: Vec<Point3<f64>> =
            points.iter().map(|&(x, y, z)| Point3::new(x, y, z)).collect();
        points.push(points[0]);
        Patch::new(PatchKind::OuterRing, points)
    }

    fn roof() -> Multipatch {
        Multipatch::new(vec![patch(&[
            (0.0, 0.0, 10.0),
            (100.0, 0.0, 10.0),
            (100.0, 100.0, 10.0),
            (0.0, 100.0, 10.0),
        ])])
    }

    fn curtain(x: f64) -> Multipatch {
        Multipatch::new(vec![patch(&[
            (x, -10.0, 0.0),
            (x, 110.0, 0.0),
            (x, 110.0, 20.0),
            (x, -10.0, 20.0),
        ])])
    }

    #[test]
    fn test_roof_meets_curtain() {
        let lines = intersection_lines(&roof(), &curtain(51.0), &Tolerance::default()).unwrap();
        assert_eq!(lines.len(), 1);

        let line = &lines[0];
        assert_eq!(line.points.len(), 2);
        assert_relative_eq!(line.length_xy(), 100.0, epsilon = 1e-9);
        for p in &line.points {
            assert_relative_eq!(p.x, 51.0, epsilon = 1e-9);
            assert_relative_eq!(p.z, 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_curtain_beside_roof() {
        let lines = intersection_lines(&roof(), &curtain(150.0), &Tolerance::default()).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_parallel_planes_do_not_meet() {
        let lid = Multipatch::new(vec![patch(&[
            (0.0, 0.0, 20.0),
            (100.0, 0.0, 20.0),
            (100.0, 100.0, 20.0),
            (0.0, 100.0, 20.0),
        ])]);
        assert!(intersection_lines(&roof(), &lid, &Tolerance::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_gable_roof_lines_chain_into_one_cut_line() {
        // Two roof planes meeting at the ridge y = 50
        let gable = Multipatch::new(vec![
            patch(&[(0.0, 0.0, 10.0), (100.0, 0.0, 10.0), (100.0, 50.0, 20.0), (0.0, 50.0, 20.0)]),
            patch(&[(0.0, 50.0, 20.0), (100.0, 50.0, 20.0), (100.0, 100.0, 10.0), (0.0, 100.0, 10.0)]),
        ]);
        let lines = intersection_lines(&gable, &curtain(30.0), &Tolerance::default()).unwrap();
        let cut_line = planar_cut_line(&lines, 0.001).unwrap();

        assert_eq!(cut_line.paths.len(), 1);
        assert_eq!(cut_line.paths[0].points.len(), 3);
        assert_relative_eq!(cut_line.length_xy(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(cut_line.min_z().unwrap(), 10.0, epsilon = 1e-9);
    }
}
