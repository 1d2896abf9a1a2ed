// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intersections between cut paths and the boundaries they cross

use cutlite_core::segment::{intersect_segments, point_segment_distance, xy};
use cutlite_core::{Path, Polygon, Polyline, Ring};
use nalgebra::{Point2, Point3};

/// One intersection of a path with a ring, located on both
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub point: Point2<f64>,
    /// XY distance from the path start
    pub path_distance: f64,
    /// Ring segment index and parameter on it
    pub ring_segment: usize,
    pub ring_t: f64,
    /// XY distance along the ring from its first vertex
    pub ring_distance: f64,
}

fn segment_length(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (xy(b) - xy(a)).norm()
}

fn cumulative_lengths<'a>(
    segments: impl Iterator<Item = (&'a Point3<f64>, &'a Point3<f64>)>,
) -> Vec<f64> {
    let mut total = 0.0;
    let mut result = vec![0.0];
    for (a, b) in segments {
        total += segment_length(a, b);
        result.push(total);
    }
    result
}

/// All intersections of `path` with `ring`, ordered along the path and
/// merged within `tolerance`.
///
/// Collinear stretches contribute their two end points.
pub fn path_ring_crossings(path: &Path, ring: &Ring, tolerance: f64) -> Vec<Crossing> {
    if path.points.len() < 2 || ring.len() < 2 {
        return Vec::new();
    }
    if !path.envelope().intersects(&ring.envelope(), tolerance) {
        return Vec::new();
    }

    let path_offsets = cumulative_lengths(path.segments());
    let ring_offsets = cumulative_lengths(ring.segments());

    let mut crossings: Vec<Crossing> = Vec::new();
    for (i, (p0, p1)) in path.segments().enumerate() {
        let path_length = path_offsets[i + 1] - path_offsets[i];
        for (j, (r0, r1)) in ring.segments().enumerate() {
            let ring_length = ring_offsets[j + 1] - ring_offsets[j];
            for hit in intersect_segments(&xy(p0), &xy(p1), &xy(r0), &xy(r1), tolerance) {
                crossings.push(Crossing {
                    point: hit.point,
                    path_distance: path_offsets[i] + hit.t_a * path_length,
                    ring_segment: j,
                    ring_t: hit.t_b,
                    ring_distance: ring_offsets[j] + hit.t_b * ring_length,
                });
            }
        }
    }

    crossings.sort_by(|a, b| a.path_distance.total_cmp(&b.path_distance));
    let mut merged: Vec<Crossing> = Vec::with_capacity(crossings.len());
    for crossing in crossings {
        match merged.last() {
            Some(last) if (last.point - crossing.point).norm() <= tolerance => {}
            _ => merged.push(crossing),
        }
    }

    // A closed path meets a ring vertex at both its start and its end
    if merged.len() > 1 && path.is_closed(tolerance) {
        let first = merged[0].point;
        if let Some(last) = merged.last() {
            if (last.point - first).norm() <= tolerance {
                merged.pop();
            }
        }
    }
    merged
}

/// Intersections of `line` with all rings of `polygon`, ordered along each
/// path. Z values are interpolated on `line`.
pub fn polyline_polygon_intersections(
    line: &Polyline,
    polygon: &Polygon,
    tolerance: f64,
) -> Vec<Point3<f64>> {
    let mut points = Vec::new();
    for path in &line.paths {
        let mut hits: Vec<Crossing> = polygon
            .rings()
            .flat_map(|ring| path_ring_crossings(path, ring, tolerance))
            .collect();
        hits.sort_by(|a, b| a.path_distance.total_cmp(&b.path_distance));
        for hit in hits {
            if let Some(p) = path.point_along(hit.path_distance) {
                push_unique(&mut points, Point3::new(hit.point.x, hit.point.y, p.z), tolerance);
            }
        }
    }
    points
}

/// Intersection points of two polylines. Z values are interpolated on `line`.
pub fn polyline_intersections(
    line: &Polyline,
    other: &Polyline,
    tolerance: f64,
) -> Vec<Point3<f64>> {
    let mut points = Vec::new();
    for path in &line.paths {
        for other_path in &other.paths {
            if !path.envelope().intersects(&other_path.envelope(), tolerance) {
                continue;
            }
            let mut offset = 0.0;
            for (a0, a1) in path.segments() {
                let length = segment_length(a0, a1);
                for (b0, b1) in other_path.segments() {
                    for hit in intersect_segments(&xy(a0), &xy(a1), &xy(b0), &xy(b1), tolerance)
                    {
                        let z = path
                            .point_along(offset + hit.t_a * length)
                            .map_or(f64::NAN, |p| p.z);
                        push_unique(
                            &mut points,
                            Point3::new(hit.point.x, hit.point.y, z),
                            tolerance,
                        );
                    }
                }
                offset += length;
            }
        }
    }
    points
}

fn push_unique(points: &mut Vec<Point3<f64>>, point: Point3<f64>, tolerance: f64) {
    if points
        .iter()
        .all(|p| (xy(p) - xy(&point)).norm() > tolerance)
    {
        points.push(point);
    }
}

/// Whether `point` lies on the boundary of `ring` within tolerance
pub fn touches_ring(point: &Point2<f64>, ring: &Ring, tolerance: f64) -> bool {
    ring.distance_to_boundary(point) <= tolerance
}

/// Whether any segment of `ring` runs along the line through `a` and `b`
/// over a stretch longer than the tolerance
pub fn has_linear_overlap(
    a: &Point2<f64>,
    b: &Point2<f64>,
    ring: &Ring,
    tolerance: f64,
) -> bool {
    ring.segments().any(|(r0, r1)| {
        let hits = intersect_segments(a, b, &xy(r0), &xy(r1), tolerance);
        hits.len() == 2 && (hits[0].point - hits[1].point).norm() > tolerance && {
            let mid = nalgebra::center(&hits[0].point, &hits[1].point);
            point_segment_distance(&mid, a, b) <= tolerance
                && point_segment_distance(&mid, &xy(r0), &xy(r1)) <= tolerance
        }
    })
}

/// Whether two rings share a boundary stretch longer than the tolerance
pub fn rings_have_linear_intersection(ring: &Ring, other: &Ring, tolerance: f64) -> bool {
    if !ring.envelope().intersects(&other.envelope(), tolerance) {
        return false;
    }
    ring.segments()
        .any(|(a, b)| has_linear_overlap(&xy(a), &xy(b), other, tolerance))
}

/// Whether a path runs along the ring over a stretch longer than the tolerance
pub fn path_runs_along_ring(path: &Path, ring: &Ring, tolerance: f64) -> bool {
    path.segments()
        .any(|(a, b)| has_linear_overlap(&xy(a), &xy(b), ring, tolerance))
}
