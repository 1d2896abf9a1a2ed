// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex insertion into features adjacent to a cut.
//!
//! Features sharing a boundary with a cut feature get a vertex wherever the
//! cut line crosses them so the shared boundaries stay snapped to each other.

use cutlite_core::segment::{project_on_segment, xy};
use cutlite_core::{Geometry, Path, Point3, Polyline};
use cutlite_geometry::crossings::polyline_intersections;

use crate::feature::Feature;

/// Insert `point` into the first segment of `points` it lies on, unless it
/// coincides with a vertex. Z is interpolated on the segment.
fn insert_point(points: &mut Vec<Point3<f64>>, closed: bool, point: &Point3<f64>, tolerance: f64) -> bool {
    let p = xy(point);
    if points.iter().any(|v| (xy(v) - p).norm() <= tolerance) {
        return false;
    }
    let n = points.len();
    let segment_count = if closed { n } else { n.saturating_sub(1) };
    for i in 0..segment_count {
        let (a, b) = (points[i], points[(i + 1) % n]);
        let (t, distance) = project_on_segment(&p, &xy(&a), &xy(&b));
        if distance <= tolerance {
            let z = a.z + (b.z - a.z) * t;
            points.insert(i + 1, Point3::new(p.x, p.y, z));
            return true;
        }
    }
    false
}

fn insert_into(points: &mut Vec<Point3<f64>>, closed: bool, cut_line: &Polyline, tolerance: f64) -> usize {
    let mut boundary = points.clone();
    if closed {
        if let Some(&first) = points.first() {
            boundary.push(first);
        }
    }
    let crossings = polyline_intersections(cut_line, &Polyline::new(vec![Path::new(boundary)], false), tolerance);
    crossings
        .iter()
        .filter(|crossing| insert_point(points, closed, crossing, tolerance))
        .count()
}

/// Insert the crossings with `cut_line` as vertices into the shape of
/// `feature`; returns the number of inserted vertices.
///
/// Polygon and polyline shapes are supported, other shapes are left as they
/// are.
pub fn insert_vertices(feature: &mut Feature, cut_line: &Polyline, tolerance: f64) -> usize {
    match feature.shape.as_mut() {
        Some(Geometry::Polygon(polygon)) => polygon
            .rings_mut()
            .map(|ring| insert_into(&mut ring.points, true, cut_line, tolerance))
            .sum(),
        Some(Geometry::Polyline(polyline)) => polyline
            .paths
            .iter_mut()
            .map(|path| insert_into(&mut path.points, false, cut_line, tolerance))
            .sum(),
        _ => 0,
    }
}
