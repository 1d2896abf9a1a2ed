// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyline Cutting
//!
//! A polyline is split at its intersections with the cut line. Single part
//! polylines explode into one polyline per piece. For multipart polylines
//! the pieces are grouped by the side of the cut line they start or end on
//! (left, right, or both) and each group becomes one result; paths that are
//! not split join the largest result. Results are ordered largest first.

use cutlite_core::segment::{project_on_segment, xy};
use cutlite_core::{Path, Polyline};
use nalgebra::Point3;

use crate::crossings::polyline_intersections;

/// Cut a polyline along the cut line; `None` if they do not intersect
pub fn try_cut_polyline(
    polyline: &Polyline,
    cut_line: &Polyline,
    tolerance: f64,
) -> Option<Vec<Polyline>> {
    let split_points = polyline_intersections(polyline, cut_line, tolerance);
    if split_points.is_empty() {
        return None;
    }

    let mut result = if polyline.paths.len() > 1 {
        split_multipart(polyline, cut_line, &split_points, tolerance)
    } else {
        polyline
            .paths
            .iter()
            .flat_map(|path| split_path(path, &split_points, tolerance))
            .map(|piece| Polyline::new(vec![piece], polyline.z_aware))
            .collect()
    };

    result.sort_by(|a, b| b.length_xy().total_cmp(&a.length_xy()));
    Some(result)
}

/// Split distances of `points` along `path`, excluding the path ends
fn split_distances(path: &Path, points: &[Point3<f64>], tolerance: f64) -> Vec<f64> {
    let length = path.length_xy();
    let mut distances: Vec<f64> = Vec::new();
    for point in points {
        let p = xy(point);
        let mut offset = 0.0;
        let mut best: Option<(f64, f64)> = None;
        for (a, b) in path.segments() {
            let (a, b) = (xy(a), xy(b));
            let segment_length = (b - a).norm();
            let (t, distance) = project_on_segment(&p, &a, &b);
            if distance <= tolerance && best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, offset + t * segment_length));
            }
            offset += segment_length;
        }
        if let Some((_, along)) = best {
            if along > tolerance && along < length - tolerance {
                distances.push(along);
            }
        }
    }
    distances.sort_by(f64::total_cmp);
    distances.dedup_by(|a, b| (*a - *b).abs() <= tolerance);
    distances
}

/// Crack a path at the split points
fn split_path(path: &Path, points: &[Point3<f64>], tolerance: f64) -> Vec<Path> {
    let mut pieces = Vec::new();
    let mut remaining = path.clone();
    let mut offset = 0.0;
    for distance in split_distances(path, points, tolerance) {
        match remaining.split_at_distance(distance - offset) {
            Some((head, tail)) => {
                pieces.push(head);
                remaining = tail;
                offset = distance;
            }
            None => break,
        }
    }
    pieces.push(remaining);
    pieces
}

#[derive(Default)]
struct SideGroups {
    left: Vec<Path>,
    right: Vec<Path>,
    both: Vec<Path>,
}

fn split_multipart(
    polyline: &Polyline,
    cut_line: &Polyline,
    split_points: &[Point3<f64>],
    tolerance: f64,
) -> Vec<Polyline> {
    let mut groups = SideGroups::default();
    let mut not_split: Vec<Path> = Vec::new();

    for path in &polyline.paths {
        let pieces = split_path(path, split_points, tolerance);
        if pieces.len() < 2 {
            not_split.push(path.clone());
            continue;
        }

        let last = pieces.len() - 1;
        for (i, piece) in pieces.into_iter().enumerate() {
            let length = piece.length_xy();
            let mut is_left = false;
            let mut is_right = false;
            let mut classify = |distance: f64| {
                if let Some(query) = piece.point_along(distance) {
                    if cut_line.is_point_left_of(&xy(&query)) {
                        is_left = true;
                    } else {
                        is_right = true;
                    }
                }
            };
            if i > 0 {
                classify(tolerance);
            }
            if i < last {
                classify(length - tolerance);
            }

            match (is_left, is_right) {
                (true, true) => groups.both.push(piece),
                (true, false) => groups.left.push(piece),
                (false, true) => groups.right.push(piece),
                (false, false) => {}
            }
        }
    }

    let mut result: Vec<Polyline> = [groups.left, groups.right, groups.both]
        .into_iter()
        .filter(|paths| !paths.is_empty())
        .map(|paths| Polyline::new(paths, polyline.z_aware))
        .collect();

    if let Some(largest) = result
        .iter_mut()
        .max_by(|a, b| a.length_xy().total_cmp(&b.length_xy()))
    {
        largest.paths.extend(not_split);
    }
    result
}
