// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trimming cut lines to the stretch that separates the results

use cutlite_core::{Geometry, Path, Polyline, Ring};

use crate::crossings::{path_ring_crossings, path_runs_along_ring, touches_ring};

fn boundary_rings(geometry: &Geometry) -> Vec<Ring> {
    match geometry {
        Geometry::Polygon(polygon) => polygon.rings().cloned().collect(),
        Geometry::Multipatch(multipatch) => multipatch
            .ring_groups()
            .map(|groups| groups.iter().flat_map(|g| g.rings().cloned()).collect())
            .unwrap_or_default(),
        Geometry::Polyline(_) | Geometry::Multipoint(_) => Vec::new(),
    }
}

/// The parts of `cut_line` that were applied to produce `results`.
///
/// Each path is trimmed to its first and last intersection with the result
/// boundaries that touches at least two results. A trimmed path is kept if
/// it runs along the boundaries of at least two results.
pub fn trimmed_cut_lines(cut_line: &Polyline, results: &[Geometry], tolerance: f64) -> Vec<Path> {
    let outlines: Vec<Vec<Ring>> = results.iter().map(boundary_rings).collect();
    if outlines.iter().filter(|rings| !rings.is_empty()).count() < 2 {
        return Vec::new();
    }

    let mut trimmed = Vec::new();
    for path in &cut_line.paths {
        let mut distances: Vec<f64> = Vec::new();
        for rings in &outlines {
            for ring in rings {
                for crossing in path_ring_crossings(path, ring, tolerance) {
                    let touched = outlines
                        .iter()
                        .filter(|other| other.iter().any(|r| touches_ring(&crossing.point, r, tolerance)))
                        .count();
                    if touched >= 2 {
                        distances.push(crossing.path_distance);
                    }
                }
            }
        }

        let (Some(&first), Some(&last)) = (
            distances.iter().min_by(|a, b| a.total_cmp(b)),
            distances.iter().max_by(|a, b| a.total_cmp(b)),
        ) else {
            continue;
        };
        if last - first <= tolerance {
            continue;
        }
        let Some((head, _)) = path.split_at_distance(last) else {
            continue;
        };
        let Some((_, piece)) = head.split_at_distance(first) else {
            continue;
        };

        let along = outlines
            .iter()
            .filter(|rings| rings.iter().any(|r| path_runs_along_ring(&piece, r, tolerance)))
            .count();
        if along >= 2 {
            trimmed.push(piece);
        }
    }

    tracing::debug!(
        paths = cut_line.paths.len(),
        trimmed = trimmed.len(),
        "Trimmed cut lines"
    );
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cutlite_core::Polygon;

    fn rect(x0: f64, x1: f64) -> Geometry {
        Geometry::Polygon(Polygon::from_ring(
            Ring::from_xy(&[(x0, 100.0), (x1, 100.0), (x1, 200.0), (x0, 200.0)]),
            false,
        ))
    }

    #[test]
    fn test_trim_to_shared_boundary() {
        let cut_line = Polyline::single(Path::from_xy(&[(175.0, 0.0), (175.0, 300.0), (400.0, 300.0)]));
        let results = [rect(100.0, 175.0), rect(175.0, 200.0)];

        let trimmed = trimmed_cut_lines(&cut_line, &results, 0.001);
        assert_eq!(trimmed.len(), 1);
        let points = &trimmed[0].points;
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].y, 100.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].y, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unapplied_path_is_dropped() {
        let cut_line = Polyline::new(
            vec![
                Path::from_xy(&[(175.0, 0.0), (175.0, 300.0)]),
                Path::from_xy(&[(150.0, 0.0), (150.0, 300.0)]),
            ],
            false,
        );
        let results = [rect(100.0, 175.0), rect(175.0, 200.0)];

        let trimmed = trimmed_cut_lines(&cut_line, &results, 0.001);
        assert_eq!(trimmed.len(), 1);
        assert_relative_eq!(trimmed[0].points[0].x, 175.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_result_has_no_cut_line() {
        let cut_line = Polyline::single(Path::from_xy(&[(175.0, 0.0), (175.0, 300.0)]));
        assert!(trimmed_cut_lines(&cut_line, &[rect(100.0, 200.0)], 0.001).is_empty());
    }
}
