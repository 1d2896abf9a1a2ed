// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertical rings
//!
//! A vertical ring (a wall) has a degenerate XY footprint, so XY positions
//! along it are ambiguous. Operations on walls map the ring into a local
//! frame spanned by the horizontal wall direction and Z, work there, and map
//! the result back.

use cutlite_core::segment::{intersect_segments, xy};
use cutlite_core::{Path, Ring, Tolerance};
use nalgebra::{Point2, Point3, Vector2};

/// Local frame of a vertical ring: `u` runs along the horizontal direction
/// of the wall, `v` is Z and `w` the horizontal offset from the wall line.
///
/// Local points are stored as `(u, v, w)`.
pub(crate) struct WallFrame {
    pub origin: Point2<f64>,
    pub direction: Vector2<f64>,
    pub normal: Vector2<f64>,
    pub length: f64,
}

impl WallFrame {
    pub fn new(ring: &Ring) -> Option<Self> {
        let first = xy(ring.points.first()?);
        let a = ring
            .points
            .iter()
            .map(xy)
            .max_by(|p, q| (p - first).norm_squared().total_cmp(&(q - first).norm_squared()))?;
        let b = ring
            .points
            .iter()
            .map(xy)
            .max_by(|p, q| (p - a).norm_squared().total_cmp(&(q - a).norm_squared()))?;
        let length = (b - a).norm();
        if length <= f64::EPSILON {
            return None;
        }
        let direction = (b - a) / length;
        Some(Self {
            origin: a,
            direction,
            normal: Vector2::new(-direction.y, direction.x),
            length,
        })
    }

    pub fn to_local(&self, p: &Point3<f64>) -> Point3<f64> {
        let d = xy(p) - self.origin;
        Point3::new(d.dot(&self.direction), p.z, d.dot(&self.normal))
    }

    pub fn to_world(&self, p: &Point3<f64>) -> Point3<f64> {
        let w = if p.z.is_finite() { p.z } else { 0.0 };
        let position = self.origin + self.direction * p.x + self.normal * w;
        Point3::new(position.x, position.y, p.y)
    }

    pub fn ring_to_local(&self, ring: &Ring) -> Ring {
        Ring {
            points: ring.points.iter().map(|p| self.to_local(p)).collect(),
        }
    }

    pub fn ring_to_world(&self, ring: &Ring) -> Ring {
        Ring {
            points: ring.points.iter().map(|p| self.to_world(p)).collect(),
        }
    }

    pub fn end(&self) -> Point2<f64> {
        self.origin + self.direction * self.length
    }

    /// Position of an XY point along the wall line
    pub fn u_of(&self, p: &Point2<f64>) -> f64 {
        (p - self.origin).dot(&self.direction)
    }
}

/// Vertical sub-paths along which `reshape_path` can reshape a vertical ring.
///
/// Every XY crossing of the reshape path with the wall yields the vertical
/// line through it; its intersections with the ring are paired from the
/// bottom up. The paths run upwards and are ordered by the distance of their
/// crossing from the ring start. Empty if the ring is not vertical.
pub fn vertical_reshape_paths(ring: &Ring, reshape_path: &Path, tolerance: &Tolerance) -> Vec<Path> {
    if !ring.is_vertical(tolerance) {
        return Vec::new();
    }
    let Some(frame) = WallFrame::new(ring) else {
        return Vec::new();
    };
    let (zmin, zmax) = ring.z_range();

    let (a, b) = (frame.origin, frame.end());
    let mut crossings: Vec<Point2<f64>> = Vec::new();
    for (p0, p1) in reshape_path.segments() {
        for hit in intersect_segments(&xy(p0), &xy(p1), &a, &b, tolerance.xy) {
            if crossings
                .iter()
                .all(|c| (c - hit.point).norm() > tolerance.xy)
            {
                crossings.push(hit.point);
            }
        }
    }
    let start = xy(&ring.points[0]);
    crossings.sort_by(|p, q| (p - start).norm().total_cmp(&(q - start).norm()));

    let local = frame.ring_to_local(ring);
    let mut paths = Vec::new();
    for crossing in crossings {
        let u = frame.u_of(&crossing);
        let bottom = Point2::new(u, zmin - 1.0);
        let top = Point2::new(u, zmax + 1.0);

        let mut levels: Vec<f64> = Vec::new();
        for (r0, r1) in local.segments() {
            for hit in intersect_segments(&bottom, &top, &xy(r0), &xy(r1), tolerance.xy) {
                if levels.iter().all(|v| (v - hit.point.y).abs() > tolerance.z) {
                    levels.push(hit.point.y);
                }
            }
        }
        levels.sort_by(f64::total_cmp);

        for pair in levels.chunks_exact(2) {
            paths.push(Path::new(vec![
                frame.to_world(&Point3::new(u, pair[0], 0.0)),
                frame.to_world(&Point3::new(u, pair[1], 0.0)),
            ]));
        }
    }

    tracing::debug!(paths = paths.len(), "Vertical reshape paths");
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Ring {
        Ring::from_xyz(&[(0.0, 0.0, 500.0), (100.0, 0.0, 500.0), (50.0, 0.0, 1000.0)])
    }

    #[test]
    fn test_one_path_per_crossing() {
        let path = Path::from_xyz(&[
            (75.0, -100.0, 222.0),
            (75.0, 100.0, 222.0),
            (25.0, 100.0, 222.0),
            (25.0, -100.0, 222.0),
        ]);
        let paths = vertical_reshape_paths(&triangle(), &path, &Tolerance::default());
        assert_eq!(paths.len(), 2);

        let first = &paths[0].points;
        assert_relative_eq!(first[0].x, 25.0, epsilon = 1e-9);
        assert_relative_eq!(first[0].z, 500.0, epsilon = 1e-9);
        assert_relative_eq!(first[1].z, 750.0, epsilon = 1e-9);

        let second = &paths[1].points;
        assert_relative_eq!(second[0].x, 75.0, epsilon = 1e-9);
        assert_relative_eq!(second[1].z, 750.0, epsilon = 1e-9);
    }

    #[test]
    fn test_path_through_apex() {
        let path = Path::from_xy(&[(50.0, -100.0), (50.0, 100.0)]);
        let paths = vertical_reshape_paths(&triangle(), &path, &Tolerance::default());
        assert_eq!(paths.len(), 1);
        assert_relative_eq!(paths[0].points[0].z, 500.0, epsilon = 1e-9);
        assert_relative_eq!(paths[0].points[1].z, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_ring_has_no_vertical_paths() {
        let flat = Ring::from_xyz(&[(0.0, 0.0, 500.0), (100.0, 0.0, 500.0), (50.0, 50.0, 500.0)]);
        let path = Path::from_xy(&[(50.0, -100.0), (50.0, 100.0)]);
        assert!(vertical_reshape_paths(&flat, &path, &Tolerance::default()).is_empty());
    }
}
