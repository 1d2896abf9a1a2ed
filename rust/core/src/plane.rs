// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planes fitted through rings

use nalgebra::{Point3, Vector3};

use crate::ring::Ring;

/// Plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3D {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane3D {
    /// Create a plane; returns `None` for a zero normal
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let length = normal.norm();
        if !length.is_finite() || length < 1e-12 {
            return None;
        }
        Some(Self {
            point,
            normal: normal / length,
        })
    }

    /// Fit a plane through the vertices of a ring: Newell normal through the
    /// centroid of the vertices with a defined Z.
    pub fn fit(ring: &Ring) -> Option<Self> {
        let defined: Vec<&Point3<f64>> = ring.points.iter().filter(|p| p.z.is_finite()).collect();
        if defined.len() < 3 {
            return None;
        }
        let mut sum = Vector3::zeros();
        for p in &defined {
            sum += p.coords;
        }
        let centroid = Point3::from(sum / defined.len() as f64);
        Self::new(centroid, ring.newell_normal())
    }

    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.point).dot(&self.normal)
    }

    /// Z of the plane above `(x, y)`; `None` for vertical planes
    pub fn z_at(&self, x: f64, y: f64) -> Option<f64> {
        if self.normal.z.abs() < 1e-9 {
            return None;
        }
        Some(
            self.point.z
                - (self.normal.x * (x - self.point.x) + self.normal.y * (y - self.point.y))
                    / self.normal.z,
        )
    }

    pub fn is_vertical(&self) -> bool {
        self.normal.z.abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_sloped_plane() {
        // z = x / 10
        let ring = Ring::from_xyz(&[
            (0.0, 0.0, 0.0),
            (100.0, 0.0, 10.0),
            (100.0, 100.0, 10.0),
            (0.0, 100.0, 0.0),
        ]);
        let plane = Plane3D::fit(&ring).unwrap();
        assert_relative_eq!(plane.z_at(50.0, 30.0).unwrap(), 5.0, epsilon = 1e-9);
        assert!(plane.signed_distance(&Point3::new(20.0, 70.0, 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_plane_has_no_z() {
        let wall = Ring::from_xyz(&[
            (0.0, 0.0, 0.0),
            (10.0, 0.0, 0.0),
            (10.0, 0.0, 10.0),
            (0.0, 0.0, 10.0),
        ]);
        let plane = Plane3D::fit(&wall).unwrap();
        assert!(plane.is_vertical());
        assert!(plane.z_at(5.0, 0.0).is_none());
    }
}
