// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed rings
//!
//! A [`Ring`] stores its vertices without the closing point; the segment from
//! the last back to the first vertex is implicit. Z values may be undefined
//! (`NaN`) on vertices created by an operation that could not derive a height.

use nalgebra::{Point2, Point3, Vector3};

use crate::envelope::Envelope;
use crate::plane::Plane3D;
use crate::segment::{point_segment_distance, xy};
use crate::tolerance::Tolerance;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring {
    pub points: Vec<Point3<f64>>,
}

impl Ring {
    /// Create a ring, dropping an explicit closing point if present
    pub fn new(mut points: Vec<Point3<f64>>) -> Self {
        if points.len() > 1 {
            let first = points[0];
            let last = points[points.len() - 1];
            let same_z = first.z == last.z || (first.z.is_nan() && last.z.is_nan());
            if first.x == last.x && first.y == last.y && same_z {
                points.pop();
            }
        }
        Self { points }
    }

    pub fn from_xy(coords: &[(f64, f64)]) -> Self {
        Self::new(
            coords
                .iter()
                .map(|&(x, y)| Point3::new(x, y, f64::NAN))
                .collect(),
        )
    }

    pub fn from_xyz(coords: &[(f64, f64, f64)]) -> Self {
        Self::new(
            coords
                .iter()
                .map(|&(x, y, z)| Point3::new(x, y, z))
                .collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point count including the closing point, as reported by GIS APIs
    pub fn closed_point_count(&self) -> usize {
        if self.points.is_empty() {
            0
        } else {
            self.points.len() + 1
        }
    }

    /// Iterate over the segments including the closing one
    pub fn segments(&self) -> impl Iterator<Item = (&Point3<f64>, &Point3<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (&self.points[i], &self.points[(i + 1) % n]))
    }

    /// Vertices as a closed sequence (first point repeated at the end)
    pub fn closed_points(&self) -> Vec<Point3<f64>> {
        let mut points = self.points.clone();
        if let Some(first) = self.points.first() {
            points.push(*first);
        }
        points
    }

    /// Shoelace area in XY, positive for counter-clockwise rings
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let p = &self.points[i];
            let q = &self.points[(i + 1) % n];
            area += p.x * q.y - q.x * p.y;
        }
        area * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    pub fn length_xy(&self) -> f64 {
        self.segments().map(|(a, b)| (xy(b) - xy(a)).norm()).sum()
    }

    /// 3D length; segments with an undefined Z contribute their XY length
    pub fn length_3d(&self) -> f64 {
        self.segments()
            .map(|(a, b)| {
                let dz = b.z - a.z;
                let d2 = (xy(b) - xy(a)).norm_squared();
                if dz.is_finite() {
                    (d2 + dz * dz).sqrt()
                } else {
                    d2.sqrt()
                }
            })
            .sum()
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn reversed(&self) -> Self {
        let mut ring = self.clone();
        ring.reverse();
        ring
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::from_points(self.points.iter())
    }

    /// Even-odd containment test in XY. Points on the boundary give an
    /// arbitrary but stable answer.
    pub fn contains_point_xy(&self, p: &Point2<f64>) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = &self.points[i];
            let pj = &self.points[j];
            if (pi.y > p.y) != (pj.y > p.y) {
                let x = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Smallest XY distance of `p` to the ring boundary
    pub fn distance_to_boundary(&self, p: &Point2<f64>) -> f64 {
        self.segments()
            .map(|(a, b)| point_segment_distance(p, &xy(a), &xy(b)))
            .fold(f64::INFINITY, f64::min)
    }

    /// A point strictly inside the ring, if the ring has an interior
    pub fn interior_point(&self) -> Option<Point2<f64>> {
        interior_point_of_rings(&[self])
    }

    /// Newell normal, not normalized. Undefined Z values are treated as 0.
    pub fn newell_normal(&self) -> Vector3<f64> {
        let z = |v: f64| if v.is_finite() { v } else { 0.0 };
        let mut normal = Vector3::zeros();
        for (curr, next) in self.segments() {
            let (cz, nz) = (z(curr.z), z(next.z));
            normal.x += (curr.y - next.y) * (cz + nz);
            normal.y += (cz - nz) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }
        normal
    }

    /// Area of the ring in its own plane
    pub fn area_3d(&self) -> f64 {
        self.newell_normal().norm() * 0.5
    }

    /// Check whether the ring stands vertically, i.e. its XY footprint
    /// collapses to a line while it extends in Z.
    pub fn is_vertical(&self, tolerance: &Tolerance) -> bool {
        if self.points.len() < 2 {
            return false;
        }

        // Cheap prefilter: a footprint with more area than a tolerance-wide
        // sliver of half the perimeter cannot be vertical.
        let area = self.signed_area().abs();
        let length = self.length_xy();
        if area > 1.5 * (tolerance.xy / 2.0) * (length / 2.0) {
            return false;
        }

        let (zmin, zmax) = self.z_range();
        if zmax - zmin <= tolerance.z {
            return false;
        }

        let first = xy(&self.points[0]);
        let a = self
            .points
            .iter()
            .map(xy)
            .max_by(|p, q| {
                (p - first)
                    .norm_squared()
                    .total_cmp(&(q - first).norm_squared())
            })
            .unwrap_or(first);
        let b = self
            .points
            .iter()
            .map(xy)
            .max_by(|p, q| (p - a).norm_squared().total_cmp(&(q - a).norm_squared()))
            .unwrap_or(a);

        if (b - a).norm() <= tolerance.xy {
            return true;
        }

        self.points
            .iter()
            .all(|p| point_segment_distance(&xy(p), &a, &b) <= tolerance.xy)
    }

    /// Minimum and maximum of the defined Z values, `(inf, -inf)` if none
    pub fn z_range(&self) -> (f64, f64) {
        self.points
            .iter()
            .filter(|p| p.z.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.z), hi.max(p.z))
            })
    }

    pub fn min_z(&self) -> Option<f64> {
        let (lo, _) = self.z_range();
        lo.is_finite().then_some(lo)
    }

    pub fn has_undefined_z(&self) -> bool {
        self.points.iter().any(|p| !p.z.is_finite())
    }

    pub fn drop_zs(&mut self) {
        for p in &mut self.points {
            p.z = f64::NAN;
        }
    }

    /// Fill undefined Z values by linear interpolation along the ring, using
    /// the XY distance to the nearest defined neighbours on either side.
    ///
    /// Returns `false` if the ring had no defined Z at all.
    pub fn interpolate_undefined_zs(&mut self) -> bool {
        let n = self.points.len();
        let defined: Vec<usize> = (0..n).filter(|&i| self.points[i].z.is_finite()).collect();
        if defined.is_empty() {
            return n == 0;
        }
        if defined.len() == n {
            return true;
        }

        for (k, &start) in defined.iter().enumerate() {
            let end = defined[(k + 1) % defined.len()];
            let gap = (end + n - start) % n;
            let gap = if gap == 0 { n } else { gap };
            if gap <= 1 {
                continue;
            }

            let mut distances = Vec::with_capacity(gap);
            let mut total = 0.0;
            for step in 0..gap {
                let a = &self.points[(start + step) % n];
                let b = &self.points[(start + step + 1) % n];
                total += (xy(b) - xy(a)).norm();
                distances.push(total);
            }

            let z0 = self.points[start].z;
            let z1 = self.points[end].z;
            for step in 1..gap {
                let ratio = if total > 0.0 {
                    distances[step - 1] / total
                } else {
                    0.5
                };
                self.points[(start + step) % n].z = z0 + (z1 - z0) * ratio;
            }
        }
        true
    }

    /// Take undefined Z values from a plane
    pub fn assign_undefined_zs(&mut self, plane: &Plane3D) {
        for p in &mut self.points {
            if !p.z.is_finite() {
                if let Some(z) = plane.z_at(p.x, p.y) {
                    p.z = z;
                }
            }
        }
    }

    /// Remove consecutive vertices that coincide in XY within `tolerance`
    pub fn remove_duplicate_points(&mut self, tolerance: f64) {
        let mut cleaned: Vec<Point3<f64>> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            match cleaned.last() {
                Some(last) if (xy(last) - xy(p)).norm() <= tolerance => {}
                _ => cleaned.push(*p),
            }
        }
        while cleaned.len() > 1 {
            let first = cleaned[0];
            let last = cleaned[cleaned.len() - 1];
            if (xy(&first) - xy(&last)).norm() <= tolerance {
                cleaned.pop();
            } else {
                break;
            }
        }
        self.points = cleaned;
    }
}

/// A point inside the area bounded by `rings` under the even-odd rule.
///
/// Scans the horizontal line through the middle of the widest gap between
/// vertex Y values and returns the midpoint of the widest inside span.
pub fn interior_point_of_rings(rings: &[&Ring]) -> Option<Point2<f64>> {
    let mut ys: Vec<f64> = rings
        .iter()
        .flat_map(|r| r.points.iter().map(|p| p.y))
        .filter(|y| y.is_finite())
        .collect();
    ys.sort_by(f64::total_cmp);
    ys.dedup();
    if ys.len() < 2 {
        return None;
    }

    let mut best_gap = 0.0;
    let mut scan_y = ys[0];
    for w in ys.windows(2) {
        let gap = w[1] - w[0];
        if gap > best_gap {
            best_gap = gap;
            scan_y = (w[0] + w[1]) * 0.5;
        }
    }

    let mut xs: Vec<f64> = Vec::new();
    for ring in rings {
        for (a, b) in ring.segments() {
            if (a.y > scan_y) != (b.y > scan_y) {
                xs.push(a.x + (scan_y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
    }
    xs.sort_by(f64::total_cmp);

    let mut best: Option<(f64, f64)> = None;
    for pair in xs.chunks_exact(2) {
        let width = pair[1] - pair[0];
        if width > 0.0 && best.map_or(true, |(w, _)| width > w) {
            best = Some((width, (pair[0] + pair[1]) * 0.5));
        }
    }
    best.map(|(_, x)| Point2::new(x, scan_y))
}
