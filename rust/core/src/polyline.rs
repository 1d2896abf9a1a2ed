// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polylines: cut lines and line features

use nalgebra::{Point2, Point3};

use crate::envelope::Envelope;
use crate::segment::{cross2, project_on_segment, xy};

/// An open sequence of vertices
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub points: Vec<Point3<f64>>,
}

impl Path {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
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

    pub fn segments(&self) -> impl Iterator<Item = (&Point3<f64>, &Point3<f64>)> + '_ {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn length_xy(&self) -> f64 {
        self.segments().map(|(a, b)| (xy(b) - xy(a)).norm()).sum()
    }

    pub fn start(&self) -> Option<&Point3<f64>> {
        self.points.first()
    }

    pub fn end(&self) -> Option<&Point3<f64>> {
        self.points.last()
    }

    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) if self.points.len() > 2 => (xy(s) - xy(e)).norm() <= tolerance,
            _ => false,
        }
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn reversed(&self) -> Self {
        let mut path = self.clone();
        path.reverse();
        path
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::from_points(self.points.iter())
    }

    pub fn min_z(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.z)
            .filter(|z| z.is_finite())
            .min_by(f64::total_cmp)
    }

    /// Point at XY `distance` from the start, clamped to the path ends.
    /// Z is interpolated along the segment.
    pub fn point_along(&self, distance: f64) -> Option<Point3<f64>> {
        let (index, t) = self.locate(distance)?;
        if index + 1 >= self.points.len() {
            return self.points.last().copied();
        }
        let a = &self.points[index];
        let b = &self.points[index + 1];
        Some(a + (b - a) * t)
    }

    /// Split the path at XY `distance` from its start
    pub fn split_at_distance(&self, distance: f64) -> Option<(Path, Path)> {
        let split_point = self.point_along(distance)?;
        let (index, t) = self.locate(distance)?;

        let mut head: Vec<Point3<f64>> = self.points[..=index].to_vec();
        let mut tail: Vec<Point3<f64>> = Vec::new();
        if t > 0.0 && index + 1 < self.points.len() {
            head.push(split_point);
            tail.push(split_point);
        } else {
            tail.push(self.points[index]);
        }
        tail.extend_from_slice(&self.points[(index + 1).min(self.points.len())..]);
        Some((Path::new(head), Path::new(tail)))
    }

    /// Segment index and segment parameter at XY `distance`
    fn locate(&self, distance: f64) -> Option<(usize, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let mut remaining = distance.max(0.0);
        for (i, (a, b)) in self.segments().enumerate() {
            let length = (xy(b) - xy(a)).norm();
            if remaining < length {
                let t = if length > 0.0 { remaining / length } else { 0.0 };
                return Some((i, t));
            }
            remaining -= length;
        }
        Some((self.points.len() - 1, 0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub paths: Vec<Path>,
    pub z_aware: bool,
}

impl Polyline {
    pub fn new(paths: Vec<Path>, z_aware: bool) -> Self {
        Self { paths, z_aware }
    }

    pub fn single(path: Path) -> Self {
        let z_aware = path.points.iter().all(|p| p.z.is_finite()) && !path.points.is_empty();
        Self::new(vec![path], z_aware)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.points.len() < 2)
    }

    pub fn length_xy(&self) -> f64 {
        self.paths.iter().map(Path::length_xy).sum()
    }

    pub fn envelope(&self) -> Envelope {
        let mut envelope = Envelope::empty();
        for path in &self.paths {
            envelope.union(&path.envelope());
        }
        envelope
    }

    pub fn min_z(&self) -> Option<f64> {
        self.paths
            .iter()
            .filter_map(Path::min_z)
            .min_by(f64::total_cmp)
    }

    pub fn has_undefined_z(&self) -> bool {
        self.paths
            .iter()
            .flat_map(|p| p.points.iter())
            .any(|p| !p.z.is_finite())
    }

    /// Whether `point` lies to the left of the nearest segment of the line.
    ///
    /// At a shared vertex the segment the point projects onto most centrally
    /// wins, so points around a bend are classified consistently.
    pub fn is_point_left_of(&self, point: &Point2<f64>) -> bool {
        let mut best: Option<(f64, f64, f64)> = None;
        for path in &self.paths {
            for (a, b) in path.segments() {
                let (a, b) = (xy(a), xy(b));
                let (t, distance) = project_on_segment(point, &a, &b);
                let side = cross2(&a, &b, point);
                let centrality = (t - 0.5).abs();
                let better = match best {
                    None => true,
                    Some((d, c, _)) => {
                        distance < d - 1e-12 || (distance <= d + 1e-12 && centrality < c)
                    }
                };
                if better {
                    best = Some((distance, centrality, side));
                }
            }
        }
        best.map_or(false, |(_, _, side)| side > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_of_bent_line() {
        let line = Polyline::single(Path::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
        assert!(line.is_point_left_of(&Point2::new(5.0, 1.0)));
        assert!(!line.is_point_left_of(&Point2::new(5.0, -1.0)));
        assert!(line.is_point_left_of(&Point2::new(9.0, 5.0)));
        assert!(!line.is_point_left_of(&Point2::new(11.0, 5.0)));
    }

    #[test]
    fn test_length_and_closed() {
        let path = Path::from_xy(&[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0), (0.0, 0.0)]);
        assert!((path.length_xy() - 12.0).abs() < 1e-12);
        assert!(path.is_closed(0.001));
    }

    #[test]
    fn test_split_at_distance() {
        let path = Path::from_xyz(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0), (10.0, 10.0, 10.0)]);
        let p = path.point_along(5.0).unwrap();
        assert!((p.x - 5.0).abs() < 1e-12 && (p.z - 5.0).abs() < 1e-12);

        let (head, tail) = path.split_at_distance(15.0).unwrap();
        assert_eq!(head.points.len(), 3);
        assert_eq!(tail.points.len(), 2);
        assert!((head.length_xy() - 15.0).abs() < 1e-12);
        assert!((tail.length_xy() - 5.0).abs() < 1e-12);
    }
}
