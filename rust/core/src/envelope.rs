// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned XY extents
//!
//! Envelopes drive candidate filtering in the feature cutter and accumulate the
//! refresh area of a cut session.

use nalgebra::Point3;

/// XY bounding box in f64 precision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Envelope {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin: xmin.min(xmax),
            ymin: ymin.min(ymax),
            xmax: xmin.max(xmax),
            ymax: ymin.max(ymax),
        }
    }

    /// Create an envelope in the empty (inverted) state
    pub fn empty() -> Self {
        Self {
            xmin: f64::MAX,
            ymin: f64::MAX,
            xmax: f64::MIN,
            ymax: f64::MIN,
        }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut envelope = Self::empty();
        for point in points {
            envelope.include(point);
        }
        envelope
    }

    /// Check if no point has been added yet
    pub fn is_empty(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax
    }

    pub fn include(&mut self, point: &Point3<f64>) {
        if !point.x.is_finite() || !point.y.is_finite() {
            return;
        }
        self.xmin = self.xmin.min(point.x);
        self.ymin = self.ymin.min(point.y);
        self.xmax = self.xmax.max(point.x);
        self.ymax = self.ymax.max(point.y);
    }

    /// Grow this envelope to cover `other`
    pub fn union(&mut self, other: &Envelope) {
        if other.is_empty() {
            return;
        }
        self.xmin = self.xmin.min(other.xmin);
        self.ymin = self.ymin.min(other.ymin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymax = self.ymax.max(other.ymax);
    }

    pub fn expanded(&self, distance: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            xmin: self.xmin - distance,
            ymin: self.ymin - distance,
            xmax: self.xmax + distance,
            ymax: self.ymax + distance,
        }
    }

    /// Check whether the two envelopes overlap or are closer than `tolerance`
    pub fn intersects(&self, other: &Envelope, tolerance: f64) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.xmin <= other.xmax + tolerance
            && self.xmax >= other.xmin - tolerance
            && self.ymin <= other.ymax + tolerance
            && self.ymax >= other.ymin - tolerance
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.xmax - self.xmin
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.ymax - self.ymin
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_envelope_does_not_intersect() {
        let empty = Envelope::empty();
        let unit = Envelope::new(0.0, 0.0, 1.0, 1.0);
        assert!(empty.is_empty());
        assert!(!empty.intersects(&unit, 10.0));
    }

    #[test]
    fn test_union_and_tolerance() {
        let mut a = Envelope::new(0.0, 0.0, 1.0, 1.0);
        let b = Envelope::new(1.0005, 0.0, 2.0, 1.0);
        assert!(!a.intersects(&b, 0.0));
        assert!(a.intersects(&b, 0.001));

        a.union(&b);
        assert_eq!(a, Envelope::new(0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn test_nan_points_are_ignored() {
        let points = [
            Point3::new(1.0, 2.0, f64::NAN),
            Point3::new(f64::NAN, 5.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
        ];
        let envelope = Envelope::from_points(points.iter());
        assert_eq!(envelope, Envelope::new(1.0, 2.0, 3.0, 4.0));
    }
}
