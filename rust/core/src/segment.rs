// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-aware segment predicates in the XY plane

use nalgebra::{Point2, Point3};
use smallvec::SmallVec;

/// Project a 3D point onto the XY plane
#[inline]
pub fn xy(point: &Point3<f64>) -> Point2<f64> {
    Point2::new(point.x, point.y)
}

/// Z-component of the cross product (b - a) x (c - a)
#[inline]
pub fn cross2(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// One intersection between two segments
///
/// `t_a` and `t_b` are the normalized positions along the first and second
/// segment (0 at the start point, 1 at the end point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentIntersection {
    pub point: Point2<f64>,
    pub t_a: f64,
    pub t_b: f64,
}

/// Parameter and distance of the closest point of segment `a0 -> a1` to `p`
pub fn project_on_segment(p: &Point2<f64>, a0: &Point2<f64>, a1: &Point2<f64>) -> (f64, f64) {
    let d = a1 - a0;
    let len_sq = d.norm_squared();
    if len_sq <= f64::EPSILON {
        return (0.0, (p - a0).norm());
    }
    let t = ((p - a0).dot(&d) / len_sq).clamp(0.0, 1.0);
    let closest = a0 + d * t;
    (t, (p - closest).norm())
}

pub fn point_segment_distance(p: &Point2<f64>, a0: &Point2<f64>, a1: &Point2<f64>) -> f64 {
    project_on_segment(p, a0, a1).1
}

/// Intersect two segments in XY.
///
/// Endpoints lying within `tolerance` of the other segment are reported as
/// touch points, so collinear overlaps yield their two delimiting points.
/// A proper crossing is reported when no endpoint touches.
pub fn intersect_segments(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
    tolerance: f64,
) -> SmallVec<[SegmentIntersection; 2]> {
    let mut hits: SmallVec<[SegmentIntersection; 4]> = SmallVec::new();

    let (t, dist) = project_on_segment(b0, a0, a1);
    if dist <= tolerance {
        hits.push(SegmentIntersection {
            point: *b0,
            t_a: t,
            t_b: 0.0,
        });
    }
    let (t, dist) = project_on_segment(b1, a0, a1);
    if dist <= tolerance {
        hits.push(SegmentIntersection {
            point: *b1,
            t_a: t,
            t_b: 1.0,
        });
    }
    let (t, dist) = project_on_segment(a0, b0, b1);
    if dist <= tolerance {
        hits.push(SegmentIntersection {
            point: *a0,
            t_a: 0.0,
            t_b: t,
        });
    }
    let (t, dist) = project_on_segment(a1, b0, b1);
    if dist <= tolerance {
        hits.push(SegmentIntersection {
            point: *a1,
            t_a: 1.0,
            t_b: t,
        });
    }

    if hits.is_empty() {
        let r = a1 - a0;
        let s = b1 - b0;
        let denom = r.x * s.y - r.y * s.x;
        if denom.abs() > f64::EPSILON * r.norm() * s.norm() {
            let qp = b0 - a0;
            let t = (qp.x * s.y - qp.y * s.x) / denom;
            let u = (qp.x * r.y - qp.y * r.x) / denom;
            if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
                hits.push(SegmentIntersection {
                    point: a0 + r * t,
                    t_a: t,
                    t_b: u,
                });
            }
        }
    }

    let mut result: SmallVec<[SegmentIntersection; 2]> = SmallVec::new();
    for hit in hits {
        if result
            .iter()
            .all(|existing| (existing.point - hit.point).norm() > tolerance)
        {
            result.push(hit);
        }
    }
    result
}
