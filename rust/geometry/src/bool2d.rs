// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Footprints and Relational Tests
//!
//! This module wraps the i_overlay crate for the area based operations of the
//! cut engine: multipatch footprints, interior-intersection and containment
//! tests between cut results and reshape candidates.
//!
//! Z values do not survive these operations; result vertices carry `NaN` Z.

use cutlite_core::{Polygon, Ring, RingGroup};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point3;

/// Minimum area threshold - shapes smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

type Contour = Vec<[f64; 2]>;
type Shapes = Vec<Vec<Contour>>;

pub fn ring_to_contour(ring: &Ring) -> Contour {
    ring.points.iter().map(|p| [p.x, p.y]).collect()
}

pub fn group_to_contours(group: &RingGroup) -> Vec<Contour> {
    group
        .rings()
        .filter(|r| r.len() >= 3)
        .map(ring_to_contour)
        .collect()
}

pub fn polygon_to_contours(polygon: &Polygon) -> Vec<Contour> {
    polygon.groups.iter().flat_map(group_to_contours).collect()
}

fn contour_area(contour: &Contour) -> f64 {
    let n = contour.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i][0] * contour[j][1] - contour[j][0] * contour[i][1];
    }
    (area * 0.5).abs()
}

/// Total area of overlay shapes: outer contour minus holes
pub fn shapes_area(shapes: &Shapes) -> f64 {
    shapes
        .iter()
        .map(|shape| {
            let mut contours = shape.iter();
            let outer = contours.next().map(contour_area).unwrap_or(0.0);
            outer - contours.map(contour_area).sum::<f64>()
        })
        .sum()
}

/// Convert overlay shapes back to a polygon (first contour of each shape is
/// the exterior)
pub fn shapes_to_polygon(shapes: &Shapes) -> Polygon {
    let to_ring = |contour: &Contour| {
        Ring::new(
            contour
                .iter()
                .map(|p| Point3::new(p[0], p[1], f64::NAN))
                .collect(),
        )
    };

    let mut groups = Vec::new();
    for shape in shapes {
        let mut contours = shape.iter();
        let Some(outer) = contours.next() else { continue };
        if contour_area(outer) < MIN_AREA_THRESHOLD {
            continue;
        }
        let holes = contours
            .filter(|c| contour_area(c) >= MIN_AREA_THRESHOLD)
            .map(to_ring)
            .collect();
        groups.push(RingGroup::with_interiors(to_ring(outer), holes));
    }

    let mut polygon = Polygon::new(groups, false);
    polygon.normalize_orientation();
    polygon
}

/// Union of the XY projections of ring groups.
///
/// Groups must be oriented with counter-clockwise exteriors; overlapping
/// groups are merged under the non-zero rule.
pub fn union_groups(groups: &[RingGroup]) -> Polygon {
    let subject: Vec<Contour> = groups.iter().flat_map(group_to_contours).collect();
    if subject.is_empty() {
        return Polygon::default();
    }
    let shapes = subject.overlay(&Vec::<Contour>::new(), OverlayRule::Union, FillRule::NonZero);
    shapes_to_polygon(&shapes)
}

pub fn intersection_area(a: &Polygon, b: &Polygon) -> f64 {
    let subject = polygon_to_contours(a);
    let clip = polygon_to_contours(b);
    if subject.is_empty() || clip.is_empty() {
        return 0.0;
    }
    let shapes = subject.overlay(&clip, OverlayRule::Intersect, FillRule::EvenOdd);
    shapes_area(&shapes)
}

/// Area of `a` not covered by `b`
pub fn difference_area(a: &Polygon, b: &Polygon) -> f64 {
    let subject = polygon_to_contours(a);
    if subject.is_empty() {
        return 0.0;
    }
    let clip = polygon_to_contours(b);
    if clip.is_empty() {
        return a.area();
    }
    let shapes = subject.overlay(&clip, OverlayRule::Difference, FillRule::EvenOdd);
    shapes_area(&shapes)
}

/// Area below which a relational overlap is attributed to tolerance noise:
/// a band of width `tolerance` along half the shorter boundary.
fn noise_area(a: &Polygon, b: &Polygon, tolerance: f64) -> f64 {
    let length = a.length_xy().min(b.length_xy());
    (tolerance * length * 0.5).max(MIN_AREA_THRESHOLD)
}

/// Whether the interiors of the two polygons overlap
pub fn interior_intersects(a: &Polygon, b: &Polygon, tolerance: f64) -> bool {
    if !a.envelope().intersects(&b.envelope(), tolerance) {
        return false;
    }
    intersection_area(a, b) > noise_area(a, b, tolerance)
}

/// Whether `container` covers `contained` within tolerance
pub fn contains(container: &Polygon, contained: &Polygon, tolerance: f64) -> bool {
    if contained.is_empty() {
        return false;
    }
    difference_area(contained, container) <= noise_area(container, contained, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON_2D: f64 = 1e-9;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::from_ring(
            Ring::from_xy(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)]),
            false,
        )
    }

    #[test]
    fn test_union_of_overlapping_groups() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 0.0, 15.0, 10.0);
        let groups: Vec<RingGroup> = a.groups.into_iter().chain(b.groups).collect();
        let union = union_groups(&groups);
        assert_eq!(union.exterior_ring_count(), 1);
        assert!((union.area() - 150.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_stacked_groups_do_not_cancel() {
        // Roof above floor: identical footprints must not cancel out
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(0.0, 0.0, 10.0, 10.0);
        let groups: Vec<RingGroup> = a.groups.into_iter().chain(b.groups).collect();
        let union = union_groups(&groups);
        assert!((union.area() - 100.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_adjacent_polygons_do_not_interior_intersect() {
        let left = rect(0.0, 0.0, 10.0, 10.0);
        let right = rect(10.0, 0.0, 20.0, 10.0);
        assert!(!interior_intersects(&left, &right, 0.001));
        assert!(interior_intersects(&left, &rect(5.0, 5.0, 15.0, 15.0), 0.001));
    }

    #[test]
    fn test_contains() {
        let outer = rect(0.0, 0.0, 10.0, 10.0);
        assert!(contains(&outer, &rect(2.0, 2.0, 8.0, 8.0), 0.001));
        assert!(contains(&outer, &outer, 0.001));
        assert!(!contains(&rect(2.0, 2.0, 8.0, 8.0), &outer, 0.001));
    }
}
