// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Side selection of planar polygon reshapes.
//!
//! All cases reshape the square (100,100)-(200,200), either as a polygon of
//! its own or as an island hole of a 1000 x 1000 polygon.

use approx::assert_relative_eq;
use cutlite_core::{Geometry, Path, Polygon, Ring, RingGroup, Tolerance};
use cutlite_geometry::{ReshapeOperation, ReshapeSide, RingReshapeType, SideFilter};

fn square() -> Polygon {
    Polygon::from_ring(
        Ring::from_xy(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0), (100.0, 200.0)]),
        false,
    )
}

fn polygon_with_island_hole() -> Polygon {
    let outer = Ring::from_xy(&[(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0), (0.0, 1000.0)]);
    let hole = Ring::from_xy(&[(100.0, 100.0), (100.0, 200.0), (200.0, 200.0), (200.0, 100.0)]);
    Polygon::new(vec![RingGroup::with_interiors(outer, vec![hole])], false)
}

struct Reshaped {
    polygon: Polygon,
    side: ReshapeSide,
    reshape_type: RingReshapeType,
    messages: Vec<String>,
    is_warning: bool,
}

fn reshape(polygon: Polygon, coords: &[(f64, f64)], non_default: bool) -> Reshaped {
    let geometry = Geometry::Polygon(polygon);
    let mut operation = ReshapeOperation::new(&geometry, Path::from_xy(coords), Tolerance::default())
        .unwrap()
        .with_filter(SideFilter {
            use_non_default_side: non_default,
        });
    assert!(operation.reshape().unwrap(), "{:?}", operation.notifications());

    Reshaped {
        side: operation.side(),
        reshape_type: operation.reshape_type(),
        messages: operation.notifications().messages.clone(),
        is_warning: operation.notifications().is_warning,
        polygon: operation.into_geometry().as_polygon().unwrap().clone(),
    }
}

const NON_DEFAULT: &str = "non-default side";
const NOT_HONOURED: &str = "was not honoured";

#[test]
fn test_inside_only() {
    let path = [(175.0, 50.0), (175.0, 250.0)];

    let default = reshape(square(), &path, false);
    assert_eq!(default.reshape_type, RingReshapeType::InsideOnly);
    assert_eq!(default.side, ReshapeSide::Left);
    assert_relative_eq!(default.polygon.area(), 7500.0, epsilon = 1e-6);
    assert!(default.messages.is_empty());

    let other = reshape(square(), &path, true);
    assert_eq!(other.side, ReshapeSide::Right);
    assert_relative_eq!(other.polygon.area(), 2500.0, epsilon = 1e-6);
    assert!(other.messages.iter().any(|m| m.contains(NON_DEFAULT)));
    assert!(!other.is_warning);
}

#[test]
fn test_outside_only_keeps_default_side() {
    let path = [(150.0, 200.0), (150.0, 250.0), (200.0, 250.0), (200.0, 200.0)];

    let default = reshape(square(), &path, false);
    assert_eq!(default.reshape_type, RingReshapeType::OutsideOnly);
    assert_eq!(default.side, ReshapeSide::Right);
    assert_relative_eq!(default.polygon.area(), 12500.0, epsilon = 1e-6);

    let other = reshape(square(), &path, true);
    assert_eq!(other.side, ReshapeSide::Right);
    assert_relative_eq!(other.polygon.area(), 12500.0, epsilon = 1e-6);
    assert!(other.messages.iter().any(|m| m.contains(NOT_HONOURED)));
    assert!(other.is_warning);
}

#[test]
fn test_v_shaped_path() {
    let path = [(100.0, 200.0), (150.0, 100.0), (200.0, 200.0)];

    let default = reshape(square(), &path, false);
    assert_eq!(default.reshape_type, RingReshapeType::InsideOnlySeveralParts);
    assert_eq!(default.side, ReshapeSide::Left);
    assert_relative_eq!(default.polygon.area(), 5000.0, epsilon = 1e-6);
    assert_eq!(default.polygon.ring_count(), 1);
    assert_eq!(default.polygon.exterior_ring_count(), 1);

    // The other side touches the bottom edge in a single point
    let other = reshape(square(), &path, true);
    assert_eq!(other.side, ReshapeSide::Right);
    assert_relative_eq!(other.polygon.area(), 5000.0, epsilon = 1e-6);
    assert_eq!(other.polygon.ring_count(), 2);
}

#[test]
fn test_cut_back() {
    let path = [
        (125.0, 200.0),
        (125.0, 150.0),
        (175.0, 150.0),
        (175.0, 250.0),
        (150.0, 250.0),
        (150.0, 200.0),
    ];

    let default = reshape(square(), &path, false);
    assert_eq!(default.side, ReshapeSide::Left);
    assert_relative_eq!(default.polygon.area(), 3750.0, epsilon = 1e-6);

    let other = reshape(square(), &path, true);
    assert_relative_eq!(other.polygon.area(), 3750.0, epsilon = 1e-6);
}

#[test]
fn test_boundary_loop() {
    let path = [
        (125.0, 200.0),
        (125.0, 250.0),
        (175.0, 250.0),
        (175.0, 150.0),
        (150.0, 150.0),
        (150.0, 200.0),
    ];

    let default = reshape(square(), &path, false);
    assert_eq!(default.side, ReshapeSide::Right);
    assert_relative_eq!(default.polygon.area(), 11250.0, epsilon = 1e-6);

    let other = reshape(square(), &path, true);
    assert_eq!(other.side, ReshapeSide::Left);
    assert_relative_eq!(other.polygon.area(), 3750.0, epsilon = 1e-6);
}

#[test]
fn test_cut_off_island() {
    let path = [
        (200.0, 200.0),
        (200.0, 250.0),
        (125.0, 250.0),
        (125.0, 200.0),
        (150.0, 200.0),
        (150.0, 225.0),
        (175.0, 225.0),
        (175.0, 200.0),
    ];

    for non_default in [false, true] {
        let result = reshape(square(), &path, non_default);
        assert_eq!(result.side, ReshapeSide::Left);
        assert_relative_eq!(result.polygon.area(), 13125.0, epsilon = 1e-6);
        assert_eq!(result.polygon.ring_count(), 2);
        assert_eq!(result.polygon.exterior_ring_count(), 1);
    }
}

#[test]
fn test_v_shaped_path_on_island_hole() {
    let path = [(100.0, 200.0), (150.0, 100.0), (200.0, 200.0)];

    let default = reshape(polygon_with_island_hole(), &path, false);
    assert_eq!(default.side, ReshapeSide::Right);
    assert_relative_eq!(default.polygon.area(), 1_000_000.0 - 5000.0, epsilon = 1e-3);

    let other = reshape(polygon_with_island_hole(), &path, true);
    assert_eq!(other.side, ReshapeSide::Left);
    assert_relative_eq!(other.polygon.area(), 1_000_000.0 - 5000.0, epsilon = 1e-3);
}

#[test]
fn test_cut_off_island_on_island_hole() {
    let path = [
        (200.0, 200.0),
        (200.0, 250.0),
        (125.0, 250.0),
        (125.0, 200.0),
        (150.0, 200.0),
        (150.0, 225.0),
        (175.0, 225.0),
        (175.0, 200.0),
    ];

    for non_default in [false, true] {
        let result = reshape(polygon_with_island_hole(), &path, non_default);
        assert_eq!(result.side, ReshapeSide::Right);
        assert_relative_eq!(result.polygon.area(), 1_000_000.0 - 13125.0, epsilon = 1e-3);
        assert_eq!(result.polygon.ring_count(), 3);
        assert_eq!(result.polygon.exterior_ring_count(), 2);
    }
}

#[test]
fn test_path_crossing_two_parts_is_ambiguous() {
    let mut polygon = square();
    polygon.merge(Polygon::from_ring(
        Ring::from_xy(&[(300.0, 100.0), (400.0, 100.0), (400.0, 200.0), (300.0, 200.0)]),
        false,
    ));
    let geometry = Geometry::Polygon(polygon);
    let path = Path::from_xy(&[(50.0, 150.0), (450.0, 150.0)]);
    let mut operation = ReshapeOperation::new(&geometry, path, Tolerance::default()).unwrap();

    assert!(!operation.reshape().unwrap());
    assert!(operation
        .notifications()
        .contains("Reshape line intersects 2 parts of the feature to reshape"));
    assert!(!operation.is_changed());
}

#[test]
fn test_path_missing_the_polygon() {
    let geometry = Geometry::Polygon(square());
    let path = Path::from_xy(&[(300.0, 0.0), (300.0, 300.0)]);
    let mut operation = ReshapeOperation::new(&geometry, path, Tolerance::default()).unwrap();

    assert!(!operation.reshape().unwrap());
    assert!(operation.notifications().contains("Not enough intersection points"));
    assert!(!operation.is_changed());
}
