// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reshaping vertical multipatch rings (walls) in their own plane.

use approx::assert_relative_eq;
use cutlite_core::{Geometry, Multipatch, Patch, PatchKind, Path, Point3, Ring, Tolerance};
use cutlite_geometry::{ReshapeOperation, ReshapeSide};

/// Single ring multipatch in the plane y = 0 from (x, z) coordinates
fn wall(coords: &[(f64, f64)]) -> Geometry {
    let mut points: Vec<Point3<f64>> = coords.iter().map(|&(x, z)| Point3::new(x, 0.0, z)).collect();
    points.push(points[0]);
    Geometry::Multipatch(Multipatch::new(vec![Patch::new(PatchKind::Ring, points)]))
}

fn triangle() -> Geometry {
    wall(&[(0.0, 500.0), (100.0, 500.0), (50.0, 1000.0)])
}

fn ring_of(geometry: &Geometry) -> Ring {
    Ring::new(geometry.as_multipatch().unwrap().patches[0].points.clone())
}

fn assert_xz(ring: &Ring, expected: &[(f64, f64)]) {
    assert_eq!(ring.len(), expected.len(), "{:?}", ring.points);
    for (p, &(x, z)) in ring.points.iter().zip(expected) {
        assert_relative_eq!(p.x, x, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, z, epsilon = 1e-6);
    }
}

fn diagonal() -> f64 {
    (50.0f64.powi(2) + 500.0f64.powi(2)).sqrt()
}

#[test]
fn test_reshape_square_wall() {
    let geometry = wall(&[(0.0, 500.0), (100.0, 500.0), (100.0, 1000.0), (0.0, 1000.0)]);
    let path = Path::from_xyz(&[(51.0, -100.0, 222.0), (51.0, 100.0, 222.0)]);

    let mut operation = ReshapeOperation::new(&geometry, path, Tolerance::default()).unwrap();
    let (is_vertical, paths) = operation.is_vertical_ring_reshape(0);
    assert!(is_vertical);
    assert_eq!(paths.len(), 1);

    assert!(operation.reshape().unwrap());
    assert_eq!(operation.side(), ReshapeSide::Left);

    let ring = ring_of(&operation.into_geometry());
    assert_eq!(ring.closed_point_count(), 5);
    assert_xz(&ring, &[(0.0, 500.0), (51.0, 500.0), (51.0, 1000.0), (0.0, 1000.0)]);
    assert_relative_eq!(ring.length_3d(), 2.0 * 500.0 + 2.0 * 51.0, epsilon = 1e-6);
}

#[test]
fn test_reshape_triangle_twice() {
    let path = Path::from_xy(&[(75.0, -100.0), (75.0, 100.0)]);
    let mut operation = ReshapeOperation::new(&triangle(), path, Tolerance::default()).unwrap();
    assert!(operation.reshape().unwrap());

    let reshaped = operation.into_geometry();
    let ring = ring_of(&reshaped);
    assert_xz(&ring, &[(0.0, 500.0), (75.0, 500.0), (75.0, 750.0), (50.0, 1000.0)]);
    assert_relative_eq!(
        ring.length_3d(),
        1.5 * diagonal() + 75.0 + 250.0,
        epsilon = 1e-6
    );

    // Cutting through the apex, keeping the right side
    let path = Path::from_xy(&[(50.0, -100.0), (50.0, 100.0)]);
    let mut operation = ReshapeOperation::new(&reshaped, path, Tolerance::default())
        .unwrap()
        .with_side(ReshapeSide::Right);
    assert!(operation.reshape().unwrap());

    let ring = ring_of(&operation.into_geometry());
    assert_xz(&ring, &[(50.0, 500.0), (75.0, 500.0), (75.0, 750.0), (50.0, 1000.0)]);
    assert_relative_eq!(
        ring.length_3d(),
        0.5 * diagonal() + 25.0 + 500.0 + 250.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_multi_crossing_reshape_with_opposite_sides() {
    let path = Path::from_xyz(&[
        (75.0, -100.0, 0.0),
        (75.0, 100.0, 0.0),
        (25.0, 100.0, 0.0),
        (25.0, -100.0, 0.0),
    ]);
    let operation = ReshapeOperation::new(&triangle(), path, Tolerance::default()).unwrap();
    let (is_vertical, paths) = operation.is_vertical_ring_reshape(0);
    assert!(is_vertical);
    assert_eq!(paths.len(), 2);
    assert_relative_eq!(paths[0].points[0].x, 25.0, epsilon = 1e-6);

    let mut first = ReshapeOperation::new(&triangle(), paths[0].clone(), Tolerance::default())
        .unwrap()
        .with_side(ReshapeSide::Right);
    assert!(first.reshape().unwrap());

    let mut second =
        ReshapeOperation::new(&first.into_geometry(), paths[1].clone(), Tolerance::default())
            .unwrap()
            .with_side(ReshapeSide::Left);
    assert!(second.reshape().unwrap());

    let result = second.into_geometry();
    let patch = &result.as_multipatch().unwrap().patches[0];
    assert_eq!(patch.points.len(), 6);
    assert_eq!(patch.points.first(), patch.points.last());

    let ring = ring_of(&result);
    assert_xz(
        &ring,
        &[(25.0, 500.0), (75.0, 500.0), (75.0, 750.0), (50.0, 1000.0), (25.0, 750.0)],
    );
    assert_relative_eq!(ring.length_3d(), diagonal() + 50.0 + 500.0, epsilon = 1e-6);
}

#[test]
fn test_flat_ring_is_no_vertical_reshape() {
    let flat = Geometry::Multipatch(Multipatch::new(vec![Patch::new(
        PatchKind::Ring,
        vec![
            Point3::new(0.0, 0.0, 500.0),
            Point3::new(100.0, 0.0, 500.0),
            Point3::new(50.0, 50.0, 500.0),
            Point3::new(0.0, 0.0, 500.0),
        ],
    )]));
    let path = Path::from_xy(&[(50.0, -100.0), (50.0, 100.0)]);
    let operation = ReshapeOperation::new(&flat, path, Tolerance::default()).unwrap();

    let (is_vertical, paths) = operation.is_vertical_ring_reshape(0);
    assert!(!is_vertical);
    assert!(paths.is_empty());
}

#[test]
fn test_reshape_all_walls_of_a_multipatch() {
    let wall_at = |y: f64| {
        let points = [(0.0, 0.0), (100.0, 0.0), (100.0, 50.0), (0.0, 50.0), (0.0, 0.0)]
            .iter()
            .map(|&(x, z)| Point3::new(x, y, z))
            .collect();
        Patch::new(PatchKind::Ring, points)
    };
    let geometry = Geometry::Multipatch(Multipatch::new(vec![wall_at(0.0), wall_at(10.0)]));
    let path = Path::from_xy(&[(51.0, -100.0), (51.0, 100.0)]);
    let mut operation = ReshapeOperation::new(&geometry, path, Tolerance::default()).unwrap();

    assert!(operation.reshape_all_rings().unwrap());
    let result = operation.into_geometry();
    for patch in &result.as_multipatch().unwrap().patches {
        let ring = Ring::new(patch.points.clone());
        assert_relative_eq!(ring.area_3d(), 51.0 * 50.0, epsilon = 1e-6);
        assert!(ring.points.iter().all(|p| p.x <= 51.0 + 1e-9));
    }
}
