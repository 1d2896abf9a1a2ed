// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygons as lists of ring groups
//!
//! A [`RingGroup`] is one exterior ring with the interior rings (holes) it
//! contains. A [`Polygon`] is the ordered list of its ring groups. Exterior
//! rings are kept counter-clockwise and holes clockwise after
//! [`Polygon::normalize_orientation`].

use nalgebra::Point2;

use crate::envelope::Envelope;
use crate::plane::Plane3D;
use crate::ring::{interior_point_of_rings, Ring};
use crate::tolerance::Tolerance;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RingGroup {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
    /// Point id shared by all vertices of the group (multipatch parts)
    pub id: Option<i32>,
}

impl RingGroup {
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
            id: None,
        }
    }

    pub fn with_interiors(exterior: Ring, interiors: Vec<Ring>) -> Self {
        Self {
            exterior,
            interiors,
            id: None,
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    pub fn rings_mut(&mut self) -> impl Iterator<Item = &mut Ring> {
        std::iter::once(&mut self.exterior).chain(self.interiors.iter_mut())
    }

    pub fn ring_count(&self) -> usize {
        1 + self.interiors.len()
    }

    /// Area of the exterior minus the holes in XY
    pub fn area(&self) -> f64 {
        self.exterior.area() - self.interiors.iter().map(Ring::area).sum::<f64>()
    }

    pub fn area_3d(&self) -> f64 {
        self.exterior.area_3d() - self.interiors.iter().map(Ring::area_3d).sum::<f64>()
    }

    pub fn envelope(&self) -> Envelope {
        self.exterior.envelope()
    }

    pub fn point_count(&self) -> usize {
        self.rings().map(Ring::closed_point_count).sum()
    }

    pub fn is_vertical(&self, tolerance: &Tolerance) -> bool {
        self.exterior.is_vertical(tolerance)
    }

    /// An exterior that runs clockwise marks an inverted (downward facing) group
    pub fn is_inverted(&self) -> bool {
        self.exterior.is_clockwise()
    }

    pub fn reverse(&mut self) {
        for ring in self.rings_mut() {
            ring.reverse();
        }
    }

    pub fn contains_point_xy(&self, p: &Point2<f64>) -> bool {
        self.exterior.contains_point_xy(p) && !self.interiors.iter().any(|h| h.contains_point_xy(p))
    }

    pub fn interior_point(&self) -> Option<Point2<f64>> {
        let rings: Vec<&Ring> = self.rings().collect();
        interior_point_of_rings(&rings)
    }

    pub fn plane(&self) -> Option<Plane3D> {
        Plane3D::fit(&self.exterior)
    }

    pub fn min_z(&self) -> Option<f64> {
        self.rings()
            .filter_map(Ring::min_z)
            .min_by(f64::total_cmp)
    }

    pub fn has_undefined_z(&self) -> bool {
        self.rings().any(Ring::has_undefined_z)
    }

    pub fn interpolate_undefined_zs(&mut self) -> bool {
        let mut all = true;
        for ring in self.rings_mut() {
            all &= ring.interpolate_undefined_zs();
        }
        all
    }

    pub fn assign_undefined_zs(&mut self, plane: &Plane3D) {
        for ring in self.rings_mut() {
            ring.assign_undefined_zs(plane);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub groups: Vec<RingGroup>,
    pub z_aware: bool,
    pub m_aware: bool,
}

impl Polygon {
    pub fn new(groups: Vec<RingGroup>, z_aware: bool) -> Self {
        Self {
            groups,
            z_aware,
            m_aware: false,
        }
    }

    pub fn from_ring(ring: Ring, z_aware: bool) -> Self {
        Self::new(vec![RingGroup::new(ring)], z_aware)
    }

    /// Build a polygon from unordered rings, classifying each ring as an
    /// exterior or a hole by its nesting depth.
    ///
    /// A ring is nested in every larger ring that contains its interior
    /// point. Rings at even depth become exteriors; a ring at odd depth is a
    /// hole of its smallest container.
    pub fn from_rings(rings: Vec<Ring>, z_aware: bool) -> Self {
        let areas: Vec<f64> = rings.iter().map(Ring::area).collect();
        let samples: Vec<Option<Point2<f64>>> = rings.iter().map(Ring::interior_point).collect();

        let mut depth = vec![0usize; rings.len()];
        let mut parent: Vec<Option<usize>> = vec![None; rings.len()];
        for i in 0..rings.len() {
            let Some(sample) = samples[i] else { continue };
            for j in 0..rings.len() {
                if i == j || areas[j] <= areas[i] || !rings[j].contains_point_xy(&sample) {
                    continue;
                }
                depth[i] += 1;
                if parent[i].map_or(true, |p| areas[j] < areas[p]) {
                    parent[i] = Some(j);
                }
            }
        }

        let mut group_of = vec![usize::MAX; rings.len()];
        let mut groups = Vec::new();
        for i in 0..rings.len() {
            if depth[i] % 2 == 0 {
                group_of[i] = groups.len();
                groups.push(RingGroup::new(rings[i].clone()));
            }
        }
        for i in 0..rings.len() {
            if depth[i] % 2 == 1 {
                if let Some(g) = parent[i].map(|p| group_of[p]).filter(|&g| g != usize::MAX) {
                    groups[g].interiors.push(rings[i].clone());
                }
            }
        }

        let mut polygon = Self::new(groups, z_aware);
        polygon.normalize_orientation();
        polygon
    }

    /// Exteriors counter-clockwise, holes clockwise
    pub fn normalize_orientation(&mut self) {
        for group in &mut self.groups {
            if group.exterior.is_clockwise() {
                group.exterior.reverse();
            }
            for hole in &mut group.interiors {
                if !hole.is_clockwise() {
                    hole.reverse();
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.groups.iter().map(RingGroup::area).sum()
    }

    pub fn length_xy(&self) -> f64 {
        self.rings().map(Ring::length_xy).sum()
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.groups.iter().flat_map(RingGroup::rings)
    }

    pub fn rings_mut(&mut self) -> impl Iterator<Item = &mut Ring> {
        self.groups.iter_mut().flat_map(RingGroup::rings_mut)
    }

    pub fn ring_count(&self) -> usize {
        self.groups.iter().map(RingGroup::ring_count).sum()
    }

    pub fn exterior_ring_count(&self) -> usize {
        self.groups.len()
    }

    pub fn point_count(&self) -> usize {
        self.groups.iter().map(RingGroup::point_count).sum()
    }

    pub fn envelope(&self) -> Envelope {
        let mut envelope = Envelope::empty();
        for group in &self.groups {
            envelope.union(&group.envelope());
        }
        envelope
    }

    pub fn contains_point_xy(&self, p: &Point2<f64>) -> bool {
        self.groups.iter().any(|g| g.contains_point_xy(p))
    }

    pub fn min_z(&self) -> Option<f64> {
        self.groups
            .iter()
            .filter_map(RingGroup::min_z)
            .min_by(f64::total_cmp)
    }

    pub fn has_undefined_z(&self) -> bool {
        self.groups.iter().any(RingGroup::has_undefined_z)
    }

    pub fn drop_zs(&mut self) {
        for ring in self.rings_mut() {
            ring.drop_zs();
        }
        self.z_aware = false;
    }

    /// One single-group polygon per ring group
    pub fn explode(&self) -> Vec<Polygon> {
        self.groups
            .iter()
            .map(|g| Polygon {
                groups: vec![g.clone()],
                z_aware: self.z_aware,
                m_aware: self.m_aware,
            })
            .collect()
    }

    /// Append the ring groups of `other`
    pub fn merge(&mut self, other: Polygon) {
        self.groups.extend(other.groups);
    }
}
