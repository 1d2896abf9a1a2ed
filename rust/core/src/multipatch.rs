// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multipatches: 3D surfaces made of planar ring patches
//!
//! Only ring based patches can be decomposed into [`RingGroup`]s. Triangle
//! based patch kinds are carried through the model but rejected by
//! [`Multipatch::ring_groups`].

use nalgebra::Point3;

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::polygon::{Polygon, RingGroup};
use crate::ring::Ring;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatchKind {
    OuterRing,
    InnerRing,
    /// Starts a ring group whose following `Ring` patches are its holes
    FirstRing,
    Ring,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PatchKind {
    pub fn is_triangle_based(self) -> bool {
        matches!(
            self,
            PatchKind::Triangles | PatchKind::TriangleStrip | PatchKind::TriangleFan
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub kind: PatchKind,
    pub points: Vec<Point3<f64>>,
    pub id: Option<i32>,
}

impl Patch {
    pub fn new(kind: PatchKind, points: Vec<Point3<f64>>) -> Self {
        Self {
            kind,
            points,
            id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Multipatch {
    pub patches: Vec<Patch>,
    pub point_id_aware: bool,
}

impl Multipatch {
    pub fn new(patches: Vec<Patch>) -> Self {
        Self {
            patches,
            point_id_aware: false,
        }
    }

    /// Build a multipatch with one outer ring patch per group followed by its
    /// inner ring patches
    pub fn from_ring_groups(groups: &[RingGroup]) -> Self {
        let mut patches = Vec::new();
        for group in groups {
            patches.push(Patch {
                kind: PatchKind::OuterRing,
                points: group.exterior.closed_points(),
                id: group.id,
            });
            for hole in &group.interiors {
                patches.push(Patch {
                    kind: PatchKind::InnerRing,
                    points: hole.closed_points(),
                    id: group.id,
                });
            }
        }
        Self {
            patches,
            point_id_aware: groups.iter().any(|g| g.id.is_some()),
        }
    }

    pub fn from_polygon(polygon: &Polygon) -> Self {
        Self::from_ring_groups(&polygon.groups)
    }

    /// Decompose the patches into ring groups
    pub fn ring_groups(&self) -> Result<Vec<RingGroup>> {
        let mut groups: Vec<RingGroup> = Vec::new();
        let mut in_first_ring_group = false;

        for patch in &self.patches {
            if patch.kind.is_triangle_based() {
                return Err(Error::UnsupportedPatch(
                    "The multipatch contains triangles, triangle fans or triangle strips, \
                     which are currently not supported"
                        .into(),
                ));
            }

            let ring = Ring::new(patch.points.clone());
            match patch.kind {
                PatchKind::OuterRing => {
                    in_first_ring_group = false;
                    groups.push(RingGroup {
                        id: patch.id,
                        ..RingGroup::new(ring)
                    });
                }
                PatchKind::FirstRing => {
                    in_first_ring_group = true;
                    groups.push(RingGroup {
                        id: patch.id,
                        ..RingGroup::new(ring)
                    });
                }
                PatchKind::InnerRing => match groups.last_mut() {
                    Some(group) if !in_first_ring_group => group.interiors.push(ring),
                    _ => {
                        return Err(Error::InvalidGeometry(
                            "Inner ring without preceding outer ring".into(),
                        ))
                    }
                },
                PatchKind::Ring => match groups.last_mut() {
                    Some(group) if in_first_ring_group => group.interiors.push(ring),
                    _ => groups.push(RingGroup {
                        id: patch.id,
                        ..RingGroup::new(ring)
                    }),
                },
                PatchKind::Triangles | PatchKind::TriangleStrip | PatchKind::TriangleFan => {}
            }
        }
        Ok(groups)
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::from_points(self.patches.iter().flat_map(|p| p.points.iter()))
    }

    /// Surface area of the ring groups; triangle based patches count zero
    pub fn area_3d(&self) -> f64 {
        self.ring_groups()
            .map(|groups| groups.iter().map(RingGroup::area_3d).sum())
            .unwrap_or(0.0)
    }

    pub fn min_z(&self) -> Option<f64> {
        self.patches
            .iter()
            .flat_map(|p| p.points.iter())
            .map(|p| p.z)
            .filter(|z| z.is_finite())
            .min_by(f64::total_cmp)
    }
}
