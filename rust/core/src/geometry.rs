// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use nalgebra::Point3;

use crate::envelope::Envelope;
use crate::multipatch::Multipatch;
use crate::polygon::Polygon;
use crate::polyline::Polyline;

/// Shape of a feature
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    Polyline(Polyline),
    Multipatch(Multipatch),
    Multipoint(Vec<Point3<f64>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryKind {
    Polygon,
    Polyline,
    Multipatch,
    Multipoint,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::Polyline(_) => GeometryKind::Polyline,
            Geometry::Multipatch(_) => GeometryKind::Multipatch,
            Geometry::Multipoint(_) => GeometryKind::Multipoint,
        }
    }

    pub fn envelope(&self) -> Envelope {
        match self {
            Geometry::Polygon(p) => p.envelope(),
            Geometry::Polyline(l) => l.envelope(),
            Geometry::Multipatch(m) => m.envelope(),
            Geometry::Multipoint(points) => Envelope::from_points(points.iter()),
        }
    }

    /// Size used to rank cut results: area, length, surface or point count
    pub fn size(&self) -> f64 {
        match self {
            Geometry::Polygon(p) => p.area(),
            Geometry::Polyline(l) => l.length_xy(),
            Geometry::Multipatch(m) => m.area_3d(),
            Geometry::Multipoint(points) => points.len() as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Polygon(p) => p.is_empty(),
            Geometry::Polyline(l) => l.is_empty(),
            Geometry::Multipatch(m) => m.is_empty(),
            Geometry::Multipoint(points) => points.is_empty(),
        }
    }

    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Geometry::Polygon(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_polyline(&self) -> Option<&Polyline> {
        match self {
            Geometry::Polyline(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_multipatch(&self) -> Option<&Multipatch> {
        match self {
            Geometry::Multipatch(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Polygon> for Geometry {
    fn from(polygon: Polygon) -> Self {
        Geometry::Polygon(polygon)
    }
}

impl From<Polyline> for Geometry {
    fn from(polyline: Polyline) -> Self {
        Geometry::Polyline(polyline)
    }
}

impl From<Multipatch> for Geometry {
    fn from(multipatch: Multipatch) -> Self {
        Geometry::Multipatch(multipatch)
    }
}
