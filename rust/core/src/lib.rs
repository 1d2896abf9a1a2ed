// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CutLite Core
//!
//! Geometry model shared by the CutLite cut engine and feature processing.
//!
//! ## Overview
//!
//! - **Rings and polygons**: [`Ring`], [`RingGroup`] and [`Polygon`] with
//!   XY area, containment and interior point queries
//! - **Polylines**: [`Path`] and [`Polyline`], used both as features and as
//!   cut lines
//! - **Multipatches**: [`Multipatch`] surfaces decomposed into ring groups
//! - **Tolerance aware predicates**: segment intersection, vertical ring
//!   detection and plane fitting
//!
//! Vertices are `nalgebra::Point3<f64>`. A `NaN` Z marks a vertex whose height
//! is not (yet) known.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cutlite_core::{Polygon, Ring};
//!
//! let square = Ring::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
//! let polygon = Polygon::from_ring(square, false);
//! assert_eq!(polygon.area(), 100.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization of the option enums

pub mod envelope;
pub mod error;
pub mod geometry;
pub mod multipatch;
pub mod plane;
pub mod policy;
pub mod polygon;
pub mod polyline;
pub mod ring;
pub mod segment;
pub mod tolerance;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use geometry::{Geometry, GeometryKind};
pub use multipatch::{Multipatch, Patch, PatchKind};
pub use plane::Plane3D;
pub use policy::{DegenerateFootprintPolicy, ZSource};
pub use polygon::{Polygon, RingGroup};
pub use polyline::{Path, Polyline};
pub use ring::Ring;
pub use tolerance::Tolerance;

// Re-export for downstream crates working with vertices
pub use nalgebra::{Point2, Point3, Vector3};
