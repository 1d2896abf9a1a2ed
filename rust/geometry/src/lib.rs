// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CutLite Geometry
//!
//! Cut and reshape engine for polygons, polylines and multipatches built on
//! the `cutlite-core` model, `i_overlay` boolean operations and a planar
//! arrangement for noding and face tracing.
//!
//! - [`try_cut_polygon`]: split a polygon along a cut line, kept pieces first
//! - [`try_cut_polyline`]: split a polyline at its cut line intersections
//! - [`try_cut_multipatch`]: cut the footprint and assign the cut ring groups
//!   to the footprint parts
//! - [`ReshapeOperation`]: replace part of a ring boundary by a reshape path,
//!   including vertical rings of multipatches
//! - [`intersection_lines`]: 3D intersection lines of a multipatch and a cut
//!   surface
//! - [`trimmed_cut_lines`]: the applied part of a cut line

pub mod arrangement;
pub mod bool2d;
pub mod crossings;
pub mod cut;
pub mod error;
pub mod intersect3d;
pub mod multipatch_cut;
pub mod planar_cut;
pub mod polyline_cut;
pub mod reshape;
pub mod trim;
pub mod vertical;

pub use cut::{cut_ring_groups, try_cut_polygon, verify_zs, CutOptions, DEFAULT_AREA_TOLERANCE_RATIO};
pub use error::{Error, Result};
pub use intersect3d::{intersection_lines, planar_cut_line};
pub use multipatch_cut::{
    footprint, is_multipatch_with_degenerate_footprint, try_cut_multipatch,
    try_cut_multipatch_with, BoundaryLengthCheck, FootprintCheck, MultipatchCutOptions,
    MultipatchPart,
};
pub use planar_cut::cut_ring_group_planar;
pub use polyline_cut::try_cut_polyline;
pub use reshape::{
    reshape_geometry, CutReshapePath, Notifications, ReshapeOperation, ReshapeResultFilter,
    ReshapeSide, RingReshapeType, SideFilter,
};
pub use trim::trimmed_cut_lines;
pub use vertical::vertical_reshape_paths;
