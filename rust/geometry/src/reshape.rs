// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring Reshaping
//!
//! A reshape path that crosses a ring at least twice replaces the ring
//! boundary between its first and last crossing. Splicing the path into the
//! ring yields two candidate rings: the left one keeps the boundary walked
//! from the last crossing back to the first, the right one keeps the
//! boundary from the first crossing to the last. The default side follows
//! the shape of the two candidates ([`RingReshapeType`]); callers may ask for
//! the other side, which is only honoured where it cannot produce an
//! inconsistent result.
//!
//! Vertical rings of multipatches are reshaped in their wall plane along
//! vertical sub-paths of the reshape path.

use std::f64::consts::SQRT_2;

use cutlite_core::segment::xy;
use cutlite_core::{Geometry, Multipatch, Path, Polygon, Ring, Tolerance};
use nalgebra::Point3;

use crate::arrangement::{has_self_intersections, simplify_rings};
use crate::bool2d::{contains, interior_intersects};
use crate::crossings::{path_ring_crossings, Crossing};
use crate::error::{Error, Result};
use crate::vertical::{vertical_reshape_paths, WallFrame};

const MSG_PATH_EMPTY: &str = "Reshape path is empty";
const MSG_PATH_TOO_SHORT: &str = "Reshape path is too short";
const MSG_NOT_ENOUGH_INTERSECTIONS: &str = "Not enough intersection points";
const MSG_AMBIGUOUS: &str = "Ambiguous reshape line might result in boundary loops. \
                             The reshape line does not cut the polygon boundary in sequential order";
const MSG_SELF_CONTRADICTING: &str =
    "Self-contradicting reshape line might produce unexpected result or boundary loop";
const MSG_INCONSISTENT_PARTS: &str = "Reshape would result in several inconsistent parts";
const MSG_NON_DEFAULT_SIDE: &str = "Reshaped polygon with the non-default side of the reshape line";
const MSG_OVERRIDE_NOT_HONOURED: &str =
    "The desired override of the reshape side was not honoured to avoid an incorrect result";

/// Side of the reshape path whose candidate ring replaces the original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReshapeSide {
    #[default]
    Undefined,
    Left,
    Right,
}

impl ReshapeSide {
    pub fn opposite(self) -> Self {
        match self {
            ReshapeSide::Left => ReshapeSide::Right,
            ReshapeSide::Right => ReshapeSide::Left,
            ReshapeSide::Undefined => ReshapeSide::Undefined,
        }
    }
}

/// How the reshape path runs relative to the ring it reshapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RingReshapeType {
    #[default]
    Undefined,
    /// One candidate is empty: the path runs along the boundary
    AlongBoundary,
    /// The path runs inside the ring and cuts a piece off
    InsideOnly,
    /// The path runs outside the ring and adds area to it
    OutsideOnly,
    InsideAndOutside,
    /// The path cuts several pieces off the ring
    InsideOnlySeveralParts,
    /// The path runs inside and outside and crosses the kept boundary of
    /// both candidates
    InsideAndOutsideWithCrossCut,
    /// Both candidates fall apart into several rings
    Zigzag,
}

/// Messages for the user collected while reshaping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notifications {
    pub messages: Vec<String>,
    /// Set if any message describes a potentially unwanted result
    pub is_warning: bool,
}

impl Notifications {
    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.add(message);
        self.is_warning = true;
    }

    pub fn contains(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.contains(text))
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Caller hook deciding on the side of a planar reshape
pub trait ReshapeResultFilter {
    /// Request the non-default side
    fn use_non_default_side(&self) -> bool {
        false
    }

    /// Reject the result polygon of the default side, e.g. because it would
    /// overlap other features. A rejected side is swapped where possible.
    fn is_side_allowed(
        &self,
        _result: &Polygon,
        _side: ReshapeSide,
        _notifications: &mut Notifications,
    ) -> bool {
        true
    }
}

/// Filter that only toggles the non-default side
#[derive(Debug, Clone, Copy, Default)]
pub struct SideFilter {
    pub use_non_default_side: bool,
}

impl ReshapeResultFilter for SideFilter {
    fn use_non_default_side(&self) -> bool {
        self.use_non_default_side
    }
}

/// Part of a reshape path between its first and last crossing of a ring
#[derive(Debug, Clone, PartialEq)]
pub struct CutReshapePath {
    pub path: Path,
    pub start: Crossing,
    pub end: Crossing,
    /// All crossings with the ring, ordered along the reshape path
    pub crossings: Vec<Crossing>,
}

impl CutReshapePath {
    /// `None` unless the path crosses the ring at two distinct places
    pub fn new(reshape_path: &Path, ring: &Ring, tolerance: f64) -> Option<Self> {
        let crossings = path_ring_crossings(reshape_path, ring, tolerance);
        let start = *crossings.first()?;
        let end = *crossings.last()?;
        if end.path_distance - start.path_distance <= tolerance {
            return None;
        }

        let (head, _) = reshape_path.split_at_distance(end.path_distance)?;
        let (_, path) = head.split_at_distance(start.path_distance)?;
        if path.points.len() < 2 {
            return None;
        }
        Some(Self {
            path,
            start,
            end,
            crossings,
        })
    }

    /// Whether the path crosses the boundary that `side` keeps between its
    /// first and last crossing
    fn crosses_kept_boundary(&self, ring: &Ring, side: ReshapeSide, tolerance: f64) -> bool {
        let arc = match side {
            ReshapeSide::Right => {
                RingArc::new(ring, self.start.ring_distance, self.end.ring_distance, tolerance)
            }
            _ => RingArc::new(ring, self.end.ring_distance, self.start.ring_distance, tolerance),
        };
        self.crossings.iter().any(|c| {
            c.path_distance > self.start.path_distance + tolerance
                && c.path_distance < self.end.path_distance - tolerance
                && arc.offset_of(c.ring_distance, tolerance).is_some()
        })
    }
}

/// Boundary stretch of a ring walked in ring direction
struct RingArc {
    from: f64,
    span: f64,
    total: f64,
}

impl RingArc {
    /// From and to the same position the arc is the whole ring
    fn new(ring: &Ring, from: f64, to: f64, tolerance: f64) -> Self {
        let total = ring.length_xy();
        if total <= 0.0 {
            return Self { from: 0.0, span: 0.0, total: 0.0 };
        }
        let from = from.rem_euclid(total);
        let mut span = (to - from).rem_euclid(total);
        if span <= tolerance || total - span <= tolerance {
            span = total;
        }
        Self { from, span, total }
    }

    /// Offset of a ring position strictly inside the arc
    fn offset_of(&self, position: f64, tolerance: f64) -> Option<f64> {
        if self.total <= 0.0 {
            return None;
        }
        let offset = (position - self.from).rem_euclid(self.total);
        (offset > tolerance && offset < self.span - tolerance).then_some(offset)
    }

    /// Ring vertices strictly inside the arc, in walking order
    fn vertices(&self, ring: &Ring, tolerance: f64) -> Vec<Point3<f64>> {
        let mut position = 0.0;
        let mut inside: Vec<(f64, Point3<f64>)> = Vec::new();
        for (a, b) in ring.segments() {
            if let Some(offset) = self.offset_of(position, tolerance) {
                inside.push((offset, *a));
            }
            position += (xy(b) - xy(a)).norm();
        }
        inside.sort_by(|p, q| p.0.total_cmp(&q.0));
        inside.into_iter().map(|(_, p)| p).collect()
    }
}

/// Splice the cut reshape path into `ring`, keeping the boundary on `side`.
///
/// The result starts at the first vertex of `ring` if it survives, otherwise
/// at the first crossing.
fn splice(ring: &Ring, cut: &CutReshapePath, side: ReshapeSide, tolerance: f64) -> Ring {
    let (a, b) = (cut.start.ring_distance, cut.end.ring_distance);
    let path = &cut.path.points;

    let points: Vec<Point3<f64>> = if side == ReshapeSide::Right {
        let arc = RingArc::new(ring, a, b, tolerance);
        path.first()
            .copied()
            .into_iter()
            .chain(arc.vertices(ring, tolerance))
            .chain(path.iter().rev().take(path.len().saturating_sub(1)).copied())
            .collect()
    } else {
        let arc = RingArc::new(ring, b, a, tolerance);
        path.iter().copied().chain(arc.vertices(ring, tolerance)).collect()
    };

    let mut result = Ring { points };
    result.remove_duplicate_points(tolerance);
    if let Some(first) = ring.points.first() {
        if let Some(index) = result
            .points
            .iter()
            .position(|p| (xy(p) - xy(first)).norm() <= tolerance)
        {
            result.points.rotate_left(index);
        }
    }
    result
}

fn side_polygon(ring: &Ring, tolerance: f64) -> Polygon {
    Polygon::new(simplify_rings(&[ring], tolerance), false)
}

fn larger_side(left: f64, right: f64) -> ReshapeSide {
    if left > right {
        ReshapeSide::Left
    } else {
        ReshapeSide::Right
    }
}

fn largest_ring<'a>(polygons: impl IntoIterator<Item = &'a Polygon>) -> Option<Ring> {
    polygons
        .into_iter()
        .flat_map(Polygon::rings)
        .max_by(|a, b| a.area().total_cmp(&b.area()))
        .cloned()
}

/// Classify the reshape from the two simplified candidates and the original
pub fn ring_reshape_type(
    left: &Polygon,
    right: &Polygon,
    original: &Polygon,
    crosses_both_kept_boundaries: bool,
    tolerance: f64,
) -> RingReshapeType {
    let (l, r) = (left.ring_count(), right.ring_count());
    let enlarges = || contains(left, original, tolerance) || contains(right, original, tolerance);

    if l == 0 || r == 0 {
        RingReshapeType::AlongBoundary
    } else if l == 1 && r == 1 {
        if enlarges() {
            RingReshapeType::OutsideOnly
        } else if !interior_intersects(left, right, tolerance) {
            RingReshapeType::InsideOnly
        } else {
            RingReshapeType::InsideAndOutside
        }
    } else if l > 1 && r > 1 {
        RingReshapeType::Zigzag
    } else if contains(original, left, tolerance) || contains(original, right, tolerance) {
        RingReshapeType::InsideOnlySeveralParts
    } else if enlarges() {
        RingReshapeType::OutsideOnly
    } else if crosses_both_kept_boundaries {
        RingReshapeType::InsideAndOutsideWithCrossCut
    } else {
        RingReshapeType::InsideAndOutside
    }
}

/// Default side for a reshape type, and whether the other side may be used
/// on request
pub fn default_reshape_side(
    reshape_type: RingReshapeType,
    left: &Polygon,
    right: &Polygon,
    crosses_both_kept_boundaries: bool,
    notifications: &mut Notifications,
) -> (ReshapeSide, bool) {
    let (l, r) = (left.ring_count(), right.ring_count());
    let larger = larger_side(left.area(), right.area());

    if l == 0 {
        return (ReshapeSide::Right, false);
    }
    if r == 0 {
        return (ReshapeSide::Left, false);
    }

    if l == 1 && r == 1 {
        if reshape_type == RingReshapeType::InsideAndOutside {
            if crosses_both_kept_boundaries {
                notifications.warn(MSG_AMBIGUOUS);
            } else {
                notifications.warn(MSG_SELF_CONTRADICTING);
            }
            return (larger, true);
        }
        return (larger, reshape_type == RingReshapeType::InsideOnly);
    }

    if l > 1 && r > 1 {
        notifications.warn(MSG_INCONSISTENT_PARTS);
        return (ReshapeSide::Undefined, false);
    }

    // Exactly one candidate falls apart
    let whole = if r > 1 { ReshapeSide::Left } else { ReshapeSide::Right };
    match reshape_type {
        RingReshapeType::InsideOnlySeveralParts => (whole, true),
        RingReshapeType::OutsideOnly => {
            if left.exterior_ring_count() == 1 && right.exterior_ring_count() == 1 {
                (whole.opposite(), false)
            } else {
                (whole, false)
            }
        }
        RingReshapeType::InsideAndOutsideWithCrossCut => {
            notifications.warn(MSG_AMBIGUOUS);
            (ReshapeSide::Undefined, false)
        }
        _ => (whole, false),
    }
}

enum Target {
    Polygon(Polygon),
    Multipatch(Multipatch),
}

/// Reshape of one polygon or multipatch along a reshape path
pub struct ReshapeOperation {
    target: Target,
    rings: Vec<Ring>,
    reshape_path: Path,
    tolerance: Tolerance,
    filter: Option<Box<dyn ReshapeResultFilter>>,
    preset_side: ReshapeSide,
    non_planar: bool,
    ring_index: Option<usize>,
    side: ReshapeSide,
    reshape_type: RingReshapeType,
    notifications: Notifications,
    changed: bool,
}

impl ReshapeOperation {
    pub fn new(geometry: &Geometry, reshape_path: Path, tolerance: Tolerance) -> Result<Self> {
        let (target, rings) = match geometry {
            Geometry::Polygon(polygon) => {
                let rings = polygon.rings().cloned().collect();
                (Target::Polygon(polygon.clone()), rings)
            }
            Geometry::Multipatch(multipatch) => {
                if multipatch.patches.iter().any(|p| p.kind.is_triangle_based()) {
                    return Err(Error::UnsupportedGeometry(
                        "Multipatches with triangles cannot be reshaped".to_string(),
                    ));
                }
                let rings = multipatch
                    .patches
                    .iter()
                    .map(|p| Ring::new(p.points.clone()))
                    .collect();
                (Target::Multipatch(multipatch.clone()), rings)
            }
            other => {
                return Err(Error::UnsupportedGeometry(format!(
                    "Cannot reshape a {:?}",
                    other.kind()
                )))
            }
        };

        Ok(Self {
            target,
            rings,
            reshape_path,
            tolerance,
            filter: None,
            preset_side: ReshapeSide::Undefined,
            non_planar: false,
            ring_index: None,
            side: ReshapeSide::Undefined,
            reshape_type: RingReshapeType::Undefined,
            notifications: Notifications::default(),
            changed: false,
        })
    }

    pub fn with_filter(mut self, filter: impl ReshapeResultFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Use `side` instead of determining it
    pub fn with_side(mut self, side: ReshapeSide) -> Self {
        self.preset_side = side;
        self
    }

    /// Determine the side by the 3D area of the candidates
    pub fn with_non_planar(mut self, non_planar: bool) -> Self {
        self.non_planar = non_planar;
        self
    }

    /// Reshape the ring at `index` instead of identifying it
    pub fn with_ring_index(mut self, index: usize) -> Self {
        self.ring_index = Some(index);
        self
    }

    pub fn side(&self) -> ReshapeSide {
        self.side
    }

    pub fn reshape_type(&self) -> RingReshapeType {
        self.reshape_type
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn ring_index(&self) -> Option<usize> {
        self.ring_index
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn reshape_path(&self) -> &Path {
        &self.reshape_path
    }

    fn is_multipatch(&self) -> bool {
        matches!(self.target, Target::Multipatch(_))
    }

    fn is_vertical_ring(&self, ring: &Ring) -> bool {
        self.is_multipatch() && ring.is_vertical(&self.tolerance)
    }

    /// Check the reshape path itself; problems are added to the notifications
    pub fn validate_reshape_path(&mut self) -> bool {
        let points = &self.reshape_path.points;
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            self.notifications.add(MSG_PATH_EMPTY);
            return false;
        };
        if points.len() < 2 {
            self.notifications.add(MSG_PATH_EMPTY);
            return false;
        }

        let three_d = self.is_multipatch() && points.iter().all(|p| p.z.is_finite());
        let (gap, length) = if three_d {
            let length: f64 = self.reshape_path.segments().map(|(a, b)| (b - a).norm()).sum();
            ((last - first).norm(), length)
        } else {
            ((xy(last) - xy(first)).norm(), self.reshape_path.length_xy())
        };
        if gap <= self.tolerance.xy && length < self.tolerance.xy * SQRT_2 {
            self.notifications.add(MSG_PATH_TOO_SHORT);
            return false;
        }
        true
    }

    fn is_vertical_path(&self) -> bool {
        let points = &self.reshape_path.points;
        let Some(first) = points.first() else {
            return false;
        };
        let (zmin, zmax) = Ring { points: points.clone() }.z_range();
        zmax - zmin > self.tolerance.z
            && points
                .iter()
                .all(|p| (xy(p) - xy(first)).norm() <= self.tolerance.xy)
    }

    fn vertical_paths(&self, ring: &Ring) -> Vec<Path> {
        if self.is_vertical_path() {
            vec![self.reshape_path.clone()]
        } else {
            vertical_reshape_paths(ring, &self.reshape_path, &self.tolerance)
        }
    }

    fn can_reshape_ring(&self, ring: &Ring) -> bool {
        if self.is_vertical_ring(ring) {
            !self.vertical_paths(ring).is_empty()
        } else {
            CutReshapePath::new(&self.reshape_path, ring, self.tolerance.xy).is_some()
        }
    }

    /// Find the only ring the reshape path can reshape.
    ///
    /// Returns the ring index if it is unique and all reshapable rings.
    pub fn identify_unique_ring_to_reshape(&mut self) -> (Option<usize>, Vec<usize>) {
        let reshapable: Vec<usize> = (0..self.rings.len())
            .filter(|&i| self.can_reshape_ring(&self.rings[i]))
            .collect();
        match reshapable.len() {
            0 => {
                self.notifications.add(MSG_NOT_ENOUGH_INTERSECTIONS);
                (None, reshapable)
            }
            1 => {
                self.ring_index = Some(reshapable[0]);
                (self.ring_index, reshapable)
            }
            n => {
                self.notifications.add(format!(
                    "Reshape line intersects {n} parts of the feature to reshape"
                ));
                (None, reshapable)
            }
        }
    }

    /// Whether the ring at `ring_index` is a vertical multipatch ring the
    /// reshape path crosses, with the vertical paths to reshape it along
    pub fn is_vertical_ring_reshape(&self, ring_index: usize) -> (bool, Vec<Path>) {
        match self.rings.get(ring_index) {
            Some(ring) if self.is_vertical_ring(ring) => {
                let paths = self.vertical_paths(ring);
                (!paths.is_empty(), paths)
            }
            _ => (false, Vec::new()),
        }
    }

    /// Candidate polygons left and right of the reshape path for the ring
    /// at `ring_index`, simplified
    pub fn both_side_polygons(&self, ring_index: usize) -> Option<(Polygon, Polygon)> {
        let ring = self.rings.get(ring_index)?;
        let tolerance = self.tolerance.xy;
        let cut = CutReshapePath::new(&self.reshape_path, ring, tolerance)?;
        Some((
            side_polygon(&splice(ring, &cut, ReshapeSide::Left, tolerance), tolerance),
            side_polygon(&splice(ring, &cut, ReshapeSide::Right, tolerance), tolerance),
        ))
    }

    /// Side to reshape `ring` on, honouring the filter where possible
    fn determine_reshape_side(&mut self, ring: &Ring, cut: &CutReshapePath) -> Result<ReshapeSide> {
        if self.preset_side != ReshapeSide::Undefined {
            return Ok(self.preset_side);
        }

        let tolerance = self.tolerance.xy;
        let left_ring = splice(ring, cut, ReshapeSide::Left, tolerance);
        let right_ring = splice(ring, cut, ReshapeSide::Right, tolerance);
        if self.non_planar {
            return Ok(larger_side(left_ring.area_3d(), right_ring.area_3d()));
        }

        let left = side_polygon(&left_ring, tolerance);
        let right = side_polygon(&right_ring, tolerance);
        if left.is_empty() && right.is_empty() {
            return Err(Error::Reshape(
                "Both reshape options are empty. This is an indication of an invalid reshape curve."
                    .to_string(),
            ));
        }

        let crosses_both = cut.crosses_kept_boundary(ring, ReshapeSide::Left, tolerance)
            && cut.crosses_kept_boundary(ring, ReshapeSide::Right, tolerance);
        let original = Polygon::from_ring(ring.clone(), false);
        self.reshape_type = ring_reshape_type(&left, &right, &original, crosses_both, tolerance);

        let (mut side, can_use_other_side) = default_reshape_side(
            self.reshape_type,
            &left,
            &right,
            crosses_both,
            &mut self.notifications,
        );
        if side == ReshapeSide::Undefined {
            return Ok(side);
        }

        let try_non_default = match &self.filter {
            Some(filter) => {
                let result = if side == ReshapeSide::Left { &left } else { &right };
                filter.use_non_default_side()
                    || !filter.is_side_allowed(result, side, &mut self.notifications)
            }
            None => false,
        };
        if try_non_default {
            if can_use_other_side {
                side = side.opposite();
                self.notifications.add(MSG_NON_DEFAULT_SIDE);
            } else {
                self.notifications.warn(MSG_OVERRIDE_NOT_HONOURED);
            }
        }
        Ok(side)
    }

    /// Reshape the ring identified by the reshape path.
    ///
    /// Returns `false` with notifications if the path cannot reshape the
    /// geometry.
    pub fn reshape(&mut self) -> Result<bool> {
        if !self.validate_reshape_path() {
            return Ok(false);
        }
        let index = match self.ring_index {
            Some(index) => index,
            None => match self.identify_unique_ring_to_reshape().0 {
                Some(index) => index,
                None => return Ok(false),
            },
        };
        self.reshape_ring(index)
    }

    /// Reshape every ring the reshape path can reshape
    pub fn reshape_all_rings(&mut self) -> Result<bool> {
        if !self.validate_reshape_path() {
            return Ok(false);
        }
        let indexes: Vec<usize> = (0..self.rings.len())
            .filter(|&i| self.can_reshape_ring(&self.rings[i]))
            .collect();
        if indexes.is_empty() {
            self.notifications.add(MSG_NOT_ENOUGH_INTERSECTIONS);
            return Ok(false);
        }

        let mut reshaped = false;
        for index in indexes {
            reshaped |= self.reshape_ring(index)?;
        }
        Ok(reshaped)
    }

    fn reshape_ring(&mut self, index: usize) -> Result<bool> {
        let ring = self
            .rings
            .get(index)
            .cloned()
            .ok_or_else(|| Error::Reshape(format!("There is no ring {index} to reshape")))?;
        if self.is_vertical_ring(&ring) {
            return Ok(self.reshape_vertical_ring(index, &ring));
        }

        let tolerance = self.tolerance.xy;
        let Some(cut) = CutReshapePath::new(&self.reshape_path, &ring, tolerance) else {
            self.notifications
                .add(format!("Reshape line intersects part {index} only once"));
            return Ok(false);
        };

        let side = self.determine_reshape_side(&ring, &cut)?;
        let mut result = match side {
            ReshapeSide::Undefined => {
                let left = side_polygon(&splice(&ring, &cut, ReshapeSide::Left, tolerance), tolerance);
                let right = side_polygon(&splice(&ring, &cut, ReshapeSide::Right, tolerance), tolerance);
                match largest_ring([&left, &right]) {
                    Some(largest) => largest,
                    None => return Ok(false),
                }
            }
            side => splice(&ring, &cut, side, tolerance),
        };

        if self.is_multipatch() && result.signed_area().signum() != ring.signed_area().signum() {
            result.reverse();
        }
        if !ring.has_undefined_z() && result.has_undefined_z() {
            result.interpolate_undefined_zs();
        }

        tracing::debug!(
            ring = index,
            side = ?side,
            reshape_type = ?self.reshape_type,
            points = result.len(),
            "Reshaped ring"
        );
        self.rings[index] = result;
        self.ring_index = Some(index);
        self.side = side;
        self.changed = true;
        Ok(true)
    }

    /// Reshape a wall ring in its own plane along each vertical path
    fn reshape_vertical_ring(&mut self, index: usize, ring: &Ring) -> bool {
        let paths = self.vertical_paths(ring);
        let Some(frame) = WallFrame::new(ring) else {
            return false;
        };

        let tolerance = self.tolerance.xy;
        let mut local = frame.ring_to_local(ring);
        let mut reshaped = false;
        for path in &paths {
            let local_path = Path::new(path.points.iter().map(|p| frame.to_local(p)).collect());
            let Some(cut) = CutReshapePath::new(&local_path, &local, tolerance) else {
                continue;
            };
            let side = match self.preset_side {
                ReshapeSide::Undefined => {
                    let left = splice(&local, &cut, ReshapeSide::Left, tolerance);
                    let right = splice(&local, &cut, ReshapeSide::Right, tolerance);
                    larger_side(left.area(), right.area())
                }
                side => side,
            };
            local = splice(&local, &cut, side, tolerance);
            self.side = side;
            reshaped = true;
        }

        if !reshaped {
            self.notifications.add(MSG_NOT_ENOUGH_INTERSECTIONS);
            return false;
        }
        tracing::debug!(
            ring = index,
            paths = paths.len(),
            side = ?self.side,
            "Reshaped vertical ring"
        );
        self.rings[index] = frame.ring_to_world(&local);
        self.ring_index = Some(index);
        self.changed = true;
        true
    }

    /// The reshaped geometry
    pub fn geometry(&self) -> Geometry {
        match &self.target {
            Target::Polygon(original) if !self.changed => Geometry::Polygon(original.clone()),
            Target::Polygon(original) => {
                let tolerance = self.tolerance.xy;
                let refs: Vec<&Ring> = self.rings.iter().collect();
                let mut polygon = if has_self_intersections(&refs, tolerance) {
                    let mut polygon = Polygon::new(simplify_rings(&refs, tolerance), original.z_aware);
                    polygon.normalize_orientation();
                    polygon
                } else {
                    Polygon::from_rings(self.rings.clone(), original.z_aware)
                };
                polygon.m_aware = original.m_aware;
                Geometry::Polygon(polygon)
            }
            Target::Multipatch(original) => {
                let mut multipatch = original.clone();
                for (patch, ring) in multipatch.patches.iter_mut().zip(&self.rings) {
                    patch.points = ring.closed_points();
                }
                Geometry::Multipatch(multipatch)
            }
        }
    }

    pub fn into_geometry(self) -> Geometry {
        self.geometry()
    }
}

/// Reshape the operation's geometry along `reshape_path`.
///
/// Side settings and filter of the operation are kept; the ring to reshape
/// is identified anew.
pub fn reshape_geometry(operation: &mut ReshapeOperation, reshape_path: &Path) -> Result<bool> {
    operation.reshape_path = reshape_path.clone();
    operation.ring_index = None;
    operation.reshape()
}
