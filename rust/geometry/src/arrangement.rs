// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar Arrangement of Rings and Cut Lines
//!
//! Rings and cut paths are noded at all their mutual intersections (nodes
//! within the tolerance are merged through a hash grid) and the resulting
//! planar graph is traced into faces. Two classifications are built on top:
//!
//! - [`split_rings`]: faces inside the rings, separated by the cut paths
//! - [`simplify_rings`]: faces inside the rings under the even-odd rule,
//!   which resolves self-intersections and overlaps
//!
//! Components nested inside a face (islands, holes the cut does not touch)
//! are attached to their smallest enclosing face.

use cutlite_core::segment::{intersect_segments, xy};
use cutlite_core::{Path, Ring, RingGroup};
use nalgebra::{Point2, Point3, Vector2};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// How a node obtained its Z value; higher variants take precedence when
/// nodes are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ZOrigin {
    Undefined,
    Interpolated,
    CutLine,
    Vertex,
}

#[derive(Debug, Clone)]
struct Node {
    position: Point2<f64>,
    z: f64,
    z_origin: ZOrigin,
}

#[derive(Debug, Clone, Default)]
struct Edge {
    from: usize,
    to: usize,
    /// Odd number of boundary traversals
    odd: bool,
    boundary: bool,
    cut: bool,
    active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Boundary,
    Cut,
}

#[derive(Debug, Clone, Copy)]
struct InputSegment {
    start: Point3<f64>,
    end: Point3<f64>,
    kind: SegmentKind,
}

/// Z handling while noding
#[derive(Debug, Clone, Copy, Default)]
pub struct ZOptions {
    /// Take the Z of nodes on a cut line from the cut line
    pub keep_cut_z: bool,
    /// Interpolate the Z of split points on boundary segments
    pub interpolate_boundary_z: bool,
}

/// Noded planar graph
struct PlanarGraph {
    tolerance: f64,
    nodes: Vec<Node>,
    grid: FxHashMap<(i64, i64), SmallVec<[usize; 2]>>,
    edges: Vec<Edge>,
    edge_index: FxHashMap<(usize, usize), usize>,
}

impl PlanarGraph {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(1e-9),
            nodes: Vec::new(),
            grid: FxHashMap::default(),
            edges: Vec::new(),
            edge_index: FxHashMap::default(),
        }
    }

    #[inline]
    fn cell(&self, p: &Point2<f64>) -> (i64, i64) {
        (
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
        )
    }

    /// Find or create the node at `position`
    fn snap(&mut self, position: Point2<f64>, z: f64, z_origin: ZOrigin) -> usize {
        let (cx, cy) = self.cell(&position);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(candidates) = self.grid.get(&(cx + dx, cy + dy)) {
                    for &index in candidates {
                        if (self.nodes[index].position - position).norm() <= self.tolerance {
                            found = Some(index);
                            break 'search;
                        }
                    }
                }
            }
        }

        let (z, z_origin) = if z.is_finite() && z_origin != ZOrigin::Undefined {
            (z, z_origin)
        } else {
            (f64::NAN, ZOrigin::Undefined)
        };

        if let Some(index) = found {
            let node = &mut self.nodes[index];
            if z_origin > node.z_origin {
                node.z = z;
                node.z_origin = z_origin;
            }
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(Node {
            position,
            z,
            z_origin,
        });
        self.grid.entry((cx, cy)).or_default().push(index);
        index
    }

    fn add_edge(&mut self, a: usize, b: usize, kind: SegmentKind) {
        if a == b {
            return;
        }
        let key = (a.min(b), a.max(b));
        let index = match self.edge_index.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.edges.len();
                self.edges.push(Edge {
                    from: key.0,
                    to: key.1,
                    ..Edge::default()
                });
                self.edge_index.insert(key, index);
                index
            }
        };
        let edge = &mut self.edges[index];
        match kind {
            SegmentKind::Boundary => {
                edge.boundary = true;
                edge.odd = !edge.odd;
            }
            SegmentKind::Cut => edge.cut = true,
        }
    }

    /// Node all segments at their mutual intersections
    fn build(segments: &[InputSegment], tolerance: f64, z_options: ZOptions) -> Self {
        let mut graph = Self::new(tolerance);

        let mut splits: Vec<Vec<(f64, Point2<f64>)>> = segments
            .iter()
            .map(|s| vec![(0.0, xy(&s.start)), (1.0, xy(&s.end))])
            .collect();

        for i in 0..segments.len() {
            let (a0, a1) = (xy(&segments[i].start), xy(&segments[i].end));
            for j in (i + 1)..segments.len() {
                let (b0, b1) = (xy(&segments[j].start), xy(&segments[j].end));
                if a0.x.max(a1.x) + tolerance < b0.x.min(b1.x)
                    || b0.x.max(b1.x) + tolerance < a0.x.min(a1.x)
                    || a0.y.max(a1.y) + tolerance < b0.y.min(b1.y)
                    || b0.y.max(b1.y) + tolerance < a0.y.min(a1.y)
                {
                    continue;
                }
                for hit in intersect_segments(&a0, &a1, &b0, &b1, tolerance) {
                    splits[i].push((hit.t_a, hit.point));
                    splits[j].push((hit.t_b, hit.point));
                }
            }
        }

        // Vertices first so that they define the node positions
        for segment in segments {
            let origin = vertex_origin(segment.kind, z_options);
            graph.snap(xy(&segment.start), segment.start.z, origin);
            graph.snap(xy(&segment.end), segment.end.z, origin);
        }

        for (segment, points) in segments.iter().zip(splits.iter_mut()) {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            let mut previous: Option<usize> = None;
            for &(t, point) in points.iter() {
                let (z, origin) = if t <= 0.0 {
                    (segment.start.z, vertex_origin(segment.kind, z_options))
                } else if t >= 1.0 {
                    (segment.end.z, vertex_origin(segment.kind, z_options))
                } else {
                    (
                        segment.start.z + (segment.end.z - segment.start.z) * t,
                        split_origin(segment.kind, z_options),
                    )
                };
                let node = graph.snap(point, z, origin);
                if let Some(prev) = previous {
                    graph.add_edge(prev, node, segment.kind);
                }
                previous = Some(node);
            }
        }
        graph
    }

    fn midpoint(&self, edge: &Edge) -> Point2<f64> {
        nalgebra::center(
            &self.nodes[edge.from].position,
            &self.nodes[edge.to].position,
        )
    }

    /// Repeatedly deactivate edges with a free end
    fn prune_dangling(&mut self) {
        let mut degree = vec![0usize; self.nodes.len()];
        for edge in self.edges.iter().filter(|e| e.active) {
            degree[edge.from] += 1;
            degree[edge.to] += 1;
        }
        loop {
            let mut changed = false;
            for edge in self.edges.iter_mut().filter(|e| e.active) {
                if degree[edge.from] < 2 || degree[edge.to] < 2 {
                    edge.active = false;
                    degree[edge.from] -= 1;
                    degree[edge.to] -= 1;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn point3(&self, index: usize) -> Point3<f64> {
        let node = &self.nodes[index];
        Point3::new(node.position.x, node.position.y, node.z)
    }

    /// Trace all face cycles of the active edges
    fn trace_faces(&self) -> Vec<Cycle> {
        let half_edge_count = self.edges.len() * 2;
        let origin = |h: usize| {
            let e = &self.edges[h / 2];
            if h % 2 == 0 {
                e.from
            } else {
                e.to
            }
        };
        let target = |h: usize| origin(h ^ 1);

        let mut outgoing: Vec<Vec<(f64, usize)>> = vec![Vec::new(); self.nodes.len()];
        for (index, edge) in self.edges.iter().enumerate() {
            if !edge.active {
                continue;
            }
            for h in [index * 2, index * 2 + 1] {
                let from = self.nodes[origin(h)].position;
                let to = self.nodes[target(h)].position;
                let angle = (to.y - from.y).atan2(to.x - from.x);
                outgoing[origin(h)].push((angle, h));
            }
        }

        let mut position = vec![usize::MAX; half_edge_count];
        for list in &mut outgoing {
            list.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (i, &(_, h)) in list.iter().enumerate() {
                position[h] = i;
            }
        }

        let components = self.components();

        let mut visited = vec![false; half_edge_count];
        let mut cycles = Vec::new();
        for start in 0..half_edge_count {
            if visited[start] || !self.edges[start / 2].active {
                continue;
            }
            let mut nodes = Vec::new();
            let mut h = start;
            while !visited[h] {
                visited[h] = true;
                nodes.push(origin(h));

                // Next edge is the one immediately clockwise of the twin
                let v = target(h);
                let list = &outgoing[v];
                let i = position[h ^ 1];
                h = list[(i + list.len() - 1) % list.len()].1;
            }

            let area = signed_area(nodes.iter().map(|&n| &self.nodes[n].position));
            let component = components[origin(start)];
            cycles.push(Cycle {
                nodes,
                area,
                component,
            });
        }
        cycles
    }

    /// Connected component id per node
    fn components(&self) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..self.nodes.len()).collect();
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }
        for edge in self.edges.iter().filter(|e| e.active) {
            let a = find(&mut parent, edge.from);
            let b = find(&mut parent, edge.to);
            if a != b {
                parent[a] = b;
            }
        }
        (0..self.nodes.len()).map(|i| find(&mut parent, i)).collect()
    }

    /// A point just left of the longest edge of a face cycle
    fn sample_point(&self, cycle: &Cycle) -> Option<Point2<f64>> {
        let n = cycle.nodes.len();
        let (a, b) = (0..n)
            .map(|i| {
                (
                    self.nodes[cycle.nodes[i]].position,
                    self.nodes[cycle.nodes[(i + 1) % n]].position,
                )
            })
            .max_by(|x, y| (x.1 - x.0).norm().total_cmp(&(y.1 - y.0).norm()))?;
        let direction = b - a;
        let length = direction.norm();
        if length <= 0.0 {
            return None;
        }
        let left = Vector2::new(-direction.y, direction.x) / length;
        let width = cycle.area.abs() / perimeter(self, cycle).max(f64::EPSILON);
        let offset = (self.tolerance * 0.1).min(width * 0.25).min(length * 0.25);
        Some(nalgebra::center(&a, &b) + left * offset)
    }

    /// Convert the kept faces to ring groups, attaching nested components
    fn assemble(&self, cycles: &[Cycle], keep: &[bool], min_area: f64) -> Vec<RingGroup> {
        let faces: Vec<usize> = (0..cycles.len())
            .filter(|&i| cycles[i].area > min_area)
            .collect();
        let outer: Vec<usize> = (0..cycles.len())
            .filter(|&i| cycles[i].area < -min_area)
            .collect();

        let mut groups: FxHashMap<usize, RingGroup> = FxHashMap::default();
        for &f in &faces {
            if keep[f] {
                groups.insert(f, RingGroup::new(self.cycle_ring(&cycles[f])));
            }
        }

        for &o in &outer {
            let cycle = &cycles[o];
            let sample = self.nodes[cycle.nodes[0]].position;
            let container = faces
                .iter()
                .copied()
                .filter(|&f| cycles[f].component != cycle.component)
                .filter(|&f| self.cycle_ring(&cycles[f]).contains_point_xy(&sample))
                .min_by(|&a, &b| cycles[a].area.total_cmp(&cycles[b].area));
            if let Some(group) = container.and_then(|f| groups.get_mut(&f)) {
                group.interiors.push(self.cycle_ring(cycle));
            }
        }

        let mut result: Vec<(usize, RingGroup)> = groups.into_iter().collect();
        result.sort_by_key(|(f, _)| *f);
        result.into_iter().map(|(_, g)| g).collect()
    }

    fn cycle_ring(&self, cycle: &Cycle) -> Ring {
        Ring {
            points: cycle.nodes.iter().map(|&n| self.point3(n)).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct Cycle {
    nodes: Vec<usize>,
    area: f64,
    component: usize,
}

fn vertex_origin(kind: SegmentKind, z_options: ZOptions) -> ZOrigin {
    match kind {
        SegmentKind::Boundary => ZOrigin::Vertex,
        SegmentKind::Cut if z_options.keep_cut_z => ZOrigin::CutLine,
        SegmentKind::Cut => ZOrigin::Undefined,
    }
}

fn split_origin(kind: SegmentKind, z_options: ZOptions) -> ZOrigin {
    match kind {
        SegmentKind::Boundary if z_options.interpolate_boundary_z => ZOrigin::Interpolated,
        SegmentKind::Boundary => ZOrigin::Undefined,
        SegmentKind::Cut if z_options.keep_cut_z => ZOrigin::CutLine,
        SegmentKind::Cut => ZOrigin::Undefined,
    }
}

fn signed_area<'a>(points: impl Iterator<Item = &'a Point2<f64>>) -> f64 {
    let pts: SmallVec<[Point2<f64>; 16]> = points.copied().collect();
    let n = pts.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i].x * pts[j].y - pts[j].x * pts[i].y;
    }
    area * 0.5
}

fn perimeter(graph: &PlanarGraph, cycle: &Cycle) -> f64 {
    let n = cycle.nodes.len();
    (0..n)
        .map(|i| {
            (graph.nodes[cycle.nodes[(i + 1) % n]].position - graph.nodes[cycle.nodes[i]].position)
                .norm()
        })
        .sum()
}

fn ring_segments(rings: &[&Ring]) -> Vec<InputSegment> {
    rings
        .iter()
        .flat_map(|ring| {
            ring.segments().map(|(a, b)| InputSegment {
                start: *a,
                end: *b,
                kind: SegmentKind::Boundary,
            })
        })
        .collect()
}

fn even_odd_contains(rings: &[&Ring], p: &Point2<f64>) -> bool {
    rings.iter().filter(|r| r.contains_point_xy(p)).count() % 2 == 1
}

fn min_face_area(tolerance: f64) -> f64 {
    (tolerance * tolerance * 0.5).max(1e-12)
}

/// Split the area bounded by `rings` (even-odd) along the cut paths.
///
/// Returns the resulting faces as ring groups: counter-clockwise exteriors,
/// clockwise holes. A single result means the cut did not divide the area.
/// Cut path portions outside the area or ending inside it are ignored.
pub fn split_rings(
    rings: &[&Ring],
    cut_paths: &[Path],
    tolerance: f64,
    z_options: ZOptions,
) -> Vec<RingGroup> {
    let mut segments = ring_segments(rings);
    for path in cut_paths {
        segments.extend(path.segments().map(|(a, b)| InputSegment {
            start: *a,
            end: *b,
            kind: SegmentKind::Cut,
        }));
    }

    let mut graph = PlanarGraph::build(&segments, tolerance, z_options);

    for index in 0..graph.edges.len() {
        let edge = &graph.edges[index];
        let active = if edge.boundary && edge.odd {
            true
        } else if edge.cut {
            even_odd_contains(rings, &graph.midpoint(edge))
        } else {
            false
        };
        graph.edges[index].active = active;
    }
    graph.prune_dangling();

    let cycles = graph.trace_faces();
    let keep: Vec<bool> = cycles
        .iter()
        .map(|cycle| {
            cycle.area > 0.0
                && graph
                    .sample_point(cycle)
                    .map_or(false, |p| even_odd_contains(rings, &p))
        })
        .collect();

    let min_area = min_face_area(graph.tolerance);
    graph.assemble(&cycles, &keep, min_area)
}

/// Resolve self-intersections and overlaps of `rings` under the even-odd
/// rule. Split points get interpolated Z values.
pub fn simplify_rings(rings: &[&Ring], tolerance: f64) -> Vec<RingGroup> {
    let segments = ring_segments(rings);
    let z_options = ZOptions {
        keep_cut_z: false,
        interpolate_boundary_z: true,
    };
    let mut graph = PlanarGraph::build(&segments, tolerance, z_options);
    for edge in &mut graph.edges {
        edge.active = edge.boundary && edge.odd;
    }
    graph.prune_dangling();

    let cycles = graph.trace_faces();
    let keep: Vec<bool> = cycles
        .iter()
        .map(|cycle| {
            cycle.area > 0.0
                && graph
                    .sample_point(cycle)
                    .map_or(false, |p| even_odd_contains(rings, &p))
        })
        .collect();

    let min_area = min_face_area(graph.tolerance);
    graph.assemble(&cycles, &keep, min_area)
}

/// Whether any two boundary segments of the rings cross or overlap other
/// than at shared consecutive vertices
pub fn has_self_intersections(rings: &[&Ring], tolerance: f64) -> bool {
    let segments = ring_segments(rings);
    let graph = PlanarGraph::build(&segments, tolerance, ZOptions::default());
    let vertex_count: usize = rings.iter().map(|r| r.len()).sum();

    // A simple set of rings nodes to exactly its vertices with one edge each
    let mut degree = vec![0usize; graph.nodes.len()];
    for edge in &graph.edges {
        degree[edge.from] += 1;
        degree[edge.to] += 1;
    }
    graph.nodes.len() != vertex_count
        || graph.edges.len() != vertex_count
        || graph.edges.iter().any(|e| !e.odd)
        || degree.iter().any(|&d| d != 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 0.001;

    fn square() -> Ring {
        Ring::from_xyz(&[
            (100.0, 100.0, 10.0),
            (200.0, 100.0, 10.0),
            (200.0, 200.0, 20.0),
            (100.0, 200.0, 20.0),
        ])
    }

    fn area(groups: &[RingGroup]) -> f64 {
        groups.iter().map(RingGroup::area).sum()
    }

    #[test]
    fn test_split_square_by_line() {
        let ring = square();
        let cut = Path::from_xy(&[(175.0, 250.0), (175.0, 50.0)]);
        let pieces = split_rings(&[&ring], &[cut], TOL, ZOptions::default());
        assert_eq!(pieces.len(), 2);
        assert!((area(&pieces) - 10_000.0).abs() < 1e-6);
        let mut areas: Vec<f64> = pieces.iter().map(RingGroup::area).collect();
        areas.sort_by(f64::total_cmp);
        assert!((areas[0] - 2500.0).abs() < 1e-6);
        assert!((areas[1] - 7500.0).abs() < 1e-6);
        assert!(pieces.iter().all(|g| !g.exterior.is_clockwise()));
    }

    #[test]
    fn test_split_points_have_undefined_z_unless_requested() {
        let ring = square();
        let cut = Path::from_xyz(&[(175.0, 250.0, 99.0), (175.0, 50.0, 99.0)]);
        let pieces = split_rings(&[&ring], &[cut.clone()], TOL, ZOptions::default());
        assert!(pieces.iter().all(RingGroup::has_undefined_z));

        let keep = ZOptions {
            keep_cut_z: true,
            interpolate_boundary_z: false,
        };
        let pieces = split_rings(&[&ring], &[cut], TOL, keep);
        for piece in &pieces {
            assert!(!piece.has_undefined_z());
            assert!(piece.exterior.points.iter().any(|p| p.z == 99.0));
        }
    }

    #[test]
    fn test_dangling_cut_does_not_split() {
        let ring = square();
        let cut = Path::from_xy(&[(150.0, 250.0), (150.0, 150.0)]);
        let pieces = split_rings(&[&ring], &[cut], TOL, ZOptions::default());
        assert_eq!(pieces.len(), 1);
        assert!((pieces[0].area() - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_closed_cut_inside_creates_island() {
        let ring = square();
        let cut = Path::from_xy(&[
            (120.0, 120.0),
            (140.0, 120.0),
            (140.0, 140.0),
            (120.0, 140.0),
            (120.0, 120.0),
        ]);
        let pieces = split_rings(&[&ring], &[cut], TOL, ZOptions::default());
        assert_eq!(pieces.len(), 2);
        let with_hole = pieces.iter().find(|g| !g.interiors.is_empty()).unwrap();
        assert!((with_hole.area() - 9600.0).abs() < 1e-6);
        assert!(with_hole.interiors[0].is_clockwise());
    }

    #[test]
    fn test_hole_is_kept_in_its_piece() {
        let ring = square();
        let hole = Ring::from_xy(&[(110.0, 110.0), (110.0, 120.0), (120.0, 120.0), (120.0, 110.0)]);
        let cut = Path::from_xy(&[(175.0, 250.0), (175.0, 50.0)]);
        let pieces = split_rings(&[&ring, &hole], &[cut], TOL, ZOptions::default());
        assert_eq!(pieces.len(), 2);
        assert!((area(&pieces) - 9900.0).abs() < 1e-6);
        assert_eq!(pieces.iter().map(|g| g.interiors.len()).sum::<usize>(), 1);
    }

    #[test]
    fn test_cut_along_existing_hole_does_not_split() {
        let ring = square();
        let hole = Ring::from_xy(&[(110.0, 110.0), (110.0, 120.0), (120.0, 120.0), (120.0, 110.0)]);
        let cut = Path::from_xy(&[
            (110.0, 110.0),
            (110.0, 120.0),
            (120.0, 120.0),
            (120.0, 110.0),
            (110.0, 110.0),
        ]);
        let pieces = split_rings(&[&ring, &hole], &[cut], TOL, ZOptions::default());
        assert_eq!(pieces.len(), 1);
    }

    #[test]
    fn test_simplify_bow_tie() {
        let bow_tie = Ring::from_xyz(&[
            (0.0, 0.0, 0.0),
            (10.0, 10.0, 10.0),
            (10.0, 0.0, 10.0),
            (0.0, 10.0, 0.0),
        ]);
        let groups = simplify_rings(&[&bow_tie], TOL);
        assert_eq!(groups.len(), 2);
        assert!((area(&groups) - 50.0).abs() < 1e-9);

        // The crossing point gets an interpolated Z
        let center = groups[0]
            .exterior
            .points
            .iter()
            .find(|p| (p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9)
            .unwrap();
        assert!((center.z - 5.0).abs() < 1e-9);
        assert!(has_self_intersections(&[&bow_tie], TOL));
        assert!(!has_self_intersections(&[&square()], TOL));
    }
}
