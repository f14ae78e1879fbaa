//! Incremental planar embedding of one sheet.
//!
//! A [`SheetBuilder`] owns the growing state of a single flat layout: the
//! append-only 2D point arena, the open-edge table (the attachable
//! frontier), the boundary set (the current outer perimeter), and the
//! vertex merge map (all 2D images created for each 3D vertex). Polygons
//! are placed one at a time; each placement either commits atomically or
//! leaves every table untouched.

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::{Point2, Vector2};

use crate::error::{Result, UnfoldError};
use crate::mesh::{Edge, Polygon, Segment};

use super::math;
use super::policy::{FlattenConstraint, PlacementCandidate};
use super::{FlattenedGeometry, PlacedPolygon};

/// Distance below which two 2D points are considered the same vertex
/// image, in geometry units.
pub const MERGE_EPSILON: f64 = 0.01;

/// Outcome of a placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The polygon was committed to the sheet.
    Placed,
    /// A constraint rejected the placement (or no valid anchor edge was
    /// found). Nothing was committed; the anchor edge, if any, is no
    /// longer attachable for this sheet.
    Rejected,
}

impl Placement {
    /// Whether the polygon was committed.
    #[inline]
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed)
    }
}

/// One entry of the open-edge table.
#[derive(Debug, Clone)]
struct OpenEdge {
    /// The original 3D edge, stored in the direction it was first walked.
    original: Edge,
    /// The placed 2D edge (point-arena indices), aligned with `original`.
    placed: Edge,
    /// Still an attachable frontier edge. Edges without a computable
    /// outward normal enter the table invalid; otherwise the flag is
    /// cleared once both incident polygons are placed or after a
    /// constraint rejection.
    valid: bool,
}

static NO_CONSTRAINTS: &[Arc<dyn FlattenConstraint>] = &[];

/// The incremental embedding state machine for one sheet.
///
/// A builder is created per sheet, mutated polygon by polygon through
/// [`place`](Self::place), and consumed once by [`finish`](Self::finish).
///
/// # Example
///
/// ```
/// use unfurl::algo::flatten::SheetBuilder;
/// use unfurl::mesh::{Polygon, Segment};
/// use nalgebra::{Point3, Vector3};
/// use std::sync::Arc;
///
/// let segment = Arc::new(Segment::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.5, 1.0, 0.0),
///     ],
///     vec![Vector3::z(); 3],
///     vec![Polygon::new(vec![0, 1, 2])],
/// ).unwrap());
///
/// let mut builder = SheetBuilder::new(Arc::clone(&segment));
/// let outcome = builder.place(&segment.polygons()[0]).unwrap();
/// assert!(outcome.is_placed());
///
/// let sheet = builder.finish();
/// assert_eq!(sheet.points.len(), 3);
/// ```
pub struct SheetBuilder<'a> {
    segment: Arc<Segment>,
    constraints: &'a [Arc<dyn FlattenConstraint>],
    points: Vec<Point2<f64>>,
    placed: Vec<PlacedPolygon>,
    open_edges: Vec<OpenEdge>,
    open_index: HashMap<Edge, usize>,
    boundary: Vec<(Edge, Edge)>,
    boundary_normals: HashMap<Edge, Vector2<f64>>,
    images: HashMap<usize, Vec<usize>>,
}

impl<'a> SheetBuilder<'a> {
    /// Create a builder with no flatten constraints.
    pub fn new(segment: Arc<Segment>) -> Self {
        Self::with_constraints(segment, NO_CONSTRAINTS)
    }

    /// Create a builder that validates every non-seed placement against
    /// the given constraints (logical AND).
    pub fn with_constraints(
        segment: Arc<Segment>,
        constraints: &'a [Arc<dyn FlattenConstraint>],
    ) -> Self {
        Self {
            segment,
            constraints,
            points: Vec::new(),
            placed: Vec::new(),
            open_edges: Vec::new(),
            open_index: HashMap::new(),
            boundary: Vec::new(),
            boundary_normals: HashMap::new(),
            images: HashMap::new(),
        }
    }

    /// Attempt to place one polygon into the sheet.
    ///
    /// The first edge of the polygon matching a currently-valid open edge
    /// becomes the anchor; the polygon's loop is re-oriented so the anchor
    /// comes first (reversed if the match is direction-flipped). With an
    /// empty sheet the anchor is synthesized at `(0,0)`–`(L,0)` where `L`
    /// is the true 3D edge length.
    ///
    /// Placement is all-or-nothing: a constraint rejection marks the
    /// anchor edge invalid and mutates nothing else.
    ///
    /// # Errors
    ///
    /// [`UnfoldError::TriangulationFailed`] if a vertex position cannot be
    /// constructed; [`UnfoldError::InvalidState`] on broken internal
    /// bookkeeping.
    pub fn place(&mut self, polygon: &Polygon) -> Result<Placement> {
        let anchor_idx = polygon.edges().iter().find_map(|e| {
            self.open_index
                .get(e)
                .copied()
                .filter(|&i| self.open_edges[i].valid)
        });

        let is_seed = self.open_edges.is_empty();
        if anchor_idx.is_none() && !is_seed {
            // Snapshot race in the driver: the edge this polygon was
            // reachable from went invalid mid-pass.
            return Ok(Placement::Rejected);
        }

        // Anchor endpoints: 3D vertex indices and 2D positions.
        let (a3, b3, pa, pb, outward) = match anchor_idx {
            Some(i) => {
                let entry = &self.open_edges[i];
                let pa = self.points[entry.placed.a()];
                let pb = self.points[entry.placed.b()];
                let outward = self
                    .boundary_normals
                    .get(&entry.placed)
                    .copied()
                    .ok_or_else(|| {
                        UnfoldError::InvalidState(format!(
                            "open edge ({}, {}) has no boundary normal",
                            entry.original.a(),
                            entry.original.b()
                        ))
                    })?;
                (entry.original.a(), entry.original.b(), pa, pb, outward)
            }
            None => {
                let a3 = polygon.points()[0];
                let b3 = polygon.points()[1];
                let length = self.segment.distance(a3, b3);
                (
                    a3,
                    b3,
                    Point2::origin(),
                    Point2::new(length, 0.0),
                    Vector2::new(0.0, 1.0),
                )
            }
        };

        let loop_order = rotate_loop(polygon.points(), a3, b3).ok_or_else(|| {
            UnfoldError::InvalidState(format!(
                "polygon does not contain its anchor edge ({a3}, {b3})"
            ))
        })?;

        // Triangulate every non-anchor vertex against the anchor edge,
        // using 3D distances from both anchor endpoints and the anchor's
        // outward normal to disambiguate the reflection.
        let ab = (pb - pa).norm();
        let mut generated = Vec::with_capacity(loop_order.len() - 2);
        for &v in &loop_order[2..] {
            let ac = self.segment.distance(a3, v);
            let bc = self.segment.distance(b3, v);
            let c = math::triangulate(pa, pb, outward, ab, bc, ac)
                .ok_or(UnfoldError::TriangulationFailed { a: a3, b: b3 })?;
            generated.push(c);
        }

        if let Some(i) = anchor_idx {
            if !self.constraints.is_empty() {
                let candidate = PlacementCandidate {
                    segment: &self.segment,
                    polygon,
                    anchor: [pa, pb],
                    generated: &generated,
                    points: &self.points,
                    boundary: &self.boundary,
                };
                if !self.constraints.iter().all(|c| c.accepts(&candidate)) {
                    self.open_edges[i].valid = false;
                    return Ok(Placement::Rejected);
                }
            }
        }

        // Sign reference for the outward normals of the new edges.
        let centroid = loop_centroid(pa, pb, &generated);

        // Resolve every loop vertex to a 2D point index, reusing an
        // existing image when one lies within the merge epsilon.
        let mut index_of: HashMap<usize, usize> = HashMap::with_capacity(loop_order.len());
        match anchor_idx {
            Some(i) => {
                let entry = &self.open_edges[i];
                index_of.insert(a3, entry.placed.a());
                index_of.insert(b3, entry.placed.b());
            }
            None => {
                index_of.insert(a3, self.merge_or_append(a3, pa));
                index_of.insert(b3, self.merge_or_append(b3, pb));
            }
        }
        for (&v, &pos) in loop_order[2..].iter().zip(generated.iter()) {
            index_of.insert(v, self.merge_or_append(v, pos));
        }

        // Walk the polygon's edges in original loop order and update the
        // open-edge table, boundary set, and boundary normal map.
        for (u, v) in polygon.vertex_pairs() {
            let e3 = Edge::new(u, v);
            let e2 = Edge::new(index_of[&u], index_of[&v]);

            match self.open_index.get(&e3).copied() {
                None => {
                    // A colinear polygon gives its edges no outward side;
                    // such an edge stays on the boundary but cannot anchor
                    // further growth.
                    let has_normal = self.insert_normal(e2, centroid);
                    self.open_index.insert(e3, self.open_edges.len());
                    self.open_edges.push(OpenEdge {
                        original: e3,
                        placed: e2,
                        valid: has_normal,
                    });
                    self.boundary.push((e3, e2));
                }
                Some(i) => {
                    let recorded = self.open_edges[i].placed;
                    if recorded == e2 {
                        // Second incident polygon shares the same image:
                        // the edge becomes interior.
                        if let Some(pos) = self
                            .boundary
                            .iter()
                            .position(|(o, p)| *o == e3 && *p == recorded)
                        {
                            self.boundary.remove(pos);
                        }
                        self.boundary_normals.remove(&recorded);
                    } else {
                        // The new image differs: the surface is not
                        // developable here, both images stay on the
                        // boundary. The recorded image keeps its normal.
                        self.boundary.push((e3, e2));
                        if !self.boundary_normals.contains_key(&e2) {
                            self.insert_normal(e2, centroid);
                        }
                    }
                    self.open_edges[i].valid = false;
                }
            }
        }

        let placed_loop = Polygon::new(
            polygon.points().iter().map(|v| index_of[v]).collect(),
        );
        self.placed.push(PlacedPolygon {
            original: polygon.clone(),
            placed: placed_loop,
        });

        Ok(Placement::Placed)
    }

    /// Reuse an existing 2D image of `vertex` within [`MERGE_EPSILON`] of
    /// `position`, or append a new point and register it.
    fn merge_or_append(&mut self, vertex: usize, position: Point2<f64>) -> usize {
        if let Some(candidates) = self.images.get(&vertex) {
            for &idx in candidates {
                if (self.points[idx] - position).norm() <= MERGE_EPSILON {
                    return idx;
                }
            }
        }
        let idx = self.points.len();
        self.points.push(position);
        self.images.entry(vertex).or_default().push(idx);
        idx
    }

    /// Record the outward normal for a placed boundary edge. Returns
    /// `false` when the edge has no outward side (the constructed loop is
    /// degenerate and its centroid lies on the edge's line).
    fn insert_normal(&mut self, placed: Edge, centroid: Point2<f64>) -> bool {
        let a = self.points[placed.a()];
        let b = self.points[placed.b()];
        match math::outward_normal(a, b, centroid) {
            Some(n) => {
                self.boundary_normals.insert(placed, n);
                true
            }
            None => false,
        }
    }

    /// The original 3D edges that are still attachable, in table order.
    pub fn valid_open_edges(&self) -> Vec<Edge> {
        self.open_edges
            .iter()
            .filter(|e| e.valid)
            .map(|e| e.original)
            .collect()
    }

    /// Whether `edge` is a currently-valid frontier edge.
    pub fn is_edge_valid(&self, edge: &Edge) -> bool {
        self.open_index
            .get(edge)
            .is_some_and(|&i| self.open_edges[i].valid)
    }

    /// The committed 2D points so far.
    #[inline]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// The committed boundary: (original edge, placed edge) pairs.
    #[inline]
    pub fn boundary(&self) -> &[(Edge, Edge)] {
        &self.boundary
    }

    /// The committed (original, placed) polygon pairs.
    #[inline]
    pub fn placed_polygons(&self) -> &[PlacedPolygon] {
        &self.placed
    }

    /// Number of polygons committed so far.
    #[inline]
    pub fn num_placed(&self) -> usize {
        self.placed.len()
    }

    /// Whether nothing has been placed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// All 2D images recorded for a 3D vertex.
    pub fn vertex_images(&self, vertex: usize) -> &[usize] {
        self.images.get(&vertex).map_or(&[], Vec::as_slice)
    }

    /// Consume the builder into an immutable sheet.
    pub fn finish(self) -> FlattenedGeometry {
        let center = if self.points.is_empty() {
            Point2::origin()
        } else {
            let sum = self
                .points
                .iter()
                .fold(Vector2::zeros(), |acc, p| acc + p.coords);
            Point2::from(sum / self.points.len() as f64)
        };

        FlattenedGeometry {
            points: self.points,
            placed_polygons: self.placed,
            boundary_normals: self.boundary_normals,
            center,
            segment: self.segment,
        }
    }
}

impl std::fmt::Debug for SheetBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetBuilder")
            .field("points", &self.points.len())
            .field("placed", &self.placed.len())
            .field("open_edges", &self.open_edges.len())
            .field("boundary", &self.boundary.len())
            .finish_non_exhaustive()
    }
}

/// Rotate (and reverse, when the anchor is traversed backwards) a vertex
/// loop so it starts with `a3` followed by `b3`.
fn rotate_loop(points: &[usize], a3: usize, b3: usize) -> Option<Vec<usize>> {
    let n = points.len();
    let start = points.iter().position(|&v| v == a3)?;
    if points[(start + 1) % n] == b3 {
        return Some((0..n).map(|k| points[(start + k) % n]).collect());
    }

    let reversed: Vec<usize> = points.iter().rev().copied().collect();
    let start = reversed.iter().position(|&v| v == a3)?;
    if reversed[(start + 1) % n] == b3 {
        Some((0..n).map(|k| reversed[(start + k) % n]).collect())
    } else {
        None
    }
}

/// Average of the constructed loop points (anchor pair plus generated).
fn loop_centroid(pa: Point2<f64>, pb: Point2<f64>, generated: &[Point2<f64>]) -> Point2<f64> {
    let mut sum = pa.coords + pb.coords;
    for p in generated {
        sum += p.coords;
    }
    Point2::from(sum / (2 + generated.len()) as f64)
}
