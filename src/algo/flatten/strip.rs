//! Strip unfolding: linear chains of adjacent polygons.
//!
//! The [`StripUnroller`] is an alternate growth driver. Instead of growing
//! a frontier in all directions, it pre-selects a linear chain ("strip")
//! of mutually edge-adjacent polygons with a directional-alignment
//! heuristic, then feeds the chain through the same [`SheetBuilder`]
//! contract as the frontier driver. Strips suit models that are cut from
//! long narrow stock, and their boundary edges carry [`StripEdgeKind`]
//! tags that downstream edge filters can key on.

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::{Point3, Vector3};

use crate::algo::progress::{CancelToken, Progress};
use crate::error::{Result, UnfoldError};
use crate::mesh::{Edge, Segment};

use super::policy::FlattenConstraint;
use super::sheet::SheetBuilder;
use super::unroller::{neighbor_index, remove_polygon};
use super::FlattenedGeometry;

/// Classification of a strip sheet's boundary edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripEdgeKind {
    /// An un-shared boundary edge of the strip's first or last polygon.
    End,
    /// A boundary edge along the strip's flanks.
    Side,
    /// A chain-internal edge whose two placed images did not coincide, so
    /// both remain on the boundary.
    Interior,
}

/// One finished strip: the flattened sheet plus per-boundary-edge tags
/// keyed by the original 3D edge.
#[derive(Debug)]
pub struct StripSheet {
    /// The flattened chain.
    pub geometry: FlattenedGeometry,
    /// Kind tag for every boundary edge, keyed by original edge.
    pub edge_kinds: HashMap<Edge, StripEdgeKind>,
}

/// Strip-based unfolding driver.
///
/// # Example
///
/// ```no_run
/// use unfurl::algo::flatten::StripUnroller;
/// use unfurl::mesh::Segment;
/// use std::sync::Arc;
///
/// # fn segment() -> Arc<Segment> { unimplemented!() }
/// let segment: Arc<Segment> = segment();
/// let strips = StripUnroller::new().unroll(&segment).unwrap();
/// ```
#[derive(Default)]
pub struct StripUnroller {
    constraints: Vec<Arc<dyn FlattenConstraint>>,
    progress: Progress,
    cancel: CancelToken,
}

impl StripUnroller {
    /// Create a driver with no constraints registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flatten constraint (AND-composed with earlier ones).
    pub fn with_constraint(mut self, constraint: Arc<dyn FlattenConstraint>) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Set the progress reporter.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Set the cooperative cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Unfold the whole segment into strips.
    ///
    /// Each strip starts at an "end" polygon (maximum count of edges with
    /// no remaining neighbor) and extends along the best-aligned adjacent
    /// polygon until no viable continuation remains. A constraint
    /// rejection or a triangulation failure terminates the strip; the
    /// unplaced polygon stays in the pool and starts a later strip.
    ///
    /// # Errors
    ///
    /// [`UnfoldError::Cancelled`] on cancellation; geometric errors from a
    /// strip's seed placement propagate.
    pub fn unroll(&self, segment: &Arc<Segment>) -> Result<Vec<StripSheet>> {
        let total = segment.polygons().len();
        let mut neighbors = neighbor_index(segment);
        let mut remaining = vec![true; total];
        let mut remaining_count = total;

        let mut strips = Vec::new();

        while remaining_count > 0 {
            if self.cancel.is_cancelled() {
                return Err(UnfoldError::Cancelled);
            }

            let first = select_end_polygon(segment, &neighbors, &remaining).ok_or_else(|| {
                UnfoldError::InvalidState("no strip seed among remaining polygons".into())
            })?;

            let mut builder =
                SheetBuilder::with_constraints(Arc::clone(segment), &self.constraints);
            builder.place(&segment.polygons()[first])?;
            remove_polygon(&mut neighbors, &mut remaining, &mut remaining_count, segment, first);

            let mut chain = vec![first];
            let mut shared = Vec::new();

            // Second polygon: the neighbor of the first that itself has
            // the most free edges.
            if let Some((second, entry)) = select_second(segment, &neighbors, first) {
                match builder.place(&segment.polygons()[second]) {
                    Ok(outcome) if outcome.is_placed() => {
                        remove_polygon(
                            &mut neighbors,
                            &mut remaining,
                            &mut remaining_count,
                            segment,
                            second,
                        );
                        chain.push(second);
                        shared.push(entry);

                        self.extend_chain(
                            segment,
                            &mut builder,
                            &mut neighbors,
                            &mut remaining,
                            &mut remaining_count,
                            &mut chain,
                            &mut shared,
                        )?;
                    }
                    Ok(_) | Err(UnfoldError::TriangulationFailed { .. }) => {}
                    Err(e) => return Err(e),
                }
            }

            self.progress
                .report(total - remaining_count, total, "strip unrolling");

            let edge_kinds = classify_boundary(segment, &builder, &chain, &shared);
            strips.push(StripSheet {
                geometry: builder.finish(),
                edge_kinds,
            });
        }

        Ok(strips)
    }

    /// Extend the chain past its second polygon until no continuation
    /// remains viable.
    #[allow(clippy::too_many_arguments)]
    fn extend_chain(
        &self,
        segment: &Arc<Segment>,
        builder: &mut SheetBuilder<'_>,
        neighbors: &mut HashMap<Edge, Vec<usize>>,
        remaining: &mut [bool],
        remaining_count: &mut usize,
        chain: &mut Vec<usize>,
        shared: &mut Vec<Edge>,
    ) -> Result<()> {
        let mut prev = chain[1];
        let mut entry_edge = shared[0];
        // Initial chain direction: from the first polygon's centroid to
        // the first shared edge.
        let mut direction =
            segment.edge_midpoint(&entry_edge) - polygon_centroid(segment, chain[0]);

        loop {
            if self.cancel.is_cancelled() {
                return Err(UnfoldError::Cancelled);
            }

            let Some((next, exit_edge)) =
                select_continuation(segment, neighbors, prev, entry_edge, direction)
            else {
                break;
            };

            match builder.place(&segment.polygons()[next]) {
                Ok(outcome) if outcome.is_placed() => {
                    remove_polygon(neighbors, remaining, remaining_count, segment, next);
                    direction =
                        segment.edge_midpoint(&exit_edge) - segment.edge_midpoint(&entry_edge);
                    entry_edge = exit_edge;
                    prev = next;
                    chain.push(next);
                    shared.push(exit_edge);
                }
                Ok(_) | Err(UnfoldError::TriangulationFailed { .. }) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for StripUnroller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripUnroller")
            .field("constraints", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

/// Number of the polygon's edges with no remaining neighbor besides the
/// polygon itself.
fn free_edge_count(
    segment: &Segment,
    neighbors: &HashMap<Edge, Vec<usize>>,
    polygon: usize,
) -> usize {
    segment.polygons()[polygon]
        .edges()
        .iter()
        .filter(|e| {
            neighbors
                .get(e)
                .map_or(true, |list| list.iter().all(|&pi| pi == polygon))
        })
        .count()
}

/// The remaining polygon with the most free edges (an "end" of the mesh).
fn select_end_polygon(
    segment: &Segment,
    neighbors: &HashMap<Edge, Vec<usize>>,
    remaining: &[bool],
) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (pi, _) in remaining.iter().enumerate().filter(|(_, &r)| r) {
        let free = free_edge_count(segment, neighbors, pi);
        if best.map_or(true, |(_, b)| free > b) {
            best = Some((pi, free));
        }
    }
    best.map(|(pi, _)| pi)
}

/// Among the first polygon's neighbors, the one with the most free edges,
/// together with the edge it attaches through.
fn select_second(
    segment: &Segment,
    neighbors: &HashMap<Edge, Vec<usize>>,
    first: usize,
) -> Option<(usize, Edge)> {
    let mut best: Option<(usize, Edge, usize)> = None;
    for edge in segment.polygons()[first].edges() {
        let Some(&candidate) = neighbors.get(&edge).and_then(|list| list.first()) else {
            continue;
        };
        let free = free_edge_count(segment, neighbors, candidate);
        if best.map_or(true, |(_, _, b)| free > b) {
            best = Some((candidate, edge, free));
        }
    }
    best.map(|(pi, edge, _)| (pi, edge))
}

/// Among the previous polygon's un-shared edges with a remaining neighbor,
/// the one whose midpoint-to-midpoint direction best continues the chain.
fn select_continuation(
    segment: &Segment,
    neighbors: &HashMap<Edge, Vec<usize>>,
    prev: usize,
    entry_edge: Edge,
    direction: Vector3<f64>,
) -> Option<(usize, Edge)> {
    let entry_mid = segment.edge_midpoint(&entry_edge);
    let mut best: Option<(usize, Edge, f64)> = None;

    for edge in segment.polygons()[prev].edges() {
        if edge == entry_edge {
            continue;
        }
        let Some(&candidate) = neighbors.get(&edge).and_then(|list| list.first()) else {
            continue;
        };
        let score = (segment.edge_midpoint(&edge) - entry_mid).dot(&direction);
        if best.map_or(true, |(_, _, s)| score > s) {
            best = Some((candidate, edge, score));
        }
    }

    best.map(|(pi, edge, _)| (pi, edge))
}

/// Mean of a polygon's 3D vertex positions.
fn polygon_centroid(segment: &Segment, polygon: usize) -> Point3<f64> {
    let poly = &segment.polygons()[polygon];
    let sum = poly
        .points()
        .iter()
        .fold(Vector3::zeros(), |acc, &v| acc + segment.vertices()[v].coords);
    Point3::from(sum / poly.len() as f64)
}

/// Tag every boundary edge of the finished strip.
fn classify_boundary(
    segment: &Segment,
    builder: &SheetBuilder<'_>,
    chain: &[usize],
    shared: &[Edge],
) -> HashMap<Edge, StripEdgeKind> {
    let first_poly = &segment.polygons()[chain[0]];
    let last_poly = &segment.polygons()[*chain.last().expect("chain is never empty")];

    let mut kinds = HashMap::new();
    for (original, _) in builder.boundary() {
        let kind = if shared.contains(original) {
            StripEdgeKind::Interior
        } else if first_poly.contains_edge(original) || last_poly.contains_edge(original) {
            StripEdgeKind::End
        } else {
            StripEdgeKind::Side
        };
        kinds.insert(*original, kind);
    }
    kinds
}
