//! Greedy frontier-growth unfolding across a whole polygon set.
//!
//! The [`Unroller`] drives a [`SheetBuilder`] over every polygon of a
//! segment: it seeds a sheet with the best-scored remaining polygon, grows
//! the sheet along its open-edge frontier (restricted by edge filters and
//! validated by flatten constraints), and splits into a fresh sheet
//! whenever growth stalls. Decisions are local and irrevocable: there is
//! no backtracking, and the number of sheets is not minimized.

use std::collections::HashMap;
use std::sync::Arc;

use crate::algo::progress::{CancelToken, Progress};
use crate::error::{Result, UnfoldError};
use crate::mesh::{Edge, Segment};

use super::policy::{
    EdgeContext, EdgeFilter, FlattenConstraint, PolygonContext, PolygonScorer,
};
use super::sheet::SheetBuilder;
use super::FlattenedGeometry;

/// Greedy unfolding driver.
///
/// Policies are registered in order before a run; filters and constraints
/// compose with logical AND, scorer values are averaged.
///
/// # Example
///
/// ```no_run
/// use unfurl::algo::flatten::Unroller;
/// use unfurl::mesh::Segment;
/// use std::sync::Arc;
///
/// # fn segment() -> Arc<Segment> { unimplemented!() }
/// let segment: Arc<Segment> = segment();
/// let sheets = Unroller::new().unroll(&segment).unwrap();
/// for sheet in &sheets {
///     println!("{} polygons, {} points", sheet.placed_polygons.len(), sheet.points.len());
/// }
/// ```
#[derive(Default)]
pub struct Unroller {
    edge_filters: Vec<Arc<dyn EdgeFilter>>,
    scorers: Vec<Arc<dyn PolygonScorer>>,
    constraints: Vec<Arc<dyn FlattenConstraint>>,
    progress: Progress,
    cancel: CancelToken,
}

impl Unroller {
    /// Create a driver with no policies registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an edge filter (AND-composed with earlier filters).
    pub fn with_edge_filter(mut self, filter: Arc<dyn EdgeFilter>) -> Self {
        self.edge_filters.push(filter);
        self
    }

    /// Register a polygon scorer (averaged with earlier scorers).
    pub fn with_scorer(mut self, scorer: Arc<dyn PolygonScorer>) -> Self {
        self.scorers.push(scorer);
        self
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

    /// Unfold the whole segment into one or more sheets.
    ///
    /// Progress is reported after every growth pass as
    /// `(placed, total)` polygon counts. Cancellation is polled once per
    /// pass and surfaces as [`UnfoldError::Cancelled`] with no partial
    /// result.
    ///
    /// # Errors
    ///
    /// [`UnfoldError::Cancelled`] on cancellation; geometric errors from
    /// the seed placement propagate. A triangulation failure during growth
    /// is not an error: the current sheet is finalized and unfolding
    /// continues from the remaining polygons.
    pub fn unroll(&self, segment: &Arc<Segment>) -> Result<Vec<FlattenedGeometry>> {
        let total = segment.polygons().len();
        let mut neighbors = neighbor_index(segment);
        let mut remaining = vec![true; total];
        let mut remaining_count = total;

        let mut sheets = Vec::new();

        while remaining_count > 0 {
            let seed = self.select_seed(segment, &remaining).ok_or_else(|| {
                UnfoldError::InvalidState("no seed among remaining polygons".into())
            })?;

            let mut builder =
                SheetBuilder::with_constraints(Arc::clone(segment), &self.constraints);
            builder.place(&segment.polygons()[seed])?;
            remove_polygon(&mut neighbors, &mut remaining, &mut remaining_count, segment, seed);

            loop {
                if self.cancel.is_cancelled() {
                    return Err(UnfoldError::Cancelled);
                }

                let frontier = self.filtered_frontier(segment, &builder);
                let mut progressed = false;
                let mut stalled = false;

                for edge in frontier {
                    // The pass iterates a snapshot; placements during the
                    // pass may have invalidated this edge already.
                    if !builder.is_edge_valid(&edge) {
                        continue;
                    }
                    let Some(&candidate) = neighbors.get(&edge).and_then(|list| list.first())
                    else {
                        continue;
                    };

                    match builder.place(&segment.polygons()[candidate]) {
                        Ok(outcome) if outcome.is_placed() => {
                            remove_polygon(
                                &mut neighbors,
                                &mut remaining,
                                &mut remaining_count,
                                segment,
                                candidate,
                            );
                            progressed = true;
                        }
                        Ok(_) => {}
                        Err(UnfoldError::TriangulationFailed { .. }) => {
                            // Unrecoverable for this sheet only: finalize
                            // and reseed from whatever remains.
                            stalled = true;
                            break;
                        }
                        Err(e) => return Err(e),
                    }
                }

                self.progress
                    .report(total - remaining_count, total, "unrolling");

                if stalled || !progressed {
                    break;
                }
            }

            sheets.push(builder.finish());
        }

        Ok(sheets)
    }

    /// Highest mean scorer value among remaining polygons; first remaining
    /// polygon when no scorers are registered. Ties keep the earlier
    /// polygon (strict-greater comparison).
    fn select_seed(&self, segment: &Segment, remaining: &[bool]) -> Option<usize> {
        if self.scorers.is_empty() {
            return remaining.iter().position(|&r| r);
        }

        let mut best: Option<(usize, f64)> = None;
        for (pi, _) in remaining.iter().enumerate().filter(|(_, &r)| r) {
            let ctx = PolygonContext {
                segment,
                polygon: &segment.polygons()[pi],
            };
            let sum: f64 = self.scorers.iter().map(|s| s.score(&ctx)).sum();
            let score = sum / self.scorers.len() as f64;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((pi, score));
            }
        }
        best.map(|(pi, _)| pi)
    }

    /// The sheet's currently-valid open edges that every registered edge
    /// filter accepts, in table order.
    fn filtered_frontier(&self, segment: &Segment, builder: &SheetBuilder<'_>) -> Vec<Edge> {
        builder
            .valid_open_edges()
            .into_iter()
            .filter(|&edge| {
                let ctx = EdgeContext { segment, edge };
                self.edge_filters.iter().all(|f| f.accepts(&ctx))
            })
            .collect()
    }
}

impl std::fmt::Debug for Unroller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unroller")
            .field("edge_filters", &self.edge_filters.len())
            .field("scorers", &self.scorers.len())
            .field("constraints", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

/// Map every edge to the polygons incident to it, in input order. Lists
/// may hold more than two entries for non-manifold input; only the first
/// entry is ever consulted when growing.
pub(crate) fn neighbor_index(segment: &Segment) -> HashMap<Edge, Vec<usize>> {
    let mut index: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (pi, poly) in segment.polygons().iter().enumerate() {
        for edge in poly.edges() {
            index.entry(edge).or_default().push(pi);
        }
    }
    index
}

/// Remove a placed polygon from the remaining pool and the neighbor index.
pub(crate) fn remove_polygon(
    neighbors: &mut HashMap<Edge, Vec<usize>>,
    remaining: &mut [bool],
    remaining_count: &mut usize,
    segment: &Segment,
    polygon: usize,
) {
    if !remaining[polygon] {
        return;
    }
    remaining[polygon] = false;
    *remaining_count -= 1;
    for edge in segment.polygons()[polygon].edges() {
        if let Some(list) = neighbors.get_mut(&edge) {
            list.retain(|&pi| pi != polygon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::flatten::PlacementCandidate;
    use crate::mesh::Polygon;
    use nalgebra::{Point3, Vector3};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn segment(vertices: Vec<Point3<f64>>, polygons: Vec<Polygon>) -> Arc<Segment> {
        let normals = vec![Vector3::z(); vertices.len()];
        Arc::new(Segment::new(vertices, normals, polygons).unwrap())
    }

    fn cube() -> Arc<Segment> {
        segment(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            vec![
                Polygon::new(vec![0, 1, 2, 3]), // bottom
                Polygon::new(vec![4, 5, 6, 7]), // top
                Polygon::new(vec![0, 1, 5, 4]), // front
                Polygon::new(vec![1, 2, 6, 5]), // right
                Polygon::new(vec![2, 3, 7, 6]), // back
                Polygon::new(vec![3, 0, 4, 7]), // left
            ],
        )
    }

    fn two_triangles() -> Arc<Segment> {
        segment(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![Polygon::new(vec![0, 1, 2]), Polygon::new(vec![1, 3, 2])],
        )
    }

    #[test]
    fn test_unroll_places_every_polygon() {
        let seg = cube();
        let sheets = Unroller::new().unroll(&seg).unwrap();

        let placed: usize = sheets.iter().map(|s| s.placed_polygons.len()).sum();
        assert_eq!(placed, 6);
        assert!(!sheets.is_empty());
        for sheet in &sheets {
            assert!(!sheet.placed_polygons.is_empty());
        }
    }

    #[test]
    fn test_unroll_single_connected_sheet() {
        // Without constraints nothing can reject a placement, so a
        // connected manifold set unrolls as one sheet.
        let seg = cube();
        let sheets = Unroller::new().unroll(&seg).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].placed_polygons.len(), 6);
    }

    #[test]
    fn test_rejecting_constraint_one_sheet_per_polygon() {
        let seg = cube();
        let sheets = Unroller::new()
            .with_constraint(Arc::new(|_: &PlacementCandidate<'_>| false))
            .unroll(&seg)
            .unwrap();

        // Seeds always commit; growth never does.
        assert_eq!(sheets.len(), 6);
        for sheet in &sheets {
            assert_eq!(sheet.placed_polygons.len(), 1);
        }
    }

    #[test]
    fn test_rejecting_edge_filter_one_sheet_per_polygon() {
        let seg = two_triangles();
        let sheets = Unroller::new()
            .with_edge_filter(Arc::new(|_: &EdgeContext<'_>| false))
            .unroll(&seg)
            .unwrap();
        assert_eq!(sheets.len(), 2);
    }

    #[test]
    fn test_scorer_selects_seed() {
        let seg = two_triangles();
        // Prefer the second polygon (contains vertex 3).
        let sheets = Unroller::new()
            .with_scorer(Arc::new(|ctx: &PolygonContext<'_>| {
                if ctx.polygon.points().contains(&3) {
                    1.0
                } else {
                    0.0
                }
            }))
            .with_constraint(Arc::new(|_: &PlacementCandidate<'_>| false))
            .unroll(&seg)
            .unwrap();

        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].placed_polygons[0].original.points(), &[1, 3, 2]);
    }

    #[test]
    fn test_determinism() {
        let seg = cube();
        let a = Unroller::new().unroll(&seg).unwrap();
        let b = Unroller::new().unroll(&seg).unwrap();

        assert_eq!(a.len(), b.len());
        for (sa, sb) in a.iter().zip(b.iter()) {
            assert_eq!(sa.points, sb.points);
            let pairs_a: Vec<_> = sa.placed_polygons.iter().map(|p| &p.placed).collect();
            let pairs_b: Vec<_> = sb.placed_polygons.iter().map(|p| &p.placed).collect();
            assert_eq!(pairs_a, pairs_b);
        }
    }

    #[test]
    fn test_cancellation_returns_no_partial_result() {
        let seg = cube();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = Unroller::new().with_cancel_token(cancel).unroll(&seg);
        assert!(matches!(result, Err(UnfoldError::Cancelled)));
    }

    #[test]
    fn test_progress_reported_per_pass() {
        let seg = cube();
        let reports = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&reports);
        let progress = Progress::new(move |current, total, _| {
            assert_eq!(total, 6);
            assert!(current <= total);
            seen.fetch_add(1, Ordering::Relaxed);
        });

        Unroller::new().with_progress(progress).unroll(&seg).unwrap();
        assert!(reports.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn test_non_manifold_edge_consults_first_neighbor_only() {
        // Three triangles fanning off the same edge (0, 1).
        let seg = segment(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(0.5, -1.0, 0.0),
                Point3::new(0.5, 0.0, 1.0),
            ],
            vec![
                Polygon::new(vec![0, 1, 2]),
                Polygon::new(vec![0, 3, 1]),
                Polygon::new(vec![0, 1, 4]),
            ],
        );

        let sheets = Unroller::new().unroll(&seg).unwrap();
        let placed: usize = sheets.iter().map(|s| s.placed_polygons.len()).sum();
        assert_eq!(placed, 3);
        // The surplus neighbor cannot attach through the exhausted edge
        // and ends up seeding its own sheet.
        assert_eq!(sheets.len(), 2);
    }

    #[test]
    fn test_colinear_polygon_stays_local_to_its_sheet() {
        // The first triangle is colinear (zero area), so no edge of its
        // sheet is attachable. That must route growth around it, not
        // abort the run: the neighbor reseeds into its own sheet.
        let seg = segment(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(1.5, 1.0, 0.0),
            ],
            vec![Polygon::new(vec![0, 1, 2]), Polygon::new(vec![1, 3, 2])],
        );

        let sheets = Unroller::new().unroll(&seg).unwrap();
        assert_eq!(sheets.len(), 2);
        let placed: usize = sheets.iter().map(|s| s.placed_polygons.len()).sum();
        assert_eq!(placed, 2);
    }

    #[test]
    fn test_neighbor_index_orders_by_input() {
        let seg = two_triangles();
        let index = neighbor_index(&seg);
        assert_eq!(index[&Edge::new(1, 2)], vec![0, 1]);
        assert_eq!(index[&Edge::new(0, 1)], vec![0]);
    }
}
