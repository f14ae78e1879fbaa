//! Pluggable unfolding policies.
//!
//! The growth drivers and the sheet builder consult three kinds of policy
//! objects, registered as ordered collections before a run:
//!
//! - [`EdgeFilter`]: restricts which frontier edges may be grown from.
//!   Filters compose with logical AND; an edge passes only if every
//!   registered filter accepts it.
//! - [`PolygonScorer`]: ranks candidate seed polygons. Scores from all
//!   registered scorers are averaged arithmetically.
//! - [`FlattenConstraint`]: accepts or rejects a candidate placement.
//!   Constraints compose with logical AND, must be side-effect-free, and
//!   may only observe already-committed state plus the candidate view.
//!
//! All three traits are implemented for plain closures, so ad-hoc policies
//! can be registered without a named type:
//!
//! ```
//! use unfurl::algo::flatten::{EdgeContext, EdgeFilter};
//!
//! let no_long_edges = |ctx: &EdgeContext<'_>| ctx.segment.edge_length(&ctx.edge) < 10.0;
//! let filter: &dyn EdgeFilter = &no_long_edges;
//! ```

use nalgebra::Point2;

use crate::mesh::{Edge, Polygon, Segment};

/// Context handed to an [`EdgeFilter`]: one frontier edge of the current
/// sheet plus the source geometry.
#[derive(Debug, Clone, Copy)]
pub struct EdgeContext<'a> {
    /// The source geometry.
    pub segment: &'a Segment,
    /// The original 3D edge under consideration.
    pub edge: Edge,
}

/// Restricts which frontier edges the growth driver may grow from.
pub trait EdgeFilter: Send + Sync {
    /// Return `true` to allow growth across `ctx.edge`.
    fn accepts(&self, ctx: &EdgeContext<'_>) -> bool;
}

impl<F> EdgeFilter for F
where
    F: Fn(&EdgeContext<'_>) -> bool + Send + Sync,
{
    fn accepts(&self, ctx: &EdgeContext<'_>) -> bool {
        self(ctx)
    }
}

/// Context handed to a [`PolygonScorer`]: one candidate seed polygon plus
/// the source geometry.
#[derive(Debug, Clone, Copy)]
pub struct PolygonContext<'a> {
    /// The source geometry.
    pub segment: &'a Segment,
    /// The polygon being scored.
    pub polygon: &'a Polygon,
}

/// Ranks candidate seed polygons; higher scores seed first.
pub trait PolygonScorer: Send + Sync {
    /// Score `ctx.polygon`. Higher is better.
    fn score(&self, ctx: &PolygonContext<'_>) -> f64;
}

impl<F> PolygonScorer for F
where
    F: Fn(&PolygonContext<'_>) -> f64 + Send + Sync,
{
    fn score(&self, ctx: &PolygonContext<'_>) -> f64 {
        self(ctx)
    }
}

/// A read-only view of a placement under evaluation, handed to
/// [`FlattenConstraint`]s before the sheet builder commits anything.
///
/// The anchor points are already part of the sheet; the generated points
/// are the freshly triangulated positions for the polygon's remaining
/// vertices, in loop order starting after the anchor pair.
#[derive(Debug, Clone, Copy)]
pub struct PlacementCandidate<'a> {
    /// The source geometry.
    pub segment: &'a Segment,
    /// The polygon being placed.
    pub polygon: &'a Polygon,
    /// The two already-placed anchor points, in the rotated loop order.
    pub anchor: [Point2<f64>; 2],
    /// Newly computed positions for the non-anchor vertices, in loop order.
    pub generated: &'a [Point2<f64>],
    /// All committed 2D points of the sheet so far.
    pub points: &'a [Point2<f64>],
    /// The committed boundary: (original edge, placed edge) pairs. Placed
    /// edges index into [`points`](Self::points).
    pub boundary: &'a [(Edge, Edge)],
}

impl<'a> PlacementCandidate<'a> {
    /// The candidate polygon's full 2D loop: anchor pair followed by the
    /// generated points.
    pub fn loop_points(&self) -> Vec<Point2<f64>> {
        let mut pts = Vec::with_capacity(2 + self.generated.len());
        pts.push(self.anchor[0]);
        pts.push(self.anchor[1]);
        pts.extend_from_slice(self.generated);
        pts
    }

    /// The candidate loop's edges as 2D point pairs, including the
    /// wrap-around edge.
    pub fn loop_segments(&self) -> Vec<(Point2<f64>, Point2<f64>)> {
        let pts = self.loop_points();
        let n = pts.len();
        (0..n).map(|i| (pts[i], pts[(i + 1) % n])).collect()
    }

    /// Resolve a committed boundary entry to its 2D endpoints.
    #[inline]
    pub fn boundary_segment(&self, entry: &(Edge, Edge)) -> (Point2<f64>, Point2<f64>) {
        (self.points[entry.1.a()], self.points[entry.1.b()])
    }
}

/// Accepts or rejects a candidate placement.
///
/// Implementations must be pure: no mutation of shared state, no
/// observation of anything beyond the candidate view. The sheet builder
/// commits a placement only after every registered constraint accepts it.
pub trait FlattenConstraint: Send + Sync {
    /// Return `true` to accept the placement.
    fn accepts(&self, candidate: &PlacementCandidate<'_>) -> bool;
}

impl<F> FlattenConstraint for F
where
    F: Fn(&PlacementCandidate<'_>) -> bool + Send + Sync,
{
    fn accepts(&self, candidate: &PlacementCandidate<'_>) -> bool {
        self(candidate)
    }
}
