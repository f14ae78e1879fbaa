//! Mesh unfolding: flattening 3D polygon segments into 2D sheets.
//!
//! Unfolding lays a segment's polygons out in the plane one at a time,
//! preserving every edge length exactly. Each placed polygon is hinged on
//! an edge it shares with an already-placed neighbor, and its remaining
//! vertices are constructed by triangulation from the original 3D side
//! lengths. The result is a set of [`FlattenedGeometry`] sheets suitable
//! for laser cutting or papercraft, with fold edges interior to a sheet
//! and cut edges on its boundary.
//!
//! # Components
//!
//! - [`SheetBuilder`]: places one polygon at a time into a single sheet,
//!   maintaining the open-edge frontier, the boundary, and vertex merging.
//! - [`Unroller`]: the greedy growth driver. Seeds a sheet, grows it
//!   breadth-first across shared edges until no placement succeeds, then
//!   reseeds until every polygon is placed.
//! - [`StripUnroller`]: a chain-shaped variant that unfolds the segment
//!   into straight strips and classifies each strip's boundary edges.
//! - [`EdgeFilter`] / [`PolygonScorer`] / [`FlattenConstraint`]: pluggable
//!   policies controlling where sheets grow, where they seed, and which
//!   placements are acceptable. Built-ins live in [`constraints`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use unfurl::algo::flatten::{NonOverlappingConstraint, Unroller};
//! use unfurl::UnfoldError;
//! use unfurl::mesh::{Polygon, Segment};
//! use unfurl::nalgebra::{Point3, Vector3};
//!
//! // Two unit squares meeting at a right angle along the x axis.
//! let segment = Arc::new(Segment::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(1.0, 0.0, 1.0),
//!         Point3::new(0.0, 0.0, 1.0),
//!     ],
//!     vec![Vector3::z(); 6],
//!     vec![Polygon::new(vec![0, 1, 2, 3]), Polygon::new(vec![0, 5, 4, 1])],
//! )?);
//!
//! let sheets = Unroller::new()
//!     .with_constraint(Arc::new(NonOverlappingConstraint::new()))
//!     .unroll(&segment)?;
//!
//! // The fold flattens into a single 1x2 sheet.
//! assert_eq!(sheets.len(), 1);
//! assert_eq!(sheets[0].placed_polygons.len(), 2);
//! # Ok::<(), UnfoldError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::{Point2, Vector2};

use crate::mesh::{Edge, Polygon, Segment};

pub mod math;

mod constraints;
mod policy;
mod sheet;
mod strip;
mod unroller;

pub use constraints::{AreaScorer, MaxSpanConstraint, NonOverlappingConstraint};
pub use policy::{
    EdgeContext, EdgeFilter, FlattenConstraint, PlacementCandidate, PolygonContext,
    PolygonScorer,
};
pub use sheet::{Placement, SheetBuilder, MERGE_EPSILON};
pub use strip::{StripEdgeKind, StripSheet, StripUnroller};
pub use unroller::Unroller;

/// One polygon of a finished sheet: the original 3D polygon and its placed
/// 2D counterpart.
///
/// Both loops have the same length and the same cyclic orientation: the
/// `i`th placed point (an index into [`FlattenedGeometry::points`]) is the
/// 2D image of the `i`th original vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedPolygon {
    /// The polygon as it appears in the source segment, indexing 3D
    /// vertices.
    pub original: Polygon,
    /// The placed polygon, indexing [`FlattenedGeometry::points`].
    pub placed: Polygon,
}

/// An immutable flattened sheet produced by a [`SheetBuilder`].
///
/// Points are 2D positions in an arbitrary sheet-local frame (the seed
/// polygon's anchor edge lies along the positive x axis from the origin).
/// Every edge of every placed polygon has exactly the length of its 3D
/// original.
#[derive(Debug, Clone)]
pub struct FlattenedGeometry {
    /// The sheet's 2D points. A single 3D vertex may map to several points
    /// when the surface is not developable around it.
    pub points: Vec<Point2<f64>>,
    /// Every polygon placed into this sheet, in placement order.
    pub placed_polygons: Vec<PlacedPolygon>,
    /// Outward unit normal for each boundary (cut) edge, keyed by the
    /// placed edge. Interior (fold) edges do not appear.
    pub boundary_normals: HashMap<Edge, Vector2<f64>>,
    /// Arithmetic mean of [`points`](Self::points).
    pub center: Point2<f64>,
    /// The source geometry this sheet was flattened from.
    pub segment: Arc<Segment>,
}

impl FlattenedGeometry {
    /// The outward normal of a boundary edge, or `None` for interior edges
    /// and edges not in this sheet.
    pub fn boundary_normal(&self, placed: &Edge) -> Option<&Vector2<f64>> {
        self.boundary_normals.get(placed)
    }

    /// Number of polygons placed into this sheet.
    pub fn len(&self) -> usize {
        self.placed_polygons.len()
    }

    /// Whether the sheet holds no polygons.
    pub fn is_empty(&self) -> bool {
        self.placed_polygons.is_empty()
    }

    /// Resolve a placed edge to its 2D endpoints.
    pub fn edge_endpoints(&self, placed: &Edge) -> (Point2<f64>, Point2<f64>) {
        (self.points[placed.a()], self.points[placed.b()])
    }
}
