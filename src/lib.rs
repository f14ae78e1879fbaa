//! # Unfurl
//!
//! A mesh unfolding library: flattens segments of a 3D polygon mesh into
//! 2D sheets for fabrication (laser cutting, papercraft, CNC).
//!
//! Unfolding works one polygon at a time. Each polygon is hinged on an
//! edge it shares with an already-placed neighbor and rotated into the
//! plane, with its remaining vertices constructed from the original 3D
//! side lengths so every edge keeps its exact length. A greedy driver
//! grows each sheet until nothing more fits, then starts a new sheet, so
//! any input unfolds completely, possibly across several sheets.
//!
//! ## Features
//!
//! - **Exact edge lengths**: placed polygons are congruent to their 3D
//!   originals, edge by edge.
//! - **Vertex merging**: coincident placements of the same 3D vertex fuse
//!   into a single 2D point, so developable regions close up seamlessly.
//! - **Pluggable policies**: edge filters, seed scorers, and placement
//!   constraints control how sheets grow (e.g. no self-overlap, maximum
//!   stock size).
//! - **Strip unfolding**: an alternative driver that produces straight
//!   strips with classified end/side boundary edges.
//! - **Run control**: progress callbacks and cooperative cancellation.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use unfurl::prelude::*;
//! use unfurl::nalgebra::{Point3, Vector3};
//!
//! // A unit cube as six quads.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(1.0, 1.0, 1.0),
//!     Point3::new(0.0, 1.0, 1.0),
//! ];
//! let normals = vec![Vector3::z(); 8];
//! let polygons = vec![
//!     Polygon::new(vec![0, 1, 2, 3]),
//!     Polygon::new(vec![4, 5, 6, 7]),
//!     Polygon::new(vec![0, 1, 5, 4]),
//!     Polygon::new(vec![1, 2, 6, 5]),
//!     Polygon::new(vec![2, 3, 7, 6]),
//!     Polygon::new(vec![3, 0, 4, 7]),
//! ];
//!
//! let segment = Arc::new(Segment::new(vertices, normals, polygons)?);
//! let sheets = Unroller::new().unroll(&segment)?;
//!
//! let placed: usize = sheets.iter().map(|s| s.len()).sum();
//! assert_eq!(placed, 6);
//! # Ok::<(), UnfoldError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

pub use error::{Result, UnfoldError};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use unfurl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::flatten::{
        AreaScorer, EdgeFilter, FlattenConstraint, FlattenedGeometry, MaxSpanConstraint,
        NonOverlappingConstraint, PlacedPolygon, PolygonScorer, SheetBuilder, StripSheet,
        StripUnroller, Unroller,
    };
    pub use crate::algo::progress::{CancelToken, Progress};
    pub use crate::error::{Result, UnfoldError};
    pub use crate::mesh::{Edge, Polygon, Segment};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::{Point3, Vector3};
    use std::sync::Arc;

    // End to end: unfold a square pyramid (no base) with the overlap
    // constraint and check the fabrication-relevant invariants.
    #[test]
    fn test_pyramid_end_to_end() {
        let vertices = vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.5),
        ];
        let normals = vec![Vector3::z(); 5];
        let polygons = vec![
            Polygon::new(vec![0, 1, 4]),
            Polygon::new(vec![1, 2, 4]),
            Polygon::new(vec![2, 3, 4]),
            Polygon::new(vec![3, 0, 4]),
        ];
        let segment = Arc::new(Segment::new(vertices, normals, polygons).unwrap());

        let sheets = Unroller::new()
            .with_constraint(Arc::new(NonOverlappingConstraint::new()))
            .unroll(&segment)
            .unwrap();

        let placed: usize = sheets.iter().map(FlattenedGeometry::len).sum();
        assert_eq!(placed, 4);

        for sheet in &sheets {
            for pair in &sheet.placed_polygons {
                // Placed loops are congruent to the originals.
                assert_eq!(pair.original.len(), pair.placed.len());
                for (orig, placed) in pair
                    .original
                    .edges()
                    .iter()
                    .zip(pair.placed.edges().iter())
                {
                    let (a, b) = sheet.edge_endpoints(placed);
                    let expected = segment.edge_length(orig);
                    assert!(((a - b).norm() - expected).abs() < 1e-9);
                }
            }
            // Every boundary normal is unit length.
            for normal in sheet.boundary_normals.values() {
                assert!((normal.norm() - 1.0).abs() < 1e-9);
            }
        }
    }
}
