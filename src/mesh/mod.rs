//! Core mesh data structures.
//!
//! This module provides the polygon-soup representation consumed by the
//! unfolding algorithms.
//!
//! # Overview
//!
//! A [`Segment`] is one connected piece of a mesh: 3D vertex positions,
//! per-vertex normals, and a set of polygonal faces. Faces are plain
//! [`Polygon`] loops of vertex indices; adjacency between faces is derived
//! on demand through undirected [`Edge`] keys rather than stored in a
//! connectivity structure, since unfolding only ever asks "which polygons
//! share this edge".
//!
//! # Construction
//!
//! ```
//! use unfurl::mesh::{Polygon, Segment};
//! use nalgebra::{Point3, Vector3};
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let normals = vec![Vector3::z(); 3];
//! let polygons = vec![Polygon::new(vec![0, 1, 2])];
//!
//! let segment = Segment::new(vertices, normals, polygons).unwrap();
//! ```

mod edge;
mod polygon;
mod segment;

pub use edge::Edge;
pub use polygon::Polygon;
pub use segment::Segment;
