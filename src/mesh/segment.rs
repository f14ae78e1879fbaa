//! Mesh segments: the geometry provider for unfolding.
//!
//! A [`Segment`] owns the 3D vertex positions, per-vertex normals, and the
//! polygon set of one connected piece of a mesh. Unfolding algorithms read
//! from a segment but never mutate it; a finished sheet keeps a reference
//! to its source segment for provenance.

use std::sync::Arc;

use nalgebra::{Point3, Vector3};

use crate::error::{Result, UnfoldError};

use super::edge::Edge;
use super::polygon::Polygon;

/// A 3D mesh segment: vertices, normals, and the polygon set to unfold.
///
/// # Example
///
/// ```
/// use unfurl::mesh::{Polygon, Segment};
/// use nalgebra::{Point3, Vector3};
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let normals = vec![Vector3::z(); 3];
/// let polygons = vec![Polygon::new(vec![0, 1, 2])];
///
/// let segment = Segment::new(vertices, normals, polygons).unwrap();
/// assert_eq!(segment.polygons().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Segment {
    vertices: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    polygons: Vec<Polygon>,
    parent: Option<Arc<Segment>>,
}

impl Segment {
    /// Create a segment from vertices, per-vertex normals, and polygons.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon set is empty, a polygon references
    /// a vertex index out of range, or a polygon is degenerate (fewer than
    /// three vertices or a repeated vertex).
    pub fn new(
        vertices: Vec<Point3<f64>>,
        normals: Vec<Vector3<f64>>,
        polygons: Vec<Polygon>,
    ) -> Result<Self> {
        if polygons.is_empty() {
            return Err(UnfoldError::EmptySegment);
        }

        for (pi, poly) in polygons.iter().enumerate() {
            if poly.len() < 3 {
                return Err(UnfoldError::DegeneratePolygon { polygon: pi });
            }
            for (i, &v) in poly.points().iter().enumerate() {
                if v >= vertices.len() {
                    return Err(UnfoldError::InvalidVertexIndex {
                        polygon: pi,
                        vertex: v,
                    });
                }
                if poly.points()[..i].contains(&v) {
                    return Err(UnfoldError::DegeneratePolygon { polygon: pi });
                }
            }
        }

        Ok(Self {
            vertices,
            normals,
            polygons,
            parent: None,
        })
    }

    /// Attach a parent segment for provenance chaining.
    pub fn with_parent(mut self, parent: Arc<Segment>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The 3D vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// The per-vertex normals.
    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// The polygon set of this segment.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// The parent segment this one was partitioned from, if any.
    #[inline]
    pub fn parent(&self) -> Option<&Arc<Segment>> {
        self.parent.as_ref()
    }

    /// The two endpoint positions of an edge, in the edge's stored order.
    #[inline]
    pub fn edge_endpoints(&self, edge: &Edge) -> (Point3<f64>, Point3<f64>) {
        (self.vertices[edge.a()], self.vertices[edge.b()])
    }

    /// The 3D length of an edge.
    #[inline]
    pub fn edge_length(&self, edge: &Edge) -> f64 {
        self.distance(edge.a(), edge.b())
    }

    /// The 3D distance between two vertices.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        (self.vertices[b] - self.vertices[a]).norm()
    }

    /// The 3D midpoint of an edge.
    #[inline]
    pub fn edge_midpoint(&self, edge: &Edge) -> Point3<f64> {
        nalgebra::center(&self.vertices[edge.a()], &self.vertices[edge.b()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri_segment() -> Segment {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let normals = vec![Vector3::z(); 3];
        Segment::new(vertices, normals, vec![Polygon::new(vec![0, 1, 2])]).unwrap()
    }

    #[test]
    fn test_empty_segment_rejected() {
        let result = Segment::new(vec![Point3::origin()], vec![Vector3::z()], vec![]);
        assert!(matches!(result, Err(UnfoldError::EmptySegment)));
    }

    #[test]
    fn test_invalid_vertex_index_rejected() {
        let result = Segment::new(
            vec![Point3::origin()],
            vec![Vector3::z()],
            vec![Polygon::new(vec![0, 1, 2])],
        );
        assert!(matches!(
            result,
            Err(UnfoldError::InvalidVertexIndex { polygon: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_polygon_rejected() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let normals = vec![Vector3::z(); 2];
        let result = Segment::new(
            vertices.clone(),
            normals.clone(),
            vec![Polygon::new(vec![0, 1])],
        );
        assert!(matches!(
            result,
            Err(UnfoldError::DegeneratePolygon { polygon: 0 })
        ));

        let result = Segment::new(vertices, normals, vec![Polygon::new(vec![0, 1, 0])]);
        assert!(matches!(
            result,
            Err(UnfoldError::DegeneratePolygon { polygon: 0 })
        ));
    }

    #[test]
    fn test_edge_lookups() {
        let seg = tri_segment();
        assert_eq!(seg.edge_length(&Edge::new(0, 1)), 3.0);
        assert_eq!(seg.edge_length(&Edge::new(0, 2)), 4.0);
        assert_eq!(seg.distance(1, 2), 5.0);

        let (a, b) = seg.edge_endpoints(&Edge::new(1, 0));
        assert_eq!(a, Point3::new(3.0, 0.0, 0.0));
        assert_eq!(b, Point3::origin());
    }
}
