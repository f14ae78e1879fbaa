//! Polygonal face loops.
//!
//! A [`Polygon`] is an ordered, cyclic sequence of vertex indices. Its
//! edges are derived from consecutive vertices, including the wrap-around
//! edge from the last vertex back to the first.

use super::edge::Edge;

/// An ordered, cyclic sequence of vertex indices defining a face loop.
///
/// Equality is exact sequence equality, so two polygons with the same
/// vertices in reversed or rotated order are *not* equal (orientation and
/// starting vertex are significant).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polygon {
    points: Vec<usize>,
}

impl Polygon {
    /// Create a polygon from a vertex index loop.
    pub fn new(points: Vec<usize>) -> Self {
        Self { points }
    }

    /// The vertex indices in cyclic order.
    #[inline]
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// Number of vertices (and edges) in the loop.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polygon has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The edges of the loop in traversal order, including the wrap-around
    /// edge from the last vertex to the first.
    pub fn edges(&self) -> Vec<Edge> {
        let n = self.points.len();
        (0..n)
            .map(|i| Edge::new(self.points[i], self.points[(i + 1) % n]))
            .collect()
    }

    /// Check whether the loop contains `edge` (ignoring direction).
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges().iter().any(|e| e == edge)
    }

    /// Iterate over consecutive vertex pairs, including the wrap-around
    /// pair `(last, first)`.
    pub fn vertex_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

impl From<Vec<usize>> for Polygon {
    fn from(points: Vec<usize>) -> Self {
        Self::new(points)
    }
}
