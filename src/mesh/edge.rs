//! Undirected mesh edges.
//!
//! An [`Edge`] is a pair of vertex indices. Equality and hashing ignore
//! direction, so `Edge::new(a, b)` and `Edge::new(b, a)` are the same key
//! in a map. The construction order is preserved and can be inspected with
//! [`Edge::same_direction`] when orientation matters.

use std::hash::{Hash, Hasher};

/// An undirected edge between two vertex indices.
///
/// The endpoints keep the order they were constructed with, but equality
/// and hashing treat `(a, b)` and `(b, a)` as the same edge:
///
/// ```
/// use unfurl::mesh::Edge;
///
/// assert_eq!(Edge::new(3, 7), Edge::new(7, 3));
/// assert!(!Edge::new(3, 7).same_direction(&Edge::new(7, 3)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    a: usize,
    b: usize,
}

impl Edge {
    /// Create an edge between two vertex indices, preserving their order.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// The first endpoint, in construction order.
    #[inline]
    pub fn a(&self) -> usize {
        self.a
    }

    /// The second endpoint, in construction order.
    #[inline]
    pub fn b(&self) -> usize {
        self.b
    }

    /// The edge with its endpoints swapped.
    #[inline]
    pub fn reversed(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Check whether `v` is one of the endpoints.
    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        self.a == v || self.b == v
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    #[inline]
    pub fn opposite(&self, v: usize) -> Option<usize> {
        if v == self.a {
            Some(self.b)
        } else if v == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Direction-sensitive comparison: endpoints must match in order.
    ///
    /// Unlike `==`, which ignores direction, this distinguishes `(a, b)`
    /// from `(b, a)`.
    #[inline]
    pub fn same_direction(&self, other: &Edge) -> bool {
        self.a == other.a && self.b == other.b
    }

    /// The endpoints normalized to `(min, max)` order.
    #[inline]
    fn key(&self) -> (usize, usize) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_direction() {
        assert_eq!(Edge::new(1, 2), Edge::new(2, 1));
        assert_eq!(Edge::new(1, 2), Edge::new(1, 2));
        assert_ne!(Edge::new(1, 2), Edge::new(1, 3));
    }

    #[test]
    fn test_hash_ignores_direction() {
        let mut set = HashSet::new();
        set.insert(Edge::new(4, 9));
        assert!(set.contains(&Edge::new(9, 4)));
        assert!(!set.contains(&Edge::new(4, 8)));
    }

    #[test]
    fn test_same_direction() {
        let e = Edge::new(1, 2);
        assert!(e.same_direction(&Edge::new(1, 2)));
        assert!(!e.same_direction(&e.reversed()));
        assert_eq!(e, e.reversed());
    }

    #[test]
    fn test_opposite() {
        let e = Edge::new(5, 6);
        assert_eq!(e.opposite(5), Some(6));
        assert_eq!(e.opposite(6), Some(5));
        assert_eq!(e.opposite(7), None);
        assert!(e.contains(5));
        assert!(!e.contains(7));
    }
}
