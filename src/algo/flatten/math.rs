//! Planar construction math for unfolding.
//!
//! Pure functions used by the sheet builder: placing the third vertex of a
//! triangle from its side lengths, line normals, and 2D segment
//! intersection/overlap tests for boundary self-intersection checks.

use nalgebra::{Point2, Vector2};

/// Tolerance for orientation and degeneracy tests, in squared-ish geometry
/// units. Inputs are expected in ordinary model units (millimeters or so).
pub const GEOM_EPSILON: f64 = 1e-9;

/// Place the third vertex `C` of a triangle whose edge `AB` is already
/// embedded in the plane.
///
/// `ab`, `bc`, and `ac` are the triangle side lengths (`ab` measured in the
/// plane, `bc` and `ac` taken from the source 3D geometry). The law of
/// cosines gives the signed projection of `C` along `AB` and the
/// perpendicular height, yielding two mirror candidates across the line.
/// The candidate lying on the side that `outward` points to wins.
///
/// A negative radicand (inconsistent side lengths from floating-point
/// error) is clamped to zero height, producing a colinear placement. When
/// the two candidates coincide (height ≈ 0) the vertex is placed along the
/// `AB` direction directly from whichever anchor has the larger known side
/// length, which covers all three colinear configurations.
///
/// Returns `None` if `AB` is too short to orient, or if neither candidate
/// satisfies the outward test (NaN side lengths).
pub fn triangulate(
    a: Point2<f64>,
    b: Point2<f64>,
    outward: Vector2<f64>,
    ab: f64,
    bc: f64,
    ac: f64,
) -> Option<Point2<f64>> {
    if !(ab > GEOM_EPSILON) {
        return None;
    }

    let dir = (b - a) / (b - a).norm();

    // Law of cosines: signed distance of C's projection from A along AB.
    let t = (ab * ab + ac * ac - bc * bc) / (2.0 * ab);
    let h_sq = ac * ac - t * t;
    let h = if h_sq > 0.0 { h_sq.sqrt() } else { 0.0 };

    if h <= GEOM_EPSILON {
        // Colinear triangle. Extend along AB from the anchor with the
        // larger known side; consistent for C beyond B, before A, and
        // between the anchors.
        let c = if ac >= bc { a + dir * ac } else { b - dir * bc };
        return if c.coords.iter().all(|v| v.is_finite()) {
            Some(c)
        } else {
            None
        };
    }

    let foot = a + dir * t;
    let perp = Vector2::new(-dir.y, dir.x);

    for candidate in [foot + perp * h, foot - perp * h] {
        if normal_to_line(a, b, candidate).dot(&outward) >= 0.0 {
            return Some(candidate);
        }
    }

    None
}

/// The perpendicular component of `p` relative to the line through `a` and
/// `b`: the vector from `p`'s projection on the line to `p` itself.
///
/// Zero when `p` lies on the line (or when `a == b`).
pub fn normal_to_line(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> Vector2<f64> {
    let dir = b - a;
    let len_sq = dir.norm_squared();
    if len_sq <= GEOM_EPSILON * GEOM_EPSILON {
        return Vector2::zeros();
    }
    let rel = p - a;
    rel - dir * (rel.dot(&dir) / len_sq)
}

/// The unit normal of segment `AB` pointing away from `interior`.
///
/// Returns `None` when `interior` lies on the line (no outward side).
pub fn outward_normal(
    a: Point2<f64>,
    b: Point2<f64>,
    interior: Point2<f64>,
) -> Option<Vector2<f64>> {
    let n = normal_to_line(a, b, interior);
    let len = n.norm();
    if len <= GEOM_EPSILON {
        None
    } else {
        Some(-n / len)
    }
}

/// 2D cross product of `u` and `v`.
#[inline]
fn cross(u: Vector2<f64>, v: Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Test whether segments `p1p2` and `q1q2` properly intersect: they cross
/// at a point interior to both. Touching at endpoints (within tolerance)
/// does not count.
pub fn segments_intersect(
    p1: Point2<f64>,
    p2: Point2<f64>,
    q1: Point2<f64>,
    q2: Point2<f64>,
) -> bool {
    // Scale the orientation tolerance with the segment extents so the test
    // behaves the same at any model scale.
    let scale = (p2 - p1).norm().max((q2 - q1).norm()).max(1.0);
    let eps = GEOM_EPSILON * scale * scale;

    let d1 = cross(q2 - q1, p1 - q1);
    let d2 = cross(q2 - q1, p2 - q1);
    let d3 = cross(p2 - p1, q1 - p1);
    let d4 = cross(p2 - p1, q2 - p1);

    d1 * d2 < -eps && d3 * d4 < -eps
}

/// Test whether colinear segments `p1p2` and `q1q2` overlap along more
/// than a point. Non-colinear segments never overlap.
pub fn segments_overlap(
    p1: Point2<f64>,
    p2: Point2<f64>,
    q1: Point2<f64>,
    q2: Point2<f64>,
) -> bool {
    let dir = p2 - p1;
    let len = dir.norm();
    if len <= GEOM_EPSILON {
        return false;
    }
    let scale = len.max((q2 - q1).norm());
    let eps = GEOM_EPSILON * scale * scale;

    if cross(dir, q1 - p1).abs() > eps || cross(dir, q2 - p1).abs() > eps {
        return false;
    }

    // All four points colinear: compare 1D parameters along the line.
    let dir_n = dir / len;
    let t1 = (q1 - p1).dot(&dir_n);
    let t2 = (q2 - p1).dot(&dir_n);
    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

    hi.min(len) - lo.max(0.0) > GEOM_EPSILON * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn test_triangulate_right_triangle() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let up = Vector2::new(0.0, 1.0);

        // Unit right triangle: C directly above A.
        let c = triangulate(a, b, up, 1.0, 2.0_f64.sqrt(), 1.0).unwrap();
        assert!((c.x - 0.0).abs() < TOL);
        assert!((c.y - 1.0).abs() < TOL);

        // Same lengths, opposite outward direction: mirrored candidate.
        let c = triangulate(a, b, -up, 1.0, 2.0_f64.sqrt(), 1.0).unwrap();
        assert!((c.y + 1.0).abs() < TOL);
    }

    #[test]
    fn test_triangulate_preserves_side_lengths() {
        let a = Point2::new(2.0, 1.0);
        let b = Point2::new(5.0, 1.0);
        let (ab, bc, ac) = (3.0, 2.5, 4.0);
        let c = triangulate(a, b, Vector2::new(0.0, 1.0), ab, bc, ac).unwrap();
        assert!(((c - a).norm() - ac).abs() < 1e-9);
        assert!(((c - b).norm() - bc).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_colinear_beyond_b() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        // ac = ab + bc: C sits past B on the line.
        let c = triangulate(a, b, Vector2::new(0.0, 1.0), 1.0, 0.5, 1.5).unwrap();
        assert!((c.x - 1.5).abs() < TOL);
        assert!(c.y.abs() < TOL);
    }

    #[test]
    fn test_triangulate_colinear_before_a() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        // bc = ab + ac: C sits before A on the line.
        let c = triangulate(a, b, Vector2::new(0.0, 1.0), 1.0, 1.5, 0.5).unwrap();
        assert!((c.x + 0.5).abs() < TOL);
        assert!(c.y.abs() < TOL);
    }

    #[test]
    fn test_triangulate_clamps_negative_radicand() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        // Slightly inconsistent lengths: |ac - t| overshoots by float noise.
        let c = triangulate(a, b, Vector2::new(0.0, 1.0), 1.0, 0.5 - 1e-12, 1.5).unwrap();
        assert!(c.y.abs() < 1e-6);
    }

    #[test]
    fn test_triangulate_zero_anchor_fails() {
        let a = Point2::new(0.0, 0.0);
        assert!(triangulate(a, a, Vector2::new(0.0, 1.0), 0.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_normal_to_line() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        let n = normal_to_line(a, b, Point2::new(1.0, 3.0));
        assert!((n - Vector2::new(0.0, 3.0)).norm() < TOL);

        let on_line = normal_to_line(a, b, Point2::new(1.5, 0.0));
        assert!(on_line.norm() < TOL);
    }

    #[test]
    fn test_outward_normal_points_away() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let n = outward_normal(a, b, Point2::new(0.5, 0.5)).unwrap();
        assert!((n - Vector2::new(0.0, -1.0)).norm() < TOL);
        assert!(outward_normal(a, b, Point2::new(0.3, 0.0)).is_none());
    }

    #[test]
    fn test_segments_intersect() {
        let cross_a = (Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let cross_b = (Point2::new(0.0, 1.0), Point2::new(1.0, 0.0));
        assert!(segments_intersect(cross_a.0, cross_a.1, cross_b.0, cross_b.1));

        // Sharing an endpoint is not a proper intersection.
        let touch = (Point2::new(1.0, 1.0), Point2::new(2.0, 0.0));
        assert!(!segments_intersect(cross_a.0, cross_a.1, touch.0, touch.1));

        // Disjoint.
        let far = (Point2::new(5.0, 5.0), Point2::new(6.0, 5.0));
        assert!(!segments_intersect(cross_a.0, cross_a.1, far.0, far.1));
    }

    #[test]
    fn test_segments_overlap() {
        let p = (Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        assert!(segments_overlap(
            p.0,
            p.1,
            Point2::new(1.0, 0.0),
            Point2::new(3.0, 0.0)
        ));
        // Touching end to end: a single shared point is not an overlap.
        assert!(!segments_overlap(
            p.0,
            p.1,
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0)
        ));
        // Parallel but offset.
        assert!(!segments_overlap(
            p.0,
            p.1,
            Point2::new(0.0, 1.0),
            Point2::new(2.0, 1.0)
        ));
    }
}
