//! Built-in flatten constraints and scorers.
//!
//! These cover the common fabrication requirements: sheets must not
//! self-overlap ([`NonOverlappingConstraint`]) and must fit the stock
//! material ([`MaxSpanConstraint`]). [`AreaScorer`] seeds sheets from the
//! largest faces, which tends to leave awkward slivers for late sheets
//! instead of early ones.

use nalgebra::Point2;
use rayon::prelude::*;

use crate::error::{Result, UnfoldError};

use super::math;
use super::policy::{FlattenConstraint, PlacementCandidate, PolygonContext, PolygonScorer};

/// Rejects placements whose loop edges properly intersect (or colinearly
/// overlap) the sheet's committed boundary.
///
/// The boundary snapshot is partitioned into fixed-size chunks evaluated
/// as independent parallel tasks and reduced with logical AND. This is
/// safe because the snapshot is immutable while constraints run: the
/// builder commits only after every constraint accepts.
#[derive(Debug, Clone)]
pub struct NonOverlappingConstraint {
    chunk_size: usize,
}

impl NonOverlappingConstraint {
    /// Create a constraint with the default chunk size.
    pub fn new() -> Self {
        Self { chunk_size: 64 }
    }

    /// Set the number of boundary edges scanned per parallel task.
    ///
    /// # Errors
    ///
    /// Rejects a chunk size of zero.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(UnfoldError::invalid_param(
                "chunk_size",
                chunk_size,
                "must be at least 1",
            ));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }
}

impl Default for NonOverlappingConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl FlattenConstraint for NonOverlappingConstraint {
    fn accepts(&self, candidate: &PlacementCandidate<'_>) -> bool {
        let loop_segments = candidate.loop_segments();

        candidate
            .boundary
            .par_chunks(self.chunk_size)
            .all(|chunk| {
                chunk.iter().all(|entry| {
                    let (q1, q2) = candidate.boundary_segment(entry);
                    loop_segments.iter().all(|&(p1, p2)| {
                        // The anchor edge is itself part of the boundary.
                        if same_segment(p1, p2, q1, q2) {
                            return true;
                        }
                        !math::segments_intersect(p1, p2, q1, q2)
                            && !math::segments_overlap(p1, p2, q1, q2)
                    })
                })
            })
    }
}

fn same_segment(p1: Point2<f64>, p2: Point2<f64>, q1: Point2<f64>, q2: Point2<f64>) -> bool {
    const EPS: f64 = 1e-9;
    ((p1 - q1).norm() < EPS && (p2 - q2).norm() < EPS)
        || ((p1 - q2).norm() < EPS && (p2 - q1).norm() < EPS)
}

/// Rejects placements that would grow the sheet's axis-aligned bounding
/// box beyond a maximum width and height (stock material or machine-bed
/// limits).
#[derive(Debug, Clone, Copy)]
pub struct MaxSpanConstraint {
    width: f64,
    height: f64,
}

impl MaxSpanConstraint {
    /// Create a constraint limiting the sheet to `width` x `height`
    /// geometry units.
    ///
    /// # Errors
    ///
    /// Rejects non-positive or non-finite limits.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width > 0.0 && width.is_finite()) {
            return Err(UnfoldError::invalid_param("width", width, "must be positive"));
        }
        if !(height > 0.0 && height.is_finite()) {
            return Err(UnfoldError::invalid_param(
                "height",
                height,
                "must be positive",
            ));
        }
        Ok(Self { width, height })
    }
}

impl FlattenConstraint for MaxSpanConstraint {
    fn accepts(&self, candidate: &PlacementCandidate<'_>) -> bool {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut grow = |p: &Point2<f64>| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        };

        for p in candidate.points {
            grow(p);
        }
        for p in candidate.loop_points() {
            grow(&p);
        }

        max.x - min.x <= self.width && max.y - min.y <= self.height
    }
}

/// Scores polygons by 3D surface area, so the largest remaining face
/// seeds each new sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaScorer;

impl PolygonScorer for AreaScorer {
    fn score(&self, ctx: &PolygonContext<'_>) -> f64 {
        let points = ctx.polygon.points();
        let origin = ctx.segment.vertices()[points[0]];
        let mut area = 0.0;
        for w in points[1..].windows(2) {
            let u = ctx.segment.vertices()[w[0]] - origin;
            let v = ctx.segment.vertices()[w[1]] - origin;
            area += u.cross(&v).norm() * 0.5;
        }
        area
    }
}
