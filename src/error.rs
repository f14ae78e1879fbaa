//! Error types for unfurl.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`UnfoldError`].
pub type Result<T> = std::result::Result<T, UnfoldError>;

/// Errors that can occur during unfolding operations.
#[derive(Error, Debug)]
pub enum UnfoldError {
    /// The segment has no polygons.
    #[error("segment has no polygons")]
    EmptySegment,

    /// A polygon references an invalid vertex index.
    #[error("polygon {polygon} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The polygon index.
        polygon: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A polygon has fewer than three vertices or repeats a vertex.
    #[error("polygon {polygon} is degenerate")]
    DegeneratePolygon {
        /// The polygon index.
        polygon: usize,
    },

    /// Triangulation could not place a vertex: neither reflection of the
    /// third triangle point satisfies the outward-normal test.
    #[error("triangulation failed for anchor edge ({a}, {b})")]
    TriangulationFailed {
        /// First anchor vertex index.
        a: usize,
        /// Second anchor vertex index.
        b: usize,
    },

    /// Internal bookkeeping invariant was violated.
    #[error("invalid builder state: {0}")]
    InvalidState(String),

    /// The operation was cancelled cooperatively. No partial result is
    /// produced.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl UnfoldError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        UnfoldError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
