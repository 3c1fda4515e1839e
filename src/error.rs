//! Error types for bounded Voronoi construction

use thiserror::Error;

/// Errors that can occur while configuring, building or querying a diagram
///
/// Every error is deterministic for a given input: retrying the same call
/// with the same points and box always fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoronoiError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The clip rectangle has a non-positive or non-finite extent
    #[error("invalid bounding box: width {width} and height {height} must be finite and positive")]
    InvalidBoundingBox { width: f64, height: f64 },

    /// Not enough seed points to form a diagram
    #[error("need a single seed point or at least 3, got {actual}")]
    InsufficientPoints { actual: usize },

    /// A seed point has a NaN or infinite coordinate
    #[error("seed point {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },

    /// Two seed points share the same position
    #[error("seed points {first} and {second} coincide")]
    DuplicatePoint { first: usize, second: usize },

    /// The decomposition oracle could not handle the point set
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Border stitching could not close a cell cut open by the box
    #[error("cannot stitch border of cell {cell}: {reason}")]
    Stitching { cell: usize, reason: String },

    /// Walking a cell's edges did not yield a closed polygon
    #[error("boundary traversal of cell {cell} failed: {reason}")]
    Traversal { cell: usize, reason: String },

    /// Requested cell ID does not exist
    #[error("cell not found: {0}")]
    CellNotFound(usize),
}

/// Result type alias for voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;
