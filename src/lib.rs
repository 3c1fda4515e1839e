//! Bounded 2D Voronoi diagrams
//!
//! Builds the Voronoi diagram of a planar point set clipped to an
//! axis-aligned rectangle. Every cell comes back closed, including the ones
//! the rectangle cuts open, with an explicit graph of cells, vertices and
//! edges plus a counter-clockwise boundary polygon per cell. Suitable for
//! procedural maps, region partitioning and nearest-site queries.
//!
//! # Quick Start
//!
//! ```rust
//! use bounded_voronoi::*;
//!
//! // Build a diagram directly from points
//! let bbox = BoundingBox::from_size(10.0, 10.0).unwrap();
//! let points = [
//!     DVec2::new(2.0, 2.0),
//!     DVec2::new(8.0, 3.0),
//!     DVec2::new(5.0, 8.0),
//! ];
//! let diagram = build_diagram(&points, bbox).unwrap();
//! assert_eq!(diagram.cell_count(), 3);
//!
//! // Or generate a relaxed random map
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .point_count(500)
//!     .unwrap()
//!     .relaxation_iterations(3)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let map = VoronoiMap::generate(config).unwrap();
//! println!("{} border cells", map.border_cells().count());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) point-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and diagrams

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod oracle;
pub mod cell;
pub mod diagram;
pub mod generation;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{MapConfig, MapConfigBuilder};
pub use geometry::{intersect, perp, BoundingBox, Side, DEFAULT_TOLERANCE};
pub use oracle::{Decomposition, DecompositionOracle, DelaunayOracle, Ridge};
pub use cell::Cell;
pub use diagram::{
    build_diagram, CellId, DiagramBuilder, Edge, EdgeId, Vertex, VertexId, VertexKind,
    VoronoiDiagram,
};
pub use generation::{
    generate_diagram, generate_points, lloyd_relaxation, lloyd_relaxation_with_options,
    LloydOptions,
};
pub use map::VoronoiMap;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

pub use glam::DVec2;
