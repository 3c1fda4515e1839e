//! Voronoi Cell Structure
//!
//! One clipped region of the diagram, with its place in the adjacency graph
//! and its ordered boundary polygon.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::diagram::{CellId, EdgeId, VertexId};
use crate::geometry::signed_area;

/// A single cell of a bounded Voronoi diagram
///
/// Each cell belongs to one seed point and holds:
/// - the seed (site) it was generated from
/// - the vertices and edges of the diagram graph that bound it
/// - neighbour cells, one entry per shared edge
/// - a border flag for cells truncated by the bounding box
/// - its boundary as a closed counter-clockwise point sequence
///
/// Cells are created by the diagram builder; the public API is read-only.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) id: CellId,
    pub(crate) site: DVec2,
    pub(crate) vertices: Vec<VertexId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) neighbors: Vec<CellId>,
    pub(crate) border: bool,
    pub(crate) boundary: Vec<DVec2>,
}

impl Cell {
    pub(crate) fn new(id: CellId, site: DVec2) -> Self {
        Self {
            id,
            site,
            vertices: Vec::new(),
            edges: Vec::new(),
            neighbors: Vec::new(),
            border: false,
            boundary: Vec::new(),
        }
    }

    /// Identifier of this cell, equal to the index of its seed point
    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    /// The seed point that generated this cell
    #[inline]
    pub fn site(&self) -> DVec2 {
        self.site
    }

    /// Vertices on the cell boundary (unordered, no duplicates)
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Edges bounding the cell, including stitched box edges
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Adjacent cells, one entry per shared edge
    ///
    /// Cells that touch only at a single point are not neighbours.
    #[inline]
    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    /// Whether the cell was truncated by the bounding box
    #[inline]
    pub fn is_border(&self) -> bool {
        self.border
    }

    /// Closed boundary polygon in counter-clockwise order
    ///
    /// The first point is the lowest-x (then lowest-y) boundary vertex; the
    /// closing edge back to it is implied.
    #[inline]
    pub fn boundary(&self) -> &[DVec2] {
        &self.boundary
    }

    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_neighbor_of(&self, other: CellId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Number of boundary points (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.boundary.len()
    }

    /// Area enclosed by the boundary
    pub fn area(&self) -> f64 {
        signed_area(&self.boundary).abs()
    }

    /// Length of the closed boundary
    pub fn perimeter(&self) -> f64 {
        if self.boundary.len() < 2 {
            return 0.0;
        }
        self.boundary
            .iter()
            .zip(self.boundary.iter().cycle().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum()
    }

    /// Area centroid of the boundary polygon
    ///
    /// Falls back to the vertex mean for a degenerate polygon, and to the
    /// site when the cell has no boundary yet.
    pub fn centroid(&self) -> DVec2 {
        let n = self.boundary.len();
        if n == 0 {
            return self.site;
        }
        let area = signed_area(&self.boundary);
        if n < 3 || area.abs() <= f64::EPSILON {
            return self.boundary.iter().copied().sum::<DVec2>() / n as f64;
        }

        let mut acc = DVec2::ZERO;
        for (i, p) in self.boundary.iter().enumerate() {
            let q = self.boundary[(i + 1) % n];
            acc += (*p + q) * p.perp_dot(q);
        }
        acc / (6.0 * area)
    }
}
