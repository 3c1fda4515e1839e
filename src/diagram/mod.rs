//! Bounded Voronoi diagram graph
//!
//! A [`VoronoiDiagram`] owns three arenas (cells, vertices, edges) that
//! reference each other through [`CellId`], [`VertexId`] and [`EdgeId`]
//! handles. It is produced by [`DiagramBuilder`] in five passes:
//!
//! 1. one cell per seed point
//! 2. oracle vertices inside the box become graph vertices
//! 3. ridges are clipped to the box and linked as edges
//! 4. cells cut open by the box are stitched shut along its perimeter
//! 5. each cell's edges are walked into a counter-clockwise polygon

mod builder;
mod ordering;
mod stitch;

pub use builder::{build_diagram, DiagramBuilder};

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::geometry::BoundingBox;

/// Handle of a cell; `CellId(i)` belongs to input point `i`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub(crate) usize);

/// Handle of a vertex in a diagram
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub(crate) usize);

/// Handle of an edge in a diagram
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) usize);

macro_rules! impl_index {
    ($($handle:ident),*) => {$(
        impl $handle {
            /// Position of the entity in its diagram arena
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    )*};
}

impl_index!(CellId, VertexId, EdgeId);

/// How a vertex came to exist
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// Finite Voronoi vertex reported by the oracle, inside the box
    Voronoi,
    /// Point where a ridge was cut by the box boundary
    Clipped,
    /// Box corner added while stitching a border cell
    Corner,
}

/// A point of the diagram graph
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub(crate) point: DVec2,
    pub(crate) kind: VertexKind,
    pub(crate) neighbors: Vec<VertexId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) cells: Vec<CellId>,
}

impl Vertex {
    pub(crate) fn new(point: DVec2, kind: VertexKind) -> Self {
        Self {
            point,
            kind,
            neighbors: Vec::new(),
            edges: Vec::new(),
            cells: Vec::new(),
        }
    }

    #[inline]
    pub fn point(&self) -> DVec2 {
        self.point
    }

    #[inline]
    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    /// Adjacent vertices, one entry per incident edge
    #[inline]
    pub fn neighbors(&self) -> &[VertexId] {
        &self.neighbors
    }

    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Cells this vertex bounds (no duplicates)
    #[inline]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }
}

/// An undirected edge between two vertices
///
/// `d0` always exists; `d1` is `None` for edges stitched along the box
/// boundary, which only one cell owns.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub(crate) v0: VertexId,
    pub(crate) v1: VertexId,
    pub(crate) d0: CellId,
    pub(crate) d1: Option<CellId>,
}

impl Edge {
    #[inline]
    pub fn vertices(&self) -> [VertexId; 2] {
        [self.v0, self.v1]
    }

    /// Owning cell
    #[inline]
    pub fn d0(&self) -> CellId {
        self.d0
    }

    /// Cell on the other side, absent for stitched boundary edges
    #[inline]
    pub fn d1(&self) -> Option<CellId> {
        self.d1
    }

    /// Cells on either side of the edge
    pub fn cells(&self) -> impl Iterator<Item = CellId> {
        std::iter::once(self.d0).chain(self.d1)
    }

    /// Whether `cell` lies on either side of the edge
    #[inline]
    pub fn borders(&self, cell: CellId) -> bool {
        self.d0 == cell || self.d1 == Some(cell)
    }

    /// Endpoint across from `vertex`
    #[inline]
    pub fn other(&self, vertex: VertexId) -> VertexId {
        if self.v0 == vertex {
            self.v1
        } else {
            self.v0
        }
    }

    /// Whether the edge was stitched along the box boundary
    #[inline]
    pub fn is_stitched(&self) -> bool {
        self.d1.is_none()
    }
}

/// A finished bounded Voronoi diagram
///
/// Immutable once built and safe to share between threads for reading.
///
/// # Example
///
/// ```
/// use bounded_voronoi::{build_diagram, BoundingBox};
/// use glam::DVec2;
///
/// let bbox = BoundingBox::from_size(10.0, 10.0).unwrap();
/// let points = [
///     DVec2::new(1.0, 1.0),
///     DVec2::new(9.0, 1.0),
///     DVec2::new(1.0, 9.0),
///     DVec2::new(9.0, 9.0),
/// ];
/// let diagram = build_diagram(&points, bbox).unwrap();
///
/// assert_eq!(diagram.cell_count(), 4);
/// assert!(diagram.cells().iter().all(|cell| cell.is_border()));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiDiagram {
    pub(crate) bbox: BoundingBox,
    pub(crate) cells: Vec<Cell>,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
}

impl VoronoiDiagram {
    /// Build a diagram with the default oracle and tolerance
    pub fn build(points: &[DVec2], bbox: BoundingBox) -> crate::Result<Self> {
        DiagramBuilder::new(bbox).build(points)
    }

    /// The box every cell is clipped to
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a cell; `None` for a handle from another diagram
    #[inline]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// Cell handle for input point `index`
    #[inline]
    pub fn cell_id(&self, index: usize) -> Option<CellId> {
        (index < self.cells.len()).then_some(CellId(index))
    }

    /// Cells truncated by the bounding box
    pub fn border_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.is_border())
    }

    /// Seed points, in input order
    pub fn sites(&self) -> Vec<DVec2> {
        self.cells.iter().map(Cell::site).collect()
    }

    /// Consume the diagram into its `(cells, vertices, edges)` arenas
    pub fn into_parts(self) -> (Vec<Cell>, Vec<Vertex>, Vec<Edge>) {
        (self.cells, self.vertices, self.edges)
    }
}
