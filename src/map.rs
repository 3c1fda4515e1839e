//! VoronoiMap main structure

use std::collections::HashSet;

use crate::cell::Cell;
use crate::config::MapConfig;
use crate::diagram::{CellId, VoronoiDiagram};
use crate::error::{Result, VoronoiError};
use crate::generation::generate_diagram;
use crate::geometry::BoundingBox;

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;
#[cfg(feature = "spatial-index")]
use glam::DVec2;

/// A generated map: its configuration, diagram and lookup structures
///
/// # Examples
///
/// ```
/// use bounded_voronoi::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .point_count(256)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = VoronoiMap::generate(config).unwrap();
/// assert_eq!(map.cell_count(), 256);
///
/// let first = map.cells()[0].id();
/// println!("cell 0 has {} neighbours", map.get_neighbors(first).len());
/// ```
#[derive(Clone)]
pub struct VoronoiMap {
    /// Configuration used to generate this map
    config: MapConfig,

    diagram: VoronoiDiagram,

    /// Nearest-site index for position queries
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl VoronoiMap {
    /// Generate a map from its configuration
    pub fn generate(config: MapConfig) -> Result<Self> {
        let diagram = generate_diagram(&config)?;

        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(&diagram.sites());

        Ok(Self {
            config,
            diagram,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The underlying diagram graph
    #[inline]
    pub fn diagram(&self) -> &VoronoiDiagram {
        &self.diagram
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.diagram.bounding_box()
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.diagram.cell_count()
    }

    /// Get a cell by ID, `None` if it does not belong to this map
    #[inline]
    pub fn get_cell(&self, id: CellId) -> Option<&Cell> {
        self.diagram.cell(id)
    }

    /// Cell generated by seed point `index`
    ///
    /// # Errors
    ///
    /// Returns `CellNotFound` if `index >= cell_count()`
    pub fn cell_by_index(&self, index: usize) -> Result<&Cell> {
        self.diagram
            .cell_id(index)
            .and_then(|id| self.diagram.cell(id))
            .ok_or(VoronoiError::CellNotFound(index))
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        self.diagram.cells()
    }

    /// Neighbour IDs of a cell; empty for an unknown ID
    pub fn get_neighbors(&self, id: CellId) -> &[CellId] {
        self.diagram
            .cell(id)
            .map(Cell::neighbors)
            .unwrap_or(&[])
    }

    /// Cells truncated by the map border
    pub fn border_cells(&self) -> impl Iterator<Item = &Cell> {
        self.diagram.border_cells()
    }

    /// Cell containing `point`
    ///
    /// Answered by the nearest site, so a point outside the map resolves to
    /// the closest cell.
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, point: DVec2) -> CellId {
        CellId(self.spatial_index.find_nearest(point))
    }

    /// Cells within `hops` neighbour steps of `center` (BFS)
    ///
    /// Includes the centre and is ordered by hop distance. Returns an empty
    /// vec if `center` is unknown.
    pub fn find_cells_within_radius(&self, center: CellId, hops: usize) -> Vec<CellId> {
        if self.diagram.cell(center).is_none() {
            return vec![];
        }

        let mut visited = HashSet::from([center]);
        let mut found = vec![center];
        let mut current = vec![center];

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell in &current {
                for &neighbor in self.get_neighbors(cell) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            found.extend_from_slice(&next);
            current = next;
        }

        found
    }
}
