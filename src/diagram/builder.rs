//! Diagram construction: validation, vertex filtering and ridge clipping
//!
//! Stitching and ordering live in their own modules and operate on the
//! same in-progress [`Graph`].

use std::collections::HashMap;

use glam::DVec2;

use super::{ordering, stitch, CellId, Edge, EdgeId, Vertex, VertexId, VertexKind, VoronoiDiagram};
use crate::cell::Cell;
use crate::error::{Result, VoronoiError};
use crate::geometry::{perp, BoundingBox, DEFAULT_TOLERANCE};
use crate::oracle::{DecompositionOracle, DelaunayOracle, Ridge};

/// Build a bounded Voronoi diagram with the default oracle and tolerance
///
/// Accepts a single point (its cell is the whole box) or at least three
/// distinct, finite points. See [`DiagramBuilder`] for the knobs.
pub fn build_diagram(points: &[DVec2], bbox: BoundingBox) -> Result<VoronoiDiagram> {
    DiagramBuilder::new(bbox).build(points)
}

/// Configurable entry point for diagram construction
///
/// # Example
///
/// ```
/// use bounded_voronoi::{BoundingBox, DiagramBuilder, DelaunayOracle};
/// use glam::DVec2;
///
/// let bbox = BoundingBox::from_size(4.0, 3.0).unwrap();
/// let points = [DVec2::new(1.0, 1.0), DVec2::new(3.0, 1.2), DVec2::new(2.0, 2.5)];
///
/// let diagram = DiagramBuilder::new(bbox)
///     .tolerance(1e-10)
///     .build_with(&points, &DelaunayOracle::new(1e-10))
///     .unwrap();
/// assert_eq!(diagram.cell_count(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DiagramBuilder {
    bbox: BoundingBox,
    tolerance: f64,
}

impl DiagramBuilder {
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Relative tolerance for coincidence and side tests
    ///
    /// Scaled by the box diagonal to an absolute distance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Build using [`DelaunayOracle`]
    pub fn build(&self, points: &[DVec2]) -> Result<VoronoiDiagram> {
        self.build_with(points, &DelaunayOracle::new(self.tolerance))
    }

    /// Build using a caller-provided oracle
    pub fn build_with<O>(&self, points: &[DVec2], oracle: &O) -> Result<VoronoiDiagram>
    where
        O: DecompositionOracle + ?Sized,
    {
        validate_points(points)?;

        let mut graph = Graph::new(self.bbox, self.tolerance, points);

        // A lone seed owns the whole box and has no ridges to ask for
        if points.len() > 1 {
            let decomposition = oracle.decompose(points)?;

            let kept = graph.filter_vertices(&decomposition.vertices);
            tracing::debug!(
                kept,
                total = decomposition.vertices.len(),
                "filtered voronoi vertices"
            );

            let seed_centroid = points.iter().copied().sum::<DVec2>() / points.len() as f64;
            let mut dropped = 0usize;
            for ridge in &decomposition.ridges {
                if !graph.add_ridge(ridge, &decomposition.vertices, seed_centroid) {
                    dropped += 1;
                }
            }
            tracing::debug!(
                edges = graph.edges.len(),
                dropped,
                "clipped ridges to bounding box"
            );
        }

        stitch::stitch_borders(&mut graph)?;
        ordering::order_boundaries(&mut graph)?;

        Ok(graph.finish())
    }
}

/// Precondition checks run before the oracle sees the points
fn validate_points(points: &[DVec2]) -> Result<()> {
    if points.is_empty() || points.len() == 2 {
        return Err(VoronoiError::InsufficientPoints {
            actual: points.len(),
        });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(VoronoiError::NonFinitePoint { index });
    }

    // Exact coordinate match; -0.0 and 0.0 are the same position
    let mut seen: HashMap<(u64, u64), usize> = HashMap::with_capacity(points.len());
    for (index, p) in points.iter().enumerate() {
        let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
        if let Some(&first) = seen.get(&key) {
            return Err(VoronoiError::DuplicatePoint {
                first,
                second: index,
            });
        }
        seen.insert(key, index);
    }
    Ok(())
}

/// Diagram under construction
///
/// Exclusively owned by one build call; all cross references are arena
/// handles so the cyclic cell/vertex/edge graph needs no shared ownership.
pub(super) struct Graph {
    pub(super) bbox: BoundingBox,
    /// Absolute distance below which points coincide
    pub(super) epsilon: f64,
    pub(super) cells: Vec<Cell>,
    pub(super) vertices: Vec<Vertex>,
    pub(super) edges: Vec<Edge>,
    /// Graph vertex for each oracle vertex inside the box
    voronoi: Vec<Option<VertexId>>,
    /// Shared vertex per box corner, in [`BoundingBox::corners`] order
    corners: [Option<VertexId>; 4],
}

impl Graph {
    /// Pass 1: one empty cell per seed
    pub(super) fn new(bbox: BoundingBox, tolerance: f64, points: &[DVec2]) -> Self {
        let cells = points
            .iter()
            .enumerate()
            .map(|(i, &p)| Cell::new(CellId(i), p))
            .collect();
        Self {
            bbox,
            epsilon: tolerance * bbox.diagonal(),
            cells,
            vertices: Vec::new(),
            edges: Vec::new(),
            voronoi: Vec::new(),
            corners: [None; 4],
        }
    }

    /// Pass 2: materialize oracle vertices that lie inside the box
    fn filter_vertices(&mut self, points: &[DVec2]) -> usize {
        let mut voronoi = Vec::with_capacity(points.len());
        for &p in points {
            let kept = if self.bbox.inside(p) {
                Some(self.add_vertex(p, VertexKind::Voronoi))
            } else {
                None
            };
            voronoi.push(kept);
        }
        self.voronoi = voronoi;
        self.voronoi.iter().flatten().count()
    }

    /// Pass 3 for one ridge; returns `false` when the ridge is dropped
    fn add_ridge(&mut self, ridge: &Ridge, positions: &[DVec2], seed_centroid: DVec2) -> bool {
        let [i, j] = ridge.points;
        let endpoints = match ridge.vertices {
            [Some(a), Some(b)] => self.clip_bounded(a, b, positions),
            [Some(a), None] | [None, Some(a)] => {
                let direction = self.ray_direction(i, j, seed_centroid);
                self.clip_ray(a, direction, positions)
            }
            [None, None] => {
                tracing::warn!(i, j, "ridge has no finite vertex, skipping");
                None
            }
        };

        match endpoints {
            Some((v0, v1)) => {
                self.link_edge(CellId(i), Some(CellId(j)), v0, v1);
                true
            }
            None => false,
        }
    }

    /// Outward direction of the open ridge between seeds `i` and `j`
    ///
    /// Perpendicular to the seeds' offset, pointing away from the other
    /// seeds. An open ridge belongs to a hull edge, so the seed centroid lies
    /// strictly on its inner side; when it is within epsilon of the edge line
    /// the seed farthest from that line decides.
    fn ray_direction(&self, i: usize, j: usize, seed_centroid: DVec2) -> DVec2 {
        let (pi, pj) = (self.cells[i].site, self.cells[j].site);
        let n = perp((pi - pj).normalize_or_zero());
        let midpoint = (pi + pj) * 0.5;

        let mut side = (midpoint - seed_centroid).dot(n);
        if side.abs() <= self.epsilon {
            side = self
                .cells
                .iter()
                .map(|cell| (midpoint - cell.site).dot(n))
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .unwrap_or(side);
        }
        n * side.signum()
    }

    /// Clip the ray from oracle vertex `a` along `direction` to the box
    fn clip_ray(
        &mut self,
        a: usize,
        direction: DVec2,
        positions: &[DVec2],
    ) -> Option<(VertexId, VertexId)> {
        let start = positions[a];
        // Long enough to cross the whole box from wherever the ray starts
        let length = 2.0 * self.bbox.diagonal() + start.distance(self.bbox.center());
        let far = start + direction * length;

        match self.voronoi[a] {
            Some(v) => {
                let exit = self.farthest_hit(start, start, far)?;
                Some((v, self.boundary_vertex(exit)))
            }
            // Outside the box: the ray only matters if it passes through
            None => self.clip_outside(start, far),
        }
    }

    /// Clip the finite ridge between oracle vertices `a` and `b`
    fn clip_bounded(
        &mut self,
        a: usize,
        b: usize,
        positions: &[DVec2],
    ) -> Option<(VertexId, VertexId)> {
        let (pa, pb) = (positions[a], positions[b]);
        match (self.voronoi[a], self.voronoi[b]) {
            // Interior segments are used as they are
            (Some(va), Some(vb)) => Some((va, vb)),
            (Some(va), None) => {
                let exit = self.farthest_hit(pa, pa, pb)?;
                Some((va, self.boundary_vertex(exit)))
            }
            (None, Some(vb)) => {
                let exit = self.farthest_hit(pb, pa, pb)?;
                Some((self.boundary_vertex(exit), vb))
            }
            (None, None) => self.clip_outside(pa, pb),
        }
    }

    /// Box crossing of segment `a-b` farthest from `from`
    ///
    /// `None` when the segment misses the box or only touches it at `from`.
    fn farthest_hit(&self, from: DVec2, a: DVec2, b: DVec2) -> Option<DVec2> {
        let hit = self
            .bbox
            .intersect(a, b)
            .into_iter()
            .max_by(|p, q| p.distance_squared(from).total_cmp(&q.distance_squared(from)));
        match hit {
            Some(p) if p.distance(from) > self.epsilon => Some(p),
            _ => {
                tracing::debug!(?a, ?b, "ridge does not leave the box cleanly, dropping");
                None
            }
        }
    }

    /// Segment with both ends outside: keep the chord through the box, if any
    fn clip_outside(&mut self, a: DVec2, b: DVec2) -> Option<(VertexId, VertexId)> {
        let hits = self.bbox.intersect(a, b);
        match hits.as_slice() {
            [p, q] if p.distance(*q) > self.epsilon => {
                let (p, q) = (*p, *q);
                Some((self.boundary_vertex(p), self.boundary_vertex(q)))
            }
            _ => None,
        }
    }

    pub(super) fn add_vertex(&mut self, point: DVec2, kind: VertexKind) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex::new(point, kind));
        id
    }

    /// New vertex on the box boundary, shared with the corner if it is one
    fn boundary_vertex(&mut self, point: DVec2) -> VertexId {
        match self.bbox.corner_at(point, self.epsilon) {
            Some(corner) => self.corner_vertex(corner),
            None => self.add_vertex(point, VertexKind::Clipped),
        }
    }

    /// Vertex at box corner `index`, created on first use
    pub(super) fn corner_vertex(&mut self, index: usize) -> VertexId {
        if let Some(v) = self.corners[index] {
            return v;
        }
        let v = self.add_vertex(self.bbox.corners()[index], VertexKind::Corner);
        self.corners[index] = Some(v);
        v
    }

    /// Add an edge and update every adjacency list it touches
    pub(super) fn link_edge(
        &mut self,
        d0: CellId,
        d1: Option<CellId>,
        v0: VertexId,
        v1: VertexId,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { v0, v1, d0, d1 });

        for cell in std::iter::once(d0).chain(d1) {
            let c = &mut self.cells[cell.0];
            c.edges.push(id);
            for v in [v0, v1] {
                if !c.vertices.contains(&v) {
                    c.vertices.push(v);
                }
            }
            for v in [v0, v1] {
                let vertex = &mut self.vertices[v.0];
                if !vertex.cells.contains(&cell) {
                    vertex.cells.push(cell);
                }
            }
        }
        if let Some(d1) = d1 {
            self.cells[d0.0].neighbors.push(d1);
            self.cells[d1.0].neighbors.push(d0);
        }

        self.vertices[v0.0].neighbors.push(v1);
        self.vertices[v1.0].neighbors.push(v0);
        self.vertices[v0.0].edges.push(id);
        self.vertices[v1.0].edges.push(id);
        id
    }

    /// Incident edges of `vertex` that border `cell`
    pub(super) fn cell_edges_at(
        &self,
        vertex: VertexId,
        cell: CellId,
    ) -> impl Iterator<Item = EdgeId> + '_ {
        self.vertices[vertex.0]
            .edges
            .iter()
            .copied()
            .filter(move |e| self.edges[e.0].borders(cell))
    }

    fn finish(self) -> VoronoiDiagram {
        VoronoiDiagram {
            bbox: self.bbox,
            cells: self.cells,
            vertices: self.vertices,
            edges: self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Decomposition;
    use approx::assert_relative_eq;

    /// Oracle returning a fixed decomposition
    struct Fixed(Decomposition);

    impl DecompositionOracle for Fixed {
        fn decompose(&self, _points: &[DVec2]) -> Result<Decomposition> {
            Ok(self.0.clone())
        }
    }

    fn ten_box() -> BoundingBox {
        BoundingBox::from_size(10.0, 10.0).unwrap()
    }

    fn graph_for(points: &[DVec2], vertices: &[DVec2]) -> Graph {
        let mut graph = Graph::new(ten_box(), DEFAULT_TOLERANCE, points);
        graph.filter_vertices(vertices);
        graph
    }

    #[test]
    fn test_vertices_outside_box_are_not_materialized() {
        let points = [DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0), DVec2::new(3.0, 1.0)];
        let graph = graph_for(
            &points,
            &[DVec2::new(5.0, 5.0), DVec2::new(11.0, 5.0), DVec2::new(10.0, 10.0)],
        );
        assert_eq!(graph.vertices.len(), 2);
        assert_eq!(graph.voronoi, vec![Some(VertexId(0)), None, Some(VertexId(1))]);
    }

    #[test]
    fn test_bounded_ridge_inside_is_unmodified() {
        let points = [DVec2::new(4.0, 2.0), DVec2::new(4.0, 8.0)];
        let positions = [DVec2::new(2.0, 5.0), DVec2::new(6.0, 5.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), Some(1)],
        };
        assert!(graph.add_ridge(&ridge, &positions, DVec2::ZERO));
        assert_eq!(graph.vertices.len(), 2);
        assert_eq!(graph.edges[0].vertices(), [VertexId(0), VertexId(1)]);
        assert_eq!(graph.edges[0].d1, Some(CellId(1)));
        assert_eq!(graph.cells[0].neighbors, vec![CellId(1)]);
        assert_eq!(graph.cells[1].neighbors, vec![CellId(0)]);
    }

    #[test]
    fn test_bounded_ridge_clipped_on_one_side() {
        let points = [DVec2::new(4.0, 2.0), DVec2::new(4.0, 8.0)];
        let positions = [DVec2::new(2.0, 5.0), DVec2::new(14.0, 5.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), Some(1)],
        };
        assert!(graph.add_ridge(&ridge, &positions, DVec2::ZERO));
        let [v0, v1] = graph.edges[0].vertices();
        assert_eq!(graph.vertices[v0.0].point, DVec2::new(2.0, 5.0));
        assert_eq!(graph.vertices[v1.0].point, DVec2::new(10.0, 5.0));
        assert_eq!(graph.vertices[v1.0].kind, VertexKind::Clipped);
    }

    #[test]
    fn test_bounded_ridge_crossing_box_is_clipped_twice() {
        let points = [DVec2::new(4.0, 2.0), DVec2::new(4.0, 8.0)];
        let positions = [DVec2::new(-2.0, 5.0), DVec2::new(14.0, 5.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), Some(1)],
        };
        assert!(graph.add_ridge(&ridge, &positions, DVec2::ZERO));
        assert_eq!(graph.vertices.len(), 2);
        assert!(graph
            .vertices
            .iter()
            .all(|v| v.kind == VertexKind::Clipped));
    }

    #[test]
    fn test_bounded_ridge_outside_is_dropped() {
        let points = [DVec2::new(4.0, 2.0), DVec2::new(4.0, 8.0)];
        let positions = [DVec2::new(12.0, 5.0), DVec2::new(14.0, 5.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), Some(1)],
        };
        assert!(!graph.add_ridge(&ridge, &positions, DVec2::ZERO));
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_open_ridge_points_away_from_other_seeds() {
        // Hull edge along the bottom; the third seed sits above it
        let points = [DVec2::new(2.0, 1.0), DVec2::new(6.0, 1.0), DVec2::new(4.0, 4.0)];
        let positions = [DVec2::new(4.0, 2.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), None],
        };
        assert!(graph.add_ridge(&ridge, &positions, DVec2::new(4.0, 2.0)));
        let [_, exit] = graph.edges[0].vertices();
        let p = graph.vertices[exit.0].point;
        assert_relative_eq!(p.x, 4.0, epsilon = 1e-12);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_open_ridge_ignores_box_center_outside_hull() {
        // All seeds in the lower-left, well away from the box centre; the
        // ray of the bottom hull edge must still go down
        let points = [DVec2::new(1.0, 1.0), DVec2::new(3.0, 1.0), DVec2::new(2.0, 2.0)];
        let positions = [DVec2::new(2.0, 1.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), None],
        };
        let centroid = DVec2::new(2.0, 4.0 / 3.0);
        assert!(graph.add_ridge(&ridge, &positions, centroid));
        let [_, exit] = graph.edges[0].vertices();
        let p = graph.vertices[exit.0].point;
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_open_ridge_falls_back_to_farthest_seed() {
        let points = [DVec2::new(2.0, 1.0), DVec2::new(6.0, 1.0), DVec2::new(4.0, 4.0)];
        let positions = [DVec2::new(4.0, 2.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), None],
        };
        // Centroid level with the hull edge
        assert!(graph.add_ridge(&ridge, &positions, DVec2::new(4.0, 1.0)));
        let [_, exit] = graph.edges[0].vertices();
        assert_eq!(graph.vertices[exit.0].point.y, 0.0);
    }

    #[test]
    fn test_open_ridge_from_outside_vertex_that_misses_is_dropped() {
        let points = [DVec2::new(2.0, 1.0), DVec2::new(6.0, 1.0), DVec2::new(4.0, 4.0)];
        let positions = [DVec2::new(4.0, -3.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [None, Some(0)],
        };
        assert!(!graph.add_ridge(&ridge, &positions, DVec2::new(4.0, 2.0)));
    }

    #[test]
    fn test_clipped_point_on_corner_reuses_corner_vertex() {
        let points = [DVec2::new(4.0, 6.0), DVec2::new(6.0, 4.0)];
        let positions = [DVec2::new(5.0, 5.0), DVec2::new(15.0, 15.0)];
        let mut graph = graph_for(&points, &positions);
        let ridge = Ridge {
            points: [0, 1],
            vertices: [Some(0), Some(1)],
        };
        assert!(graph.add_ridge(&ridge, &positions, DVec2::ZERO));
        let corner = graph.corner_vertex(2);
        assert_eq!(graph.edges[0].v1, corner);
        assert_eq!(graph.vertices[corner.0].kind, VertexKind::Corner);
    }

    #[test]
    fn test_custom_oracle_with_odd_dangling_count_fails() {
        // Three ridges of cell 0 fan out from one vertex, leaving three open ends
        let points = [
            DVec2::new(5.0, 7.0),
            DVec2::new(5.0, 2.0),
            DVec2::new(2.0, 4.0),
            DVec2::new(8.0, 4.0),
        ];
        let oracle = Fixed(Decomposition {
            vertices: vec![
                DVec2::new(5.0, 5.0),
                DVec2::new(5.0, 0.0),
                DVec2::new(0.0, 5.0),
                DVec2::new(10.0, 5.0),
            ],
            ridges: (1..4)
                .map(|k| Ridge {
                    points: [0, k],
                    vertices: [Some(0), Some(k)],
                })
                .collect(),
        });
        let result = DiagramBuilder::new(ten_box()).build_with(&points, &oracle);
        assert!(matches!(result, Err(VoronoiError::Stitching { cell: 0, .. })));
    }

    #[test]
    fn test_custom_oracle_leaving_a_cell_empty_fails() {
        let points = [DVec2::new(3.0, 5.0), DVec2::new(7.0, 5.0), DVec2::new(5.0, 9.0)];
        let oracle = Fixed(Decomposition {
            vertices: vec![DVec2::new(5.0, 0.0), DVec2::new(5.0, 10.0)],
            ridges: vec![Ridge {
                points: [0, 1],
                vertices: [Some(0), Some(1)],
            }],
        });
        let result = DiagramBuilder::new(ten_box()).build_with(&points, &oracle);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 2, .. })));
    }

    #[test]
    fn test_validate_points() {
        assert!(validate_points(&[DVec2::ONE]).is_ok());
        assert_eq!(
            validate_points(&[DVec2::new(0.0, 1.0), DVec2::new(1.0, 1.0), DVec2::new(-0.0, 1.0)]),
            Err(VoronoiError::DuplicatePoint { first: 0, second: 2 })
        );
        assert_eq!(
            validate_points(&[DVec2::ONE, DVec2::ZERO, DVec2::new(1.0, f64::INFINITY)]),
            Err(VoronoiError::NonFinitePoint { index: 2 })
        );
    }
}
