//! Unbounded Voronoi decomposition of a point set
//!
//! The diagram builder only needs the finite Voronoi vertices and, for each
//! pair of neighbouring seeds, the (possibly open) pair of vertices bounding
//! their shared ridge. [`DecompositionOracle`] is that seam;
//! [`DelaunayOracle`] derives it from spade's Delaunay triangulation, whose
//! dual is the Voronoi diagram.

use std::collections::HashMap;

use glam::DVec2;
use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::error::{Result, VoronoiError};
use crate::geometry::DEFAULT_TOLERANCE;

/// Ridge between two neighbouring seeds
///
/// A `None` vertex means the ridge is open on that side and extends to
/// infinity away from the seeds' convex hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ridge {
    /// Indices of the two seeds the ridge separates
    pub points: [usize; 2],
    /// Indices into [`Decomposition::vertices`]
    pub vertices: [Option<usize>; 2],
}

impl Ridge {
    /// Whether both ends of the ridge are finite
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.vertices[0].is_some() && self.vertices[1].is_some()
    }
}

/// Output of a decomposition: finite vertices plus ridges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decomposition {
    pub vertices: Vec<DVec2>,
    pub ridges: Vec<Ridge>,
}

/// Computes the unbounded Voronoi structure of a point set
pub trait DecompositionOracle {
    /// Decompose `points`; ridge point indices refer to positions in `points`
    fn decompose(&self, points: &[DVec2]) -> Result<Decomposition>;
}

/// Default oracle backed by [`spade::DelaunayTriangulation`]
///
/// Every inner Delaunay face contributes its circumcentre as a Voronoi
/// vertex and every Delaunay edge becomes a ridge. Adjacent faces with
/// coincident circumcentres (four or more cocircular seeds) share a single
/// vertex and the zero-length ridge between them is omitted, so seeds that
/// only touch at a point are not reported as neighbours.
#[derive(Debug, Clone, Copy)]
pub struct DelaunayOracle {
    tolerance: f64,
}

impl DelaunayOracle {
    /// Create an oracle; `tolerance` is relative to the extent of the point set
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for DelaunayOracle {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl DecompositionOracle for DelaunayOracle {
    fn decompose(&self, points: &[DVec2]) -> Result<Decomposition> {
        let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
        let mut seed_of: HashMap<FixedVertexHandle, usize> = HashMap::with_capacity(points.len());

        for (index, p) in points.iter().enumerate() {
            let handle = triangulation
                .insert(Point2::new(p.x, p.y))
                .map_err(|e| {
                    VoronoiError::DegenerateInput(format!(
                        "point {index} ({}, {}) rejected by triangulation: {e:?}",
                        p.x, p.y
                    ))
                })?;
            if let Some(first) = seed_of.insert(handle, index) {
                return Err(VoronoiError::DuplicatePoint {
                    first,
                    second: index,
                });
            }
        }

        if triangulation.num_inner_faces() == 0 {
            return Err(VoronoiError::DegenerateInput(format!(
                "{} points are collinear, no Voronoi vertex exists",
                points.len()
            )));
        }

        let merge_distance = self.tolerance * extent(points);

        // Circumcentre per inner face, then union faces whose circumcentres
        // coincide across a shared Delaunay edge.
        let faces: Vec<FixedFaceHandle<InnerTag>> =
            triangulation.inner_faces().map(|face| face.fix()).collect();
        let face_slot: HashMap<FixedFaceHandle<InnerTag>, usize> = faces
            .iter()
            .enumerate()
            .map(|(slot, &face)| (face, slot))
            .collect();
        let centers: Vec<DVec2> = triangulation
            .inner_faces()
            .map(|face| {
                let c = face.circumcenter();
                DVec2::new(c.x, c.y)
            })
            .collect();

        let mut merged = DisjointSet::new(faces.len());
        for edge in triangulation.undirected_edges() {
            let directed = edge.as_directed();
            let left = directed.face().as_inner();
            let right = directed.rev().face().as_inner();
            if let (Some(left), Some(right)) = (left, right) {
                let a = face_slot[&left.fix()];
                let b = face_slot[&right.fix()];
                if centers[a].distance(centers[b]) <= merge_distance {
                    merged.union(a, b);
                }
            }
        }

        let mut vertices = Vec::with_capacity(faces.len());
        let mut vertex_of_root: HashMap<usize, usize> = HashMap::new();
        let mut vertex_of_face = Vec::with_capacity(faces.len());
        for slot in 0..faces.len() {
            let root = merged.find(slot);
            let vertex = *vertex_of_root.entry(root).or_insert_with(|| {
                vertices.push(centers[root]);
                vertices.len() - 1
            });
            vertex_of_face.push(vertex);
        }

        let mut ridges = Vec::with_capacity(triangulation.num_undirected_edges());
        for edge in triangulation.undirected_edges() {
            let [from, to] = edge.vertices();
            let directed = edge.as_directed();
            let left = directed
                .face()
                .as_inner()
                .map(|face| vertex_of_face[face_slot[&face.fix()]]);
            let right = directed
                .rev()
                .face()
                .as_inner()
                .map(|face| vertex_of_face[face_slot[&face.fix()]]);

            if left.is_some() && left == right {
                continue;
            }
            ridges.push(Ridge {
                points: [seed_of[&from.fix()], seed_of[&to.fix()]],
                vertices: [left, right],
            });
        }

        tracing::debug!(
            points = points.len(),
            faces = faces.len(),
            vertices = vertices.len(),
            ridges = ridges.len(),
            "decomposed point set"
        );

        Ok(Decomposition { vertices, ridges })
    }
}

/// Largest axis extent of the point set, at least 1
fn extent(points: &[DVec2]) -> f64 {
    let (min, max) = points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(min, max), &p| (min.min(p), max.max(p)),
    );
    (max - min).max_element().max(1.0)
}

/// Union-find over face slots
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the lower slot as root so vertex order follows face order
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}
