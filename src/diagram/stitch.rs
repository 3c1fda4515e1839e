//! Pass 4: close cells that the bounding box cut open
//!
//! After clipping, a border cell's edges form one or more open chains whose
//! ends (dangling vertices) lie on the box perimeter. Walking the cell's
//! dangling vertices and owned corners in angular order around an interior
//! point recovers the perimeter order, so each gap can be closed with a run
//! of box-aligned edges through the corners in between.

use glam::DVec2;

use super::builder::Graph;
use super::{CellId, VertexId};
use crate::error::{Result, VoronoiError};

/// Stop on a cell's perimeter walk
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stop {
    Dangling(VertexId),
    Corner(usize),
}

/// Stitched path from one dangling vertex to the next
#[derive(Debug, Clone, PartialEq)]
struct Arc {
    from: VertexId,
    corners: Vec<usize>,
    to: VertexId,
}

pub(super) fn stitch_borders(graph: &mut Graph) -> Result<()> {
    let owners = corner_owners(graph);
    let before = graph.edges.len();
    let mut border_cells = 0usize;

    for index in 0..graph.cells.len() {
        let cell = CellId(index);
        let dangling: Vec<VertexId> = graph.cells[index]
            .vertices
            .iter()
            .copied()
            .filter(|&v| graph.cell_edges_at(v, cell).count() == 1)
            .collect();
        let owned = owned_corners(graph, cell, &owners);

        if dangling.is_empty() {
            // Only a lone seed ends up with no edges while owning every corner
            if graph.cells[index].edges.is_empty() && owned.len() == 4 {
                close_box(graph, cell);
                border_cells += 1;
            }
            continue;
        }

        graph.cells[index].border = true;
        border_cells += 1;

        if dangling.len() % 2 != 0 {
            return Err(VoronoiError::Stitching {
                cell: index,
                reason: format!("{} dangling vertices cannot be paired", dangling.len()),
            });
        }

        for arc in plan_arcs(graph, cell, &dangling, &owned)? {
            let mut previous = arc.from;
            for corner in arc.corners {
                let v = graph.corner_vertex(corner);
                graph.link_edge(cell, None, previous, v);
                previous = v;
            }
            graph.link_edge(cell, None, previous, arc.to);
        }
    }

    tracing::debug!(
        border_cells,
        stitched_edges = graph.edges.len() - before,
        "stitched border cells"
    );
    Ok(())
}

/// Nearest seed for each box corner; ties go to the lower index
fn corner_owners(graph: &Graph) -> [usize; 4] {
    graph.bbox.corners().map(|corner| {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, cell) in graph.cells.iter().enumerate() {
            let d = cell.site.distance_squared(corner);
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        best
    })
}

/// Corners owned by `cell` that are not already one of its vertices
fn owned_corners(graph: &Graph, cell: CellId, owners: &[usize; 4]) -> Vec<usize> {
    let corners = graph.bbox.corners();
    let vertices = &graph.cells[cell.0].vertices;
    (0..4)
        .filter(|&k| owners[k] == cell.0)
        .filter(|&k| {
            !vertices
                .iter()
                .any(|v| graph.vertices[v.0].point.distance(corners[k]) <= graph.epsilon)
        })
        .collect()
}

fn close_box(graph: &mut Graph, cell: CellId) {
    let corners: Vec<VertexId> = (0..4).map(|k| graph.corner_vertex(k)).collect();
    for k in 0..4 {
        graph.link_edge(cell, None, corners[k], corners[(k + 1) % 4]);
    }
    graph.cells[cell.0].border = true;
}

/// Decide which dangling vertices to join and through which corners
///
/// A run between consecutive dangling vertices is stitched when it passes
/// an owned corner, or when both ends share a box side. Runs with corners
/// are taken first; the remaining gaps must be straight side segments.
fn plan_arcs(
    graph: &Graph,
    cell: CellId,
    dangling: &[VertexId],
    owned: &[usize],
) -> Result<Vec<Arc>> {
    let corners = graph.bbox.corners();
    let point_of = |stop: &Stop| match *stop {
        Stop::Dangling(v) => graph.vertices[v.0].point,
        Stop::Corner(k) => corners[k],
    };

    let c = &graph.cells[cell.0];
    let interior = (c
        .vertices
        .iter()
        .map(|v| graph.vertices[v.0].point)
        .sum::<DVec2>()
        + owned.iter().map(|&k| corners[k]).sum::<DVec2>())
        / (c.vertices.len() + owned.len()) as f64;

    let mut stops: Vec<Stop> = dangling
        .iter()
        .map(|&v| Stop::Dangling(v))
        .chain(owned.iter().map(|&k| Stop::Corner(k)))
        .collect();
    let angle = |stop: &Stop| {
        let d = point_of(stop) - interior;
        d.y.atan2(d.x)
    };
    stops.sort_by(|a, b| angle(a).total_cmp(&angle(b)));

    let Some(first) = stops.iter().position(|s| matches!(s, Stop::Dangling(_))) else {
        return Ok(Vec::new());
    };
    stops.rotate_left(first);

    let ends: Vec<(usize, VertexId)> = stops
        .iter()
        .enumerate()
        .filter_map(|(i, s)| match *s {
            Stop::Dangling(v) => Some((i, v)),
            Stop::Corner(_) => None,
        })
        .collect();
    let runs: Vec<Arc> = ends
        .iter()
        .enumerate()
        .map(|(k, &(start, from))| {
            let end = ends.get(k + 1).map_or(stops.len(), |&(i, _)| i);
            let (_, to) = ends[(k + 1) % ends.len()];
            let corners = stops[start + 1..end]
                .iter()
                .filter_map(|s| match *s {
                    Stop::Corner(k) => Some(k),
                    Stop::Dangling(_) => None,
                })
                .collect();
            Arc { from, corners, to }
        })
        .collect();

    let m = runs.len();
    let mut paired = vec![false; m];
    let mut arcs = Vec::with_capacity(m / 2);
    for through_corners in [true, false] {
        for (k, run) in runs.iter().enumerate() {
            let next = (k + 1) % m;
            if paired[k] || paired[next] {
                continue;
            }
            let take = if through_corners {
                !run.corners.is_empty()
            } else {
                run.corners.is_empty()
                    && graph
                        .bbox
                        .common_side(
                            graph.vertices[run.from.0].point,
                            graph.vertices[run.to.0].point,
                            graph.epsilon,
                        )
                        .is_some()
            };
            if take {
                paired[k] = true;
                paired[next] = true;
                arcs.push(run.clone());
            }
        }
    }

    let unpaired = paired.iter().filter(|p| !**p).count();
    if unpaired > 0 {
        return Err(VoronoiError::Stitching {
            cell: cell.0,
            reason: format!("{unpaired} of {m} dangling vertices have no partner on the box boundary"),
        });
    }
    Ok(arcs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::VertexKind;
    use crate::geometry::{BoundingBox, DEFAULT_TOLERANCE};

    fn ten_box() -> BoundingBox {
        BoundingBox::from_size(10.0, 10.0).unwrap()
    }

    #[test]
    fn test_corner_owners_prefer_lowest_index_on_ties() {
        let points = [DVec2::new(5.0, 2.0), DVec2::new(5.0, 8.0), DVec2::new(5.0, 2.0)];
        let graph = Graph::new(ten_box(), DEFAULT_TOLERANCE, &points);
        assert_eq!(corner_owners(&graph), [0, 0, 1, 1]);
    }

    #[test]
    fn test_lone_cell_gets_the_whole_box() {
        let points = [DVec2::new(3.0, 4.0)];
        let mut graph = Graph::new(ten_box(), DEFAULT_TOLERANCE, &points);
        stitch_borders(&mut graph).unwrap();

        assert_eq!(graph.edges.len(), 4);
        assert_eq!(graph.vertices.len(), 4);
        assert!(graph.vertices.iter().all(|v| v.kind == VertexKind::Corner));
        assert!(graph.cells[0].border);
        assert!(graph.cells[0].neighbors.is_empty());
    }

    #[test]
    fn test_vertical_split_stitches_through_two_corners() {
        // Two seeds separated by x = 5; each side owns two corners
        let points = [DVec2::new(2.0, 5.0), DVec2::new(8.0, 5.0)];
        let mut graph = Graph::new(ten_box(), DEFAULT_TOLERANCE, &points);
        let bottom = graph.add_vertex(DVec2::new(5.0, 0.0), VertexKind::Clipped);
        let top = graph.add_vertex(DVec2::new(5.0, 10.0), VertexKind::Clipped);
        graph.link_edge(CellId(0), Some(CellId(1)), bottom, top);

        stitch_borders(&mut graph).unwrap();

        // 1 ridge plus 3 box edges per side
        assert_eq!(graph.edges.len(), 7);
        for cell in &graph.cells {
            assert!(cell.border);
            assert_eq!(cell.edges.len(), 4);
            assert_eq!(cell.neighbors, vec![CellId(1 - cell.id.0)]);
        }
        let corners = graph
            .vertices
            .iter()
            .filter(|v| v.kind == VertexKind::Corner)
            .count();
        assert_eq!(corners, 4);
    }

    #[test]
    fn test_same_side_gap_is_joined_directly() {
        // A notch cut off the bottom edge, closed without any corner
        let points = [DVec2::new(5.0, 7.0), DVec2::new(5.0, 0.5)];
        let mut graph = Graph::new(ten_box(), DEFAULT_TOLERANCE, &points);
        let a = graph.add_vertex(DVec2::new(4.0, 0.0), VertexKind::Clipped);
        let apex = graph.add_vertex(DVec2::new(5.0, 1.0), VertexKind::Voronoi);
        let b = graph.add_vertex(DVec2::new(6.0, 0.0), VertexKind::Clipped);
        graph.link_edge(CellId(0), Some(CellId(1)), a, apex);
        graph.link_edge(CellId(0), Some(CellId(1)), apex, b);

        let plan = plan_arcs(&graph, CellId(1), &[a, b], &[]).unwrap();
        assert_eq!(plan.len(), 1);
        assert!(plan[0].corners.is_empty());
        assert_eq!(plan[0].from, a);
        assert_eq!(plan[0].to, b);
    }

    #[test]
    fn test_dangling_ends_on_different_sides_without_corner_fail() {
        let points = [DVec2::new(5.0, 5.0), DVec2::new(1.0, 1.0)];
        let mut graph = Graph::new(ten_box(), DEFAULT_TOLERANCE, &points);
        let a = graph.add_vertex(DVec2::new(3.0, 0.0), VertexKind::Clipped);
        let b = graph.add_vertex(DVec2::new(0.0, 3.0), VertexKind::Clipped);
        graph.link_edge(CellId(0), Some(CellId(1)), a, b);

        // Cell 1 owns the bottom-left corner but is handed none here
        let result = plan_arcs(&graph, CellId(1), &[a, b], &[]);
        assert!(matches!(result, Err(VoronoiError::Stitching { cell: 1, .. })));
    }

    #[test]
    fn test_corner_already_on_cell_is_not_owned_twice() {
        let points = [DVec2::new(1.0, 1.0), DVec2::new(6.0, 6.0)];
        let mut graph = Graph::new(ten_box(), DEFAULT_TOLERANCE, &points);
        let corner = graph.corner_vertex(0);
        let other = graph.add_vertex(DVec2::new(4.0, 4.0), VertexKind::Voronoi);
        graph.link_edge(CellId(0), Some(CellId(1)), corner, other);

        let owners = corner_owners(&graph);
        assert_eq!(owners[0], 0);
        assert!(owned_corners(&graph, CellId(0), &owners).is_empty());
    }
}
