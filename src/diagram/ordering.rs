//! Pass 5: walk each cell's edges into a counter-clockwise polygon

use std::f64::consts::{PI, TAU};

use glam::DVec2;

use super::builder::Graph;
use super::{CellId, EdgeId, VertexId};
use crate::error::{Result, VoronoiError};
use crate::geometry::signed_area;

pub(super) fn order_boundaries(graph: &mut Graph) -> Result<()> {
    for index in 0..graph.cells.len() {
        let boundary = walk_cell(graph, CellId(index))?;
        graph.cells[index].boundary = boundary;
    }
    Ok(())
}

/// Boundary of `cell`, starting at its lowest-x (then lowest-y) vertex
fn walk_cell(graph: &Graph, cell: CellId) -> Result<Vec<DVec2>> {
    let fail = |reason: String| VoronoiError::Traversal {
        cell: cell.0,
        reason,
    };
    let edges = &graph.cells[cell.0].edges;
    let point = |v: VertexId| graph.vertices[v.0].point;

    let start = edges
        .iter()
        .flat_map(|e| graph.edges[e.0].vertices())
        .min_by(|&a, &b| {
            let (pa, pb) = (point(a), point(b));
            pa.x.total_cmp(&pb.x).then(pa.y.total_cmp(&pb.y))
        })
        .ok_or_else(|| fail("cell does not intersect the bounding box".to_string()))?;

    let mut points = Vec::with_capacity(edges.len());
    let mut current = start;
    let mut previous: Option<EdgeId> = None;
    loop {
        points.push(point(current));

        let next = graph
            .cell_edges_at(current, cell)
            .find(|&e| Some(e) != previous)
            .ok_or_else(|| fail(format!("walk stuck at vertex {}", current.0)))?;
        current = graph.edges[next.0].other(current);
        previous = Some(next);

        if current == start {
            break;
        }
        if points.len() >= edges.len() {
            return Err(fail("boundary does not close".to_string()));
        }
    }

    if points.len() != edges.len() {
        return Err(fail(format!(
            "boundary closed after {} of {} edges",
            points.len(),
            edges.len()
        )));
    }

    let area = signed_area(&points);
    if area.abs() <= graph.epsilon * graph.bbox.diagonal() {
        return Err(fail("boundary encloses no area".to_string()));
    }
    if area < 0.0 {
        points[1..].reverse();
    }
    if let Some(reason) = convexity_defect(&points, graph.epsilon) {
        return Err(fail(reason));
    }
    Ok(points)
}

/// Why a counter-clockwise boundary is not a simple convex polygon, if it isn't
///
/// Voronoi cells are convex, so a reflex turn, a back-tracking vertex or a
/// boundary that winds more than once means the graph is wrong. Turns at
/// edges shorter than `epsilon` are too noisy to judge and are skipped.
fn convexity_defect(points: &[DVec2], epsilon: f64) -> Option<String> {
    let n = points.len();
    let mut turning = 0.0;
    for k in 0..n {
        let (a, b, c) = (points[k], points[(k + 1) % n], points[(k + 2) % n]);
        let (incoming, outgoing) = (b - a, c - b);
        let cross = incoming.perp_dot(outgoing);
        let dot = incoming.dot(outgoing);
        turning += cross.atan2(dot);

        let (len_in, len_out) = (incoming.length(), outgoing.length());
        if len_in <= epsilon || len_out <= epsilon {
            continue;
        }
        // Offset of the nearer neighbour from the other edge's line
        let offset = cross / len_in.max(len_out);
        if offset < -epsilon {
            return Some(format!("reflex turn at ({}, {})", b.x, b.y));
        }
        if offset.abs() <= epsilon && dot < 0.0 {
            return Some(format!("boundary doubles back at ({}, {})", b.x, b.y));
        }
    }

    if (turning - TAU).abs() > PI {
        return Some(format!(
            "boundary winds {:.0} times",
            turning / TAU
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::VertexKind;
    use crate::geometry::{BoundingBox, DEFAULT_TOLERANCE};

    fn unit_graph() -> Graph {
        let bbox = BoundingBox::from_size(10.0, 10.0).unwrap();
        Graph::new(bbox, DEFAULT_TOLERANCE, &[DVec2::new(5.0, 5.0)])
    }

    fn add_loop(graph: &mut Graph, points: &[DVec2]) {
        let ids: Vec<VertexId> = points
            .iter()
            .map(|&p| graph.add_vertex(p, VertexKind::Voronoi))
            .collect();
        for k in 0..ids.len() {
            graph.link_edge(CellId(0), None, ids[k], ids[(k + 1) % ids.len()]);
        }
    }

    #[test]
    fn test_clockwise_loop_is_reversed_keeping_start() {
        let mut graph = unit_graph();
        add_loop(
            &mut graph,
            &[
                DVec2::new(2.0, 2.0),
                DVec2::new(2.0, 8.0),
                DVec2::new(8.0, 8.0),
                DVec2::new(8.0, 2.0),
            ],
        );
        order_boundaries(&mut graph).unwrap();

        assert_eq!(
            graph.cells[0].boundary,
            vec![
                DVec2::new(2.0, 2.0),
                DVec2::new(8.0, 2.0),
                DVec2::new(8.0, 8.0),
                DVec2::new(2.0, 8.0),
            ]
        );
        assert!(signed_area(&graph.cells[0].boundary) > 0.0);
    }

    #[test]
    fn test_start_is_lowest_x_then_lowest_y() {
        let mut graph = unit_graph();
        add_loop(
            &mut graph,
            &[
                DVec2::new(7.0, 1.0),
                DVec2::new(9.0, 6.0),
                DVec2::new(1.0, 6.0),
                DVec2::new(1.0, 3.0),
            ],
        );
        order_boundaries(&mut graph).unwrap();
        assert_eq!(graph.cells[0].boundary[0], DVec2::new(1.0, 3.0));
        assert_eq!(graph.cells[0].boundary[1], DVec2::new(7.0, 1.0));
    }

    #[test]
    fn test_cell_without_edges_fails() {
        let mut graph = unit_graph();
        let result = order_boundaries(&mut graph);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 0, .. })));
    }

    #[test]
    fn test_open_chain_fails() {
        let mut graph = unit_graph();
        let a = graph.add_vertex(DVec2::new(1.0, 1.0), VertexKind::Voronoi);
        let b = graph.add_vertex(DVec2::new(5.0, 1.0), VertexKind::Voronoi);
        let c = graph.add_vertex(DVec2::new(5.0, 5.0), VertexKind::Voronoi);
        graph.link_edge(CellId(0), None, a, b);
        graph.link_edge(CellId(0), None, b, c);

        let result = order_boundaries(&mut graph);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 0, .. })));
    }

    #[test]
    fn test_two_separate_loops_fail() {
        let mut graph = unit_graph();
        add_loop(
            &mut graph,
            &[DVec2::new(1.0, 1.0), DVec2::new(3.0, 1.0), DVec2::new(2.0, 3.0)],
        );
        add_loop(
            &mut graph,
            &[DVec2::new(6.0, 6.0), DVec2::new(8.0, 6.0), DVec2::new(7.0, 8.0)],
        );
        let result = order_boundaries(&mut graph);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 0, .. })));
    }

    #[test]
    fn test_reflex_loop_fails() {
        let mut graph = unit_graph();
        add_loop(
            &mut graph,
            &[
                DVec2::new(1.0, 1.0),
                DVec2::new(9.0, 1.0),
                DVec2::new(9.0, 9.0),
                DVec2::new(5.0, 4.0),
            ],
        );
        let result = order_boundaries(&mut graph);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 0, .. })));
    }

    #[test]
    fn test_backtracking_loop_fails() {
        // Encloses area, but runs along the bottom out to x = 10 and back
        let mut graph = unit_graph();
        add_loop(
            &mut graph,
            &[
                DVec2::new(1.0, 0.0),
                DVec2::new(10.0, 0.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(2.0, 1.0),
            ],
        );
        let result = order_boundaries(&mut graph);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 0, .. })));
    }

    #[test]
    fn test_star_loop_fails() {
        // Pentagram: every turn is left but the boundary winds twice
        let mut graph = unit_graph();
        let star: Vec<DVec2> = [0, 2, 4, 1, 3]
            .iter()
            .map(|&k| {
                let angle = std::f64::consts::FRAC_PI_2 + k as f64 * TAU / 5.0;
                DVec2::new(5.0, 5.0) + 4.0 * DVec2::new(angle.cos(), angle.sin())
            })
            .collect();
        add_loop(&mut graph, &star);
        let result = order_boundaries(&mut graph);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 0, .. })));
    }

    #[test]
    fn test_collinear_vertex_on_a_side_is_accepted() {
        let mut graph = unit_graph();
        add_loop(
            &mut graph,
            &[
                DVec2::new(2.0, 2.0),
                DVec2::new(5.0, 2.0),
                DVec2::new(8.0, 2.0),
                DVec2::new(8.0, 8.0),
                DVec2::new(2.0, 8.0),
            ],
        );
        order_boundaries(&mut graph).unwrap();
        assert_eq!(graph.cells[0].boundary.len(), 5);
    }

    #[test]
    fn test_flat_loop_fails() {
        let mut graph = unit_graph();
        add_loop(
            &mut graph,
            &[DVec2::new(1.0, 1.0), DVec2::new(5.0, 1.0), DVec2::new(9.0, 1.0)],
        );
        let result = order_boundaries(&mut graph);
        assert!(matches!(result, Err(VoronoiError::Traversal { cell: 0, .. })));
    }
}
