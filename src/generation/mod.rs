//! Map generation pipeline
//!
//! Random seeds in the map rectangle, optionally relaxed with Lloyd's
//! algorithm, then built into a bounded diagram.

mod lloyd;
mod points;

pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use points::generate_points;

use crate::config::MapConfig;
use crate::diagram::{DiagramBuilder, VoronoiDiagram};
use crate::error::Result;

/// Generate the diagram described by `config`
pub fn generate_diagram(config: &MapConfig) -> Result<VoronoiDiagram> {
    let bbox = config.bounding_box()?;

    // Step 1: Random seed points
    let points = generate_points(config.point_count, bbox, u64::from(config.seed));

    // Step 2: Lloyd's relaxation with convergence detection
    let points = if config.relaxation_iterations > 0 {
        let options = LloydOptions {
            max_iterations: config.relaxation_iterations,
            convergence_threshold: config.relaxation_convergence,
        };
        lloyd_relaxation_with_options(points, bbox, options, config.tolerance)?
    } else {
        points
    };

    // Step 3: Final diagram from the relaxed seeds
    let diagram = DiagramBuilder::new(bbox)
        .tolerance(config.tolerance)
        .build(&points)?;
    tracing::info!(
        seed = config.seed,
        cells = diagram.cell_count(),
        edges = diagram.edge_count(),
        "generated voronoi map"
    );
    Ok(diagram)
}
