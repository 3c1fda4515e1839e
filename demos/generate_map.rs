//! Example: Generate a bounded Voronoi map
//!
//! Run with `RUST_LOG=debug` to see the build passes.

use bounded_voronoi::*;

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Bounded Voronoi Map Example");
    println!("===========================\n");

    // Step 1: Configure map
    let config = MapConfigBuilder::new()
        .seed(12345)
        .point_count(1000)?
        .size(800.0, 600.0)?
        .relaxation_iterations(3)?
        .build()?;

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Points: {}", config.point_count);
    println!("  Size: {} x {}", config.width, config.height);
    println!("  Relaxation passes: {}", config.relaxation_iterations);

    // Step 2: Generate map
    let map = VoronoiMap::generate(config)?;
    let diagram = map.diagram();
    println!("\nGenerated:");
    println!("  Cells: {}", diagram.cell_count());
    println!("  Vertices: {}", diagram.vertex_count());
    println!("  Edges: {}", diagram.edge_count());
    println!("  Border cells: {}", map.border_cells().count());

    // Step 3: Cell statistics
    let areas: Vec<f64> = map.cells().iter().map(Cell::area).collect();
    let total: f64 = areas.iter().sum();
    let (min, max) = areas
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &a| (lo.min(a), hi.max(a)));
    println!("\nCell areas:");
    println!("  Total: {:.1} (map {:.1})", total, config.width * config.height);
    println!("  Mean: {:.1}", total / areas.len() as f64);
    println!("  Range: {:.1} - {:.1}", min, max);

    // Step 4: Queries
    #[cfg(feature = "spatial-index")]
    {
        let center = map.bounding_box().center();
        let id = map.find_cell_at(center);
        println!("\nQueries:");
        println!("  Map centre {} -> cell {}", center, id.index());
        println!("  Neighbours: {}", map.get_neighbors(id).len());
        println!(
            "  Cells within 3 hops: {}",
            map.find_cells_within_radius(id, 3).len()
        );
    }

    Ok(())
}
