//! Lloyd's Relaxation for uniform point distribution
//!
//! Each iteration builds the bounded diagram of the current seeds and moves
//! every seed to the area centroid of its cell. Cells are convex and lie in
//! the box, so relaxed seeds never leave it.

use std::time::Instant;

use glam::DVec2;

use crate::diagram::DiagramBuilder;
use crate::error::Result;
use crate::geometry::{BoundingBox, DEFAULT_TOLERANCE};

/// Options for Lloyd's relaxation algorithm
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Stop once the largest displacement falls below this fraction of the
    /// box diagonal; `0.0` always runs every iteration
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            convergence_threshold: 0.0,
        }
    }
}

/// Apply a fixed number of relaxation passes
///
/// # Example
///
/// ```
/// use bounded_voronoi::{generate_points, lloyd_relaxation, BoundingBox};
///
/// let bbox = BoundingBox::from_size(100.0, 100.0).unwrap();
/// let points = generate_points(50, bbox, 3);
/// let relaxed = lloyd_relaxation(points, bbox, 2).unwrap();
/// assert_eq!(relaxed.len(), 50);
/// ```
pub fn lloyd_relaxation(
    points: Vec<DVec2>,
    bbox: BoundingBox,
    iterations: usize,
) -> Result<Vec<DVec2>> {
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(points, bbox, options, DEFAULT_TOLERANCE)
}

/// Apply relaxation with convergence detection
///
/// `tolerance` is passed to every intermediate diagram build.
pub fn lloyd_relaxation_with_options(
    points: Vec<DVec2>,
    bbox: BoundingBox,
    options: LloydOptions,
    tolerance: f64,
) -> Result<Vec<DVec2>> {
    relax(points, bbox, options, tolerance).map(|(points, _)| points)
}

/// Relaxed points plus the number of iterations actually run
fn relax(
    mut points: Vec<DVec2>,
    bbox: BoundingBox,
    options: LloydOptions,
    tolerance: f64,
) -> Result<(Vec<DVec2>, usize)> {
    let builder = DiagramBuilder::new(bbox).tolerance(tolerance);
    let threshold = options.convergence_threshold * bbox.diagonal();
    let total_start = Instant::now();

    tracing::debug!(
        points = points.len(),
        max_iterations = options.max_iterations,
        threshold,
        "starting lloyd relaxation"
    );

    let mut iterations_run = 0;
    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let diagram = builder.build(&points)?;

        let mut max_displacement: f64 = 0.0;
        for (point, cell) in points.iter_mut().zip(diagram.cells()) {
            let centroid = cell.centroid();
            max_displacement = max_displacement.max(point.distance(centroid));
            *point = centroid;
        }
        iterations_run = iteration + 1;

        tracing::trace!(
            iteration = iterations_run,
            max_displacement,
            elapsed = ?iter_start.elapsed(),
            "lloyd iteration"
        );

        if threshold > 0.0 && max_displacement < threshold {
            tracing::debug!(iteration = iterations_run, max_displacement, "lloyd converged");
            break;
        }
    }

    tracing::info!(
        iterations = iterations_run,
        max_iterations = options.max_iterations,
        elapsed = ?total_start.elapsed(),
        "finished lloyd relaxation"
    );
    Ok((points, iterations_run))
}
