//! Seed point generation

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::geometry::BoundingBox;

/// Generate `count` points uniformly distributed inside `bbox`
///
/// Uses a seeded ChaCha8 RNG, so the same seed always yields the same points
/// on every platform.
///
/// # Example
///
/// ```
/// use bounded_voronoi::{generate_points, BoundingBox};
///
/// let bbox = BoundingBox::from_size(800.0, 600.0).unwrap();
/// let points = generate_points(100, bbox, 42);
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|&p| bbox.inside(p)));
/// ```
pub fn generate_points(count: usize, bbox: BoundingBox, seed: u64) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (min, max) = (bbox.min(), bbox.max());

    (0..count)
        .map(|_| {
            DVec2::new(
                rng.gen_range(min.x..max.x),
                rng.gen_range(min.y..max.y),
            )
        })
        .collect()
}
