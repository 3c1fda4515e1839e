//! Spatial indexing for fast position-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Wrapper around a KD-tree of cell sites
///
/// The nearest site to a point owns the Voronoi cell containing it, so a
/// nearest-neighbour query answers "which cell is this point in" in
/// O(log n) without touching cell polygons.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

impl SpatialIndex {
    /// Build the index from cell sites, in cell id order
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_voronoi::SpatialIndex;
    /// use glam::DVec2;
    ///
    /// let sites = [DVec2::new(1.0, 1.0), DVec2::new(8.0, 2.0), DVec2::new(4.0, 9.0)];
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec2::new(7.0, 3.0)), 1);
    /// ```
    pub fn new(sites: &[DVec2]) -> Self {
        let points: Vec<[f64; 2]> = sites.iter().map(|s| [s.x, s.y]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
        }
    }

    /// Index of the site nearest to `point`
    pub fn find_nearest(&self, point: DVec2) -> usize {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&[point.x, point.y]);
        result.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::generate_points;
    use crate::geometry::BoundingBox;

    #[test]
    fn test_spatial_index_basic() {
        let sites = vec![
            DVec2::new(1.0, 1.0),
            DVec2::new(9.0, 1.0),
            DVec2::new(9.0, 9.0),
            DVec2::new(1.0, 9.0),
        ];
        let index = SpatialIndex::new(&sites);

        assert_eq!(index.find_nearest(DVec2::new(2.0, 0.5)), 0);
        assert_eq!(index.find_nearest(DVec2::new(8.0, 3.0)), 1);
        assert_eq!(index.find_nearest(DVec2::new(6.0, 7.0)), 2);
        assert_eq!(index.find_nearest(DVec2::new(0.0, 10.0)), 3);
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let sites = vec![DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)];
        let index = SpatialIndex::new(&sites);

        assert_eq!(index.find_nearest(sites[0]), 0);
        assert_eq!(index.find_nearest(sites[1]), 1);
    }

    #[test]
    fn test_matches_linear_scan() {
        let bbox = BoundingBox::from_size(100.0, 100.0).unwrap();
        let sites = generate_points(500, bbox, 11);
        let index = SpatialIndex::new(&sites);

        for query in generate_points(200, bbox, 12) {
            let expected = sites
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    a.1.distance_squared(query)
                        .total_cmp(&b.1.distance_squared(query))
                })
                .map(|(i, _)| i)
                .unwrap();
            let found = index.find_nearest(query);
            // Equidistant sites may resolve either way
            assert_eq!(
                sites[found].distance_squared(query),
                sites[expected].distance_squared(query)
            );
        }
    }
}
