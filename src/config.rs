//! Map Configuration and Builder
//!
//! Everything needed to regenerate a map deterministically: seed, point
//! count, map size, relaxation settings and the geometric tolerance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::{BoundingBox, DEFAULT_TOLERANCE};

const DEFAULT_POINT_COUNT: usize = 2048;
const DEFAULT_SIZE: f64 = 800.0;
const DEFAULT_RELAXATION_ITERATIONS: usize = 2;
const MAX_RELAXATION_ITERATIONS: usize = 20;
const MAX_TOLERANCE: f64 = 1e-3;

/// Configuration for deterministic map generation
///
/// The same configuration always produces the identical diagram.
///
/// # Example
///
/// ```rust
/// use bounded_voronoi::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .point_count(500)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: MapConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Random seed for point placement
    pub seed: u32,

    /// Number of seed points, one cell each
    pub point_count: usize,

    /// Map width; the map spans `[0, width]` on the x axis
    pub width: f64,

    /// Map height; the map spans `[0, height]` on the y axis
    pub height: f64,

    /// Number of Lloyd's relaxation passes
    ///
    /// - 0: raw random cells (irregular)
    /// - 2: default, noticeably more even
    /// - 5+: close to a honeycomb, slower
    pub relaxation_iterations: usize,

    /// Early-exit threshold for relaxation, as a fraction of the map
    /// diagonal; 0.0 disables early termination
    pub relaxation_convergence: f64,

    /// Relative tolerance for geometric coincidence tests
    pub tolerance: f64,
}

impl MapConfig {
    /// The map rectangle, anchored at the origin
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_size(self.width, self.height)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().into_config()
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use bounded_voronoi::*;
///
/// // Use defaults
/// let config = MapConfigBuilder::new().build().unwrap();
/// assert_eq!(config.point_count, 2048);
///
/// // Customize
/// let config = MapConfigBuilder::new()
///     .seed(12345)
///     .size(1024.0, 768.0)
///     .unwrap()
///     .relaxation_iterations(4)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.width, 1024.0);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u32>,
    point_count: usize,
    width: f64,
    height: f64,
    relaxation_iterations: usize,
    relaxation_convergence: f64,
    tolerance: f64,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: random
    /// - point_count: 2048
    /// - size: 800 x 800
    /// - relaxation_iterations: 2
    /// - relaxation_convergence: 0.0 (run every pass)
    /// - tolerance: 1e-9
    pub fn new() -> Self {
        Self {
            seed: None,
            point_count: DEFAULT_POINT_COUNT,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            relaxation_iterations: DEFAULT_RELAXATION_ITERATIONS,
            relaxation_convergence: 0.0,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Set the random seed for point placement
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of seed points
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `count < 3`
    pub fn point_count(mut self, count: usize) -> Result<Self> {
        if count < 3 {
            return Err(VoronoiError::InvalidConfig(format!(
                "point count must be >= 3 (got {count})"
            )));
        }
        self.point_count = count;
        Ok(self)
    }

    /// Set the map dimensions
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless both are finite and positive
    pub fn size(mut self, width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(VoronoiError::InvalidConfig(format!(
                "map size must be finite and positive (got {width} x {height})"
            )));
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the number of Lloyd's relaxation passes
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20
    pub fn relaxation_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > MAX_RELAXATION_ITERATIONS {
            return Err(VoronoiError::InvalidConfig(format!(
                "relaxation iterations must be <= {MAX_RELAXATION_ITERATIONS} (got {iterations})"
            )));
        }
        self.relaxation_iterations = iterations;
        Ok(self)
    }

    /// Set the relaxation early-exit threshold (fraction of the diagonal)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the threshold is negative or NaN
    pub fn relaxation_convergence(mut self, threshold: f64) -> Result<Self> {
        if !(threshold >= 0.0) || !threshold.is_finite() {
            return Err(VoronoiError::InvalidConfig(format!(
                "relaxation convergence must be finite and >= 0 (got {threshold})"
            )));
        }
        self.relaxation_convergence = threshold;
        Ok(self)
    }

    /// Set the relative geometric tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < tolerance <= 1e-3`
    pub fn tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !(tolerance > 0.0 && tolerance <= MAX_TOLERANCE) {
            return Err(VoronoiError::InvalidConfig(format!(
                "tolerance must be in (0, {MAX_TOLERANCE}] (got {tolerance})"
            )));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is drawn.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the size and tolerance together give no
    /// usable coincidence distance (the diagonal overflows, or the scaled
    /// tolerance underflows to zero or a subnormal)
    pub fn build(self) -> Result<MapConfig> {
        let config = self.into_config();
        let epsilon = config.tolerance * config.bounding_box()?.diagonal();
        if !epsilon.is_normal() {
            return Err(VoronoiError::InvalidConfig(format!(
                "tolerance {} on a {} x {} map gives coincidence distance {epsilon}",
                config.tolerance, config.width, config.height
            )));
        }
        Ok(config)
    }

    fn into_config(self) -> MapConfig {
        MapConfig {
            seed: self.seed.unwrap_or_else(rand::random),
            point_count: self.point_count,
            width: self.width,
            height: self.height,
            relaxation_iterations: self.relaxation_iterations,
            relaxation_convergence: self.relaxation_convergence,
            tolerance: self.tolerance,
        }
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
