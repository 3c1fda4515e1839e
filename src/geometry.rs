//! Planar geometry primitives
//!
//! Segment intersection and the axis-aligned [`BoundingBox`] every diagram
//! is clipped against.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Default relative tolerance for degeneracy tests
///
/// Parallel-segment tests scale it by the product of the segment lengths,
/// diagram construction scales it by the box diagonal.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Rotate a vector 90 degrees counter-clockwise
#[inline]
pub fn perp(v: DVec2) -> DVec2 {
    DVec2::new(-v.y, v.x)
}

/// Intersection point of segments `a-b` and `c-d`
///
/// Returns `None` when the segments are parallel or when the crossing lies
/// outside either segment. Uses [`DEFAULT_TOLERANCE`] for the parallel test.
///
/// # Example
///
/// ```
/// use bounded_voronoi::geometry::intersect;
/// use glam::DVec2;
///
/// let p = intersect(
///     DVec2::new(0.0, 0.0),
///     DVec2::new(2.0, 2.0),
///     DVec2::new(0.0, 2.0),
///     DVec2::new(2.0, 0.0),
/// );
/// assert_eq!(p, Some(DVec2::new(1.0, 1.0)));
/// ```
pub fn intersect(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> Option<DVec2> {
    intersect_with_tolerance(a, b, c, d, DEFAULT_TOLERANCE)
}

/// Intersection of segments `a-b` and `c-d` with an explicit parallel tolerance
///
/// The segments count as parallel when `|perp(d - c) . (b - a)|` is at most
/// `tolerance * |b - a| * |d - c|`, i.e. when the sine of the angle between
/// them is below `tolerance`. Zero-length segments never intersect.
///
/// The returned point is `a + (b - a) * t`, so a coordinate that is constant
/// along the first segment is reproduced exactly.
pub fn intersect_with_tolerance(
    a: DVec2,
    b: DVec2,
    c: DVec2,
    d: DVec2,
    tolerance: f64,
) -> Option<DVec2> {
    let k1 = b - a;
    let k2 = d - c;
    let k1p = perp(k1);
    let k2p = perp(k2);

    let de_t = k2p.dot(k1);
    let de_u = k1p.dot(k2);
    let limit = tolerance * k1.length() * k2.length();
    if de_t.abs() <= limit || de_u.abs() <= limit {
        return None;
    }

    let t = k2p.dot(c - a) / de_t;
    let u = k1p.dot(a - c) / de_u;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a + k1 * t)
    } else {
        None
    }
}

/// Signed area of a closed polygon (positive when counter-clockwise)
pub fn signed_area(points: &[DVec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        sum += p.perp_dot(q);
    }
    0.5 * sum
}

/// One of the four sides of a [`BoundingBox`]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bottom,
    Left,
    Top,
    Right,
}

impl Side {
    /// All sides, in the order [`BoundingBox::sides`] reports them
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Left, Side::Top, Side::Right];
}

/// Axis-aligned clip rectangle
///
/// Built from a bottom-left origin and a positive width and height.
/// Containment is inclusive of the boundary.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: DVec2,
    max: DVec2,
}

impl BoundingBox {
    /// Create a box from its bottom-left corner and extent
    ///
    /// # Errors
    ///
    /// Returns `InvalidBoundingBox` unless width and height are finite and
    /// positive, and `InvalidConfig` for a non-finite origin.
    pub fn new(origin: DVec2, width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(VoronoiError::InvalidBoundingBox { width, height });
        }
        if !origin.is_finite() {
            return Err(VoronoiError::InvalidConfig(format!(
                "bounding box origin must be finite (got {origin})"
            )));
        }
        Ok(Self {
            min: origin,
            max: origin + DVec2::new(width, height),
        })
    }

    /// Create a box with its bottom-left corner at the origin
    pub fn from_size(width: f64, height: f64) -> Result<Self> {
        Self::new(DVec2::ZERO, width, height)
    }

    #[inline]
    pub fn min(&self) -> DVec2 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> DVec2 {
        self.max
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn bottom_left(&self) -> DVec2 {
        self.min
    }

    #[inline]
    pub fn bottom_right(&self) -> DVec2 {
        DVec2::new(self.max.x, self.min.y)
    }

    #[inline]
    pub fn top_left(&self) -> DVec2 {
        DVec2::new(self.min.x, self.max.y)
    }

    #[inline]
    pub fn top_right(&self) -> DVec2 {
        self.max
    }

    /// Centre of the box
    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Length of the box diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.min.distance(self.max)
    }

    /// Corners in counter-clockwise order starting at the bottom-left
    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.bottom_left(),
            self.bottom_right(),
            self.top_right(),
            self.top_left(),
        ]
    }

    /// The four boundary segments: bottom, left, top, right
    pub fn sides(&self) -> [(DVec2, DVec2); 4] {
        [
            (self.bottom_left(), self.bottom_right()),
            (self.bottom_left(), self.top_left()),
            (self.top_left(), self.top_right()),
            (self.bottom_right(), self.top_right()),
        ]
    }

    /// Inclusive containment test
    #[inline]
    pub fn inside(&self, p: DVec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Intersections of segment `a-b` with the box boundary
    ///
    /// Returns 0, 1 or 2 points. A segment passing exactly through a corner
    /// hits two sides at the same point, which is reported once.
    pub fn intersect(&self, a: DVec2, b: DVec2) -> Vec<DVec2> {
        let mut hits: Vec<DVec2> = Vec::with_capacity(2);
        for (c, d) in self.sides() {
            if let Some(p) = intersect(c, d, a, b) {
                if !hits.contains(&p) {
                    hits.push(p);
                }
            }
        }
        hits
    }

    /// Whether `p` lies on `side` within an absolute tolerance
    pub fn on_side(&self, p: DVec2, side: Side, tolerance: f64) -> bool {
        match side {
            Side::Bottom => (p.y - self.min.y).abs() <= tolerance,
            Side::Left => (p.x - self.min.x).abs() <= tolerance,
            Side::Top => (p.y - self.max.y).abs() <= tolerance,
            Side::Right => (p.x - self.max.x).abs() <= tolerance,
        }
    }

    /// A side both points lie on, if any
    pub fn common_side(&self, a: DVec2, b: DVec2, tolerance: f64) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|&side| self.on_side(a, side, tolerance) && self.on_side(b, side, tolerance))
    }

    /// Index into [`corners`](Self::corners) of the corner within `tolerance` of `p`
    pub fn corner_at(&self, p: DVec2, tolerance: f64) -> Option<usize> {
        self.corners()
            .iter()
            .position(|corner| corner.distance(p) <= tolerance)
    }
}
