//! Planar joint geometry.
//!
//! Landmarks arrive as normalized image coordinates (origin top-left,
//! y increasing downward). The angle at a joint only depends on relative
//! positions, so no de-normalization is needed.

use serde::{Deserialize, Serialize};

use crate::types::Degrees;

/// Segments shorter than this are treated as zero-length.
const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// A 2D point in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Angle in degrees formed at vertex `b` by the rays `b -> a` and `b -> c`.
///
/// Uses the difference of the two ray headings (`atan2`), folded into
/// `[0, 180]` by reflecting anything above 180 as `360 - angle`. Returns
/// `0.0` when either ray has zero length (or a coordinate is not finite),
/// since such a configuration carries no angular information.
pub fn angle_at_vertex(a: Point2, b: Point2, c: Point2) -> Degrees {
    let ray_a = a.distance_to(&b);
    let ray_c = c.distance_to(&b);
    if !(ray_a > MIN_SEGMENT_LENGTH && ray_c > MIN_SEGMENT_LENGTH) {
        return 0.0;
    }

    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}
