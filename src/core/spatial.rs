use nalgebra::{Point2, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Below this separation two centres are treated as coincident.
pub const DEGENERATE_DISTANCE: f64 = 1e-6;

/// Axis-aligned simulation box. Origin top-left, `y` grows towards the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if a disc of `radius` at `p` lies fully inside the box.
    pub fn contains(&self, p: &Point2<f64>, radius: f64) -> bool {
        p.x >= radius - 1e-9
            && p.x <= self.width - radius + 1e-9
            && p.y >= radius - 1e-9
            && p.y <= self.height - radius + 1e-9
    }

    /// Clamps `p` so a disc of `radius` fits inside the box.
    pub fn confine(&self, p: &Point2<f64>, radius: f64) -> Point2<f64> {
        Point2::new(
            clamp(p.x, radius, self.width - radius),
            clamp(p.y, radius, self.height - radius),
        )
    }
}

/// Uniform sample in `[min, max)`. A collapsed or inverted range yields `min`.
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// Like `f64::clamp` but never panics when the range is inverted
/// (a box narrower than a particle); `lo` wins in that case.
#[inline]
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(x))
}

#[inline]
pub fn distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    nalgebra::distance(a, b)
}

#[inline]
pub fn distance_sq(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    nalgebra::distance_squared(a, b)
}

/// Unit vector along `v`, or `None` for a (near) zero vector.
#[inline]
pub fn normalize(v: &Vector2<f64>) -> Option<Vector2<f64>> {
    v.try_normalize(DEGENERATE_DISTANCE)
}

/// Random direction of unit length.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector2<f64> {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    Vector2::new(angle.cos(), angle.sin())
}
