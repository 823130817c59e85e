use crate::core::domain::{Body, Mobile};
use crate::core::spatial::Bounds;

/// Frame rate the speed scale is expressed in: one unit of speed moves a
/// particle by one velocity length per 1/60 s.
pub const REFERENCE_FRAME_RATE: f64 = 60.0;

/// Converts a wall-clock step into reference frames.
#[inline]
pub fn frames_for(dt: f64) -> f64 {
    (dt * REFERENCE_FRAME_RATE).max(0.0)
}

/// Advances every active particle by `velocity * speed * frames`, then
/// reflects it off the walls.
pub fn integrate<M: Mobile>(particles: &mut [M], speed: f64, frames: f64, bounds: &Bounds) {
    let scale = speed * frames;
    for p in particles.iter_mut().filter(|p| p.is_active()) {
        let body = p.body_mut();
        body.position += body.velocity * scale;
        reflect_walls(body, bounds);
    }
}

/// Re-applies wall reflection without moving anything. Used after passes
/// that may have pushed particles past a wall.
pub fn contain<M: Mobile>(particles: &mut [M], bounds: &Bounds) {
    for p in particles.iter_mut().filter(|p| p.is_active()) {
        reflect_walls(p.body_mut(), bounds);
    }
}

/// Elastic reflection against the four axis-aligned walls. The envelope
/// radius acts as the margin.
pub fn reflect_walls(body: &mut Body, bounds: &Bounds) {
    let r = body.envelope;
    let (max_x, max_y) = (bounds.width - r, bounds.height - r);

    if body.position.x < r {
        body.position.x = r;
        body.velocity.x = -body.velocity.x;
    } else if body.position.x > max_x {
        body.position.x = max_x.max(r);
        body.velocity.x = -body.velocity.x;
    }

    if body.position.y < r {
        body.position.y = r;
        body.velocity.y = -body.velocity.y;
    } else if body.position.y > max_y {
        body.position.y = max_y.max(r);
        body.velocity.y = -body.velocity.y;
    }
}
