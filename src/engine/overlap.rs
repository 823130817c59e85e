use rand::Rng;

use crate::core::domain::Mobile;
use crate::core::spatial::{self, Bounds};
use crate::engine::motion;

/// Separation given to coincident centres before relaxing them.
pub const COINCIDENT_NUDGE: f64 = 1e-3;

/// Penetration below this counts as settled.
pub const SETTLE_TOLERANCE: f64 = 1e-9;

/// One relaxation pass over every unordered pair of active particles.
///
/// Intersecting pairs are pushed apart along their centre line, each by
/// half the penetration depth. Coincident centres are skipped. With three
/// or more mutually overlapping particles a single pass does not reach
/// zero overlap; repeated passes converge.
///
/// Returns the deepest penetration seen during the pass.
pub fn resolve_pass<M: Mobile>(particles: &mut [M]) -> f64 {
    let n = particles.len();
    let mut deepest = 0.0_f64;

    for i in 0..n {
        if !particles[i].is_active() {
            continue;
        }
        for j in (i + 1)..n {
            if !particles[j].is_active() {
                continue;
            }

            let (left, right) = particles.split_at_mut(j);
            let a = left[i].body_mut();
            let b = right[0].body_mut();

            let min_dist = a.envelope + b.envelope;
            let delta = b.position - a.position;
            let dist = delta.norm();
            if dist >= min_dist {
                continue;
            }

            // Coincident centres have no separation direction.
            let Some(dir) = spatial::normalize(&delta) else {
                continue;
            };

            let penetration = min_dist - dist;
            deepest = deepest.max(penetration);

            let push = dir * (penetration * 0.5);
            a.position -= push;
            b.position += push;
        }
    }

    deepest
}

/// Runs up to `passes` relaxation passes, containing particles inside the
/// walls after each. Stops early once no pair overlaps by more than
/// [`SETTLE_TOLERANCE`].
///
/// Wall containment can clamp two particles onto the same corner point,
/// which `resolve_pass` would then skip forever, so coincident pairs are
/// nudged apart in a random direction before every pass.
///
/// Returns the number of passes actually run.
pub fn settle<M: Mobile, R: Rng + ?Sized>(particles: &mut [M], bounds: &Bounds, passes: usize, rng: &mut R) -> usize {
    for pass in 0..passes {
        let nudged = separate_coincident(particles, rng);
        let deepest = resolve_pass(particles);
        motion::contain(particles, bounds);
        if deepest <= SETTLE_TOLERANCE && nudged == 0 {
            return pass + 1;
        }
    }
    passes
}

/// Moves the second particle of every coincident active pair by
/// [`COINCIDENT_NUDGE`]. Returns the number of pairs moved.
pub fn separate_coincident<M: Mobile, R: Rng + ?Sized>(particles: &mut [M], rng: &mut R) -> usize {
    let mut nudged = 0;
    for i in 0..particles.len() {
        if !particles[i].is_active() {
            continue;
        }
        for j in (i + 1)..particles.len() {
            if !particles[j].is_active() {
                continue;
            }
            let (left, right) = particles.split_at_mut(j);
            let a = left[i].body();
            let b = right[0].body_mut();
            if spatial::distance(&a.position, &b.position) < spatial::DEGENERATE_DISTANCE {
                b.position += spatial::random_direction(rng) * COINCIDENT_NUDGE;
                nudged += 1;
            }
        }
    }
    nudged
}

/// Largest pairwise envelope overlap among active particles (0 if none).
pub fn max_overlap<M: Mobile>(particles: &[M]) -> f64 {
    let mut worst = 0.0_f64;
    for (i, a) in particles.iter().enumerate().filter(|(_, p)| p.is_active()) {
        for b in particles[i + 1..].iter().filter(|p| p.is_active()) {
            let (a, b) = (a.body(), b.body());
            let overlap = a.envelope + b.envelope - spatial::distance(&a.position, &b.position);
            worst = worst.max(overlap);
        }
    }
    worst
}
