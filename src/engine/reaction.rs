use log::trace;
use nalgebra::Point2;
use rand::Rng;

use crate::core::chemistry::Envelopes;
use crate::core::domain::{DiatomicGas, LatticeUnit, Params, TriatomicGas};
use crate::core::spatial::{self, Bounds};
use crate::engine::lattice;
use crate::engine::motion;

/// Geometry and tuning the reaction engine needs, resolved once per restart.
#[derive(Debug, Clone)]
pub struct ReactionRules {
    pub bounds: Bounds,
    pub envelopes: Envelopes,
    pub ground_y: f64,
    pub surface_height: f64,
    pub surface_boost: f64,
    pub probability_cap: f64,
    pub product_jitter_x: f64,
    pub product_lift: (f64, f64),
}

impl ReactionRules {
    pub fn new(params: &Params) -> Self {
        let bounds = params.bounds();
        Self {
            bounds,
            envelopes: Envelopes::new(params),
            ground_y: params.lattice.ground_y(&bounds),
            surface_height: params.surface_height(),
            surface_boost: params.reaction.surface_boost,
            probability_cap: params.kinetics.probability_cap,
            product_jitter_x: params.reaction.product_jitter_x,
            product_lift: params.reaction.product_lift,
        }
    }

    /// Contact probability for `unit`, including the surface boost.
    pub fn site_probability(&self, unit: &LatticeUnit, probability: f64) -> f64 {
        if lattice::is_surface(unit, self.ground_y, self.surface_height) {
            spatial::clamp(probability * self.surface_boost, 0.0, self.probability_cap)
        } else {
            probability
        }
    }
}

/// What happened during one reaction sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionOutcome {
    /// Reactions committed (equals H2O created and H2 removed).
    pub reactions: usize,
    /// Contacts with a CuO site, whether or not they reacted.
    pub contacts: usize,
}

/// Tests every H2 against the CuO sites and commits reactions.
///
/// Each contact reverses the molecule's velocity and rolls once against
/// the (surface-boosted) probability. A molecule keeps scanning the
/// lattice after a failed roll, so it can bounce more than once per
/// tick, but it reacts at most once. Consumed molecules are removed from
/// `gas` before returning.
pub fn react<R: Rng + ?Sized>(
    lattice: &mut [LatticeUnit],
    gas: &mut Vec<DiatomicGas>,
    products: &mut Vec<TriatomicGas>,
    probability: f64,
    rules: &ReactionRules,
    rng: &mut R,
) -> ReactionOutcome {
    let mut outcome = ReactionOutcome::default();
    let contact_sq = rules.envelopes.contact_sq;

    for molecule in gas.iter_mut().filter(|g| !g.consumed) {
        for unit in lattice.iter_mut() {
            if !unit.kind().is_reactive() {
                continue;
            }
            if spatial::distance_sq(&molecule.body.position, &unit.position) >= contact_sq {
                continue;
            }

            outcome.contacts += 1;
            molecule.body.velocity = -molecule.body.velocity;

            let p = rules.site_probability(unit, probability);
            if rng.gen::<f64>() < p {
                molecule.consumed = true;
                unit.reduce();
                products.push(spawn_product(unit.position, rules, rng));
                outcome.reactions += 1;
                trace!("H2 reduced CuO at ({:.1}, {:.1})", unit.position.x, unit.position.y);
                break;
            }
        }
    }

    gas.retain(|g| !g.consumed);
    outcome
}

/// New H2O just above the reacted site, heading off in a random direction.
fn spawn_product<R: Rng + ?Sized>(site: Point2<f64>, rules: &ReactionRules, rng: &mut R) -> TriatomicGas {
    let jitter = rules.product_jitter_x;
    let (lift_min, lift_max) = rules.product_lift;
    let raw = Point2::new(
        site.x + spatial::random_range(rng, -jitter, jitter),
        site.y - spatial::random_range(rng, lift_min, lift_max),
    );

    let envelope = rules.envelopes.triatomic;
    let mut product = TriatomicGas::new(
        rules.bounds.confine(&raw, envelope),
        spatial::random_direction(rng),
        envelope,
    );
    motion::reflect_walls(&mut product.body, &rules.bounds);
    product
}
