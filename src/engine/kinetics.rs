use serde::Serialize;

use crate::core::domain::{KineticsParams, ABSOLUTE_ZERO_OFFSET};
use crate::core::spatial::clamp;

/// Which damping branch the model applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Regime {
    Active,
    /// Below the cold threshold.
    Cold,
    /// Below the cold threshold with trap mode on: kinetically frozen.
    Trapped,
}

/// Output of the kinetics model for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KineticState {
    /// Scalar applied to every velocity this tick.
    pub speed: f64,
    /// Per-contact reaction probability, before any surface boost.
    pub probability: f64,
    /// Early-time multiplier that was applied.
    pub boost: f64,
    pub regime: Regime,
}

/// Tuning inputs that are not physical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KineticsKnobs {
    /// Index into `KineticsParams::speed_levels`.
    pub level: usize,
    pub trap_mode: bool,
}

/// Temperature → (speed, reaction probability).
///
/// Pure: the same temperature, elapsed time and knobs always give the
/// same answer.
#[derive(Debug, Clone)]
pub struct KineticsModel {
    params: KineticsParams,
}

impl KineticsModel {
    pub fn new(params: KineticsParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &KineticsParams {
        &self.params
    }

    /// Linear speed ramp between the reference temperatures, clamped.
    pub fn base_speed(&self, temperature_c: f64) -> f64 {
        let p = &self.params;
        let t = self.clamp_temperature(temperature_c);
        let frac = (t - p.temperature_min) / (p.temperature_max - p.temperature_min);
        let speed = p.speed_at_min + frac * (p.speed_at_max - p.speed_at_min);
        clamp(speed, p.speed_floor, p.speed_ceiling)
    }

    /// Arrhenius term `A * exp(-Ea / RT)`.
    pub fn arrhenius(&self, temperature_c: f64) -> f64 {
        let p = &self.params;
        let kelvin = self.clamp_temperature(temperature_c) + ABSOLUTE_ZERO_OFFSET;
        p.prefactor * (-p.activation_energy / (p.gas_constant * kelvin)).exp()
    }

    pub fn level_multiplier(&self, level: usize) -> f64 {
        let levels = &self.params.speed_levels;
        levels
            .get(level)
            .or_else(|| levels.last())
            .copied()
            .unwrap_or(1.0)
    }

    /// Early-time boost: large right after a restart, then stepping down
    /// to 1.
    pub fn boost(&self, elapsed_s: f64) -> f64 {
        self.params
            .boost_schedule
            .iter()
            .find(|phase| elapsed_s < phase.until)
            .map(|phase| phase.factor)
            .unwrap_or(1.0)
    }

    pub fn regime(&self, temperature_c: f64, trap_mode: bool) -> Regime {
        if temperature_c >= self.params.cold_threshold {
            Regime::Active
        } else if trap_mode {
            Regime::Trapped
        } else {
            Regime::Cold
        }
    }

    pub fn evaluate(&self, temperature_c: f64, elapsed_s: f64, knobs: KineticsKnobs) -> KineticState {
        let p = &self.params;
        let temperature_c = if temperature_c.is_nan() { p.temperature_min } else { temperature_c };

        let boost = self.boost(elapsed_s.max(0.0));
        let mut speed = self.base_speed(temperature_c);
        let mut probability = self.arrhenius(temperature_c) * self.level_multiplier(knobs.level) * boost;

        let regime = self.regime(temperature_c, knobs.trap_mode);
        match regime {
            Regime::Active => {}
            Regime::Cold => {
                speed *= p.cold_speed_factor;
                probability *= p.cold_probability_factor;
            }
            Regime::Trapped => {
                speed *= p.trap_speed_factor;
                probability *= p.trap_probability_factor;
            }
        }

        KineticState {
            speed: clamp(speed, p.damped_speed_floor, p.speed_ceiling),
            probability: clamp(probability, 0.0, p.probability_cap),
            boost,
            regime,
        }
    }

    /// Documented output range of `speed`.
    pub fn speed_range(&self) -> (f64, f64) {
        (self.params.damped_speed_floor, self.params.speed_ceiling)
    }

    fn clamp_temperature(&self, temperature_c: f64) -> f64 {
        clamp(temperature_c, self.params.temperature_min, self.params.temperature_max)
    }
}
