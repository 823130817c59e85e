use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::analysis::census::Census;
use crate::core::domain::{DiatomicGas, LatticeUnit, Params, TriatomicGas};
use crate::core::error::ConfigError;
use crate::engine::kinetics::{KineticState, KineticsKnobs, KineticsModel};
use crate::engine::reaction::{self, ReactionRules};
use crate::engine::{motion, overlap};
use crate::simulation::state::SimulationState;
use crate::simulation::{Controls, StepStats};

/// Owns one run of the reaction: configuration, populations, RNG.
///
/// Drive it by calling [`Simulation::advance`] from any periodic source
/// (a UI timer, a test loop). Each call is a complete step; observers
/// never see a half-applied tick.
pub struct Simulation {
    params: Params,
    kinetics: KineticsModel,
    rules: ReactionRules,
    pub controls: Controls,
    state: SimulationState,
    rng: ChaCha8Rng,
    ticks: u64,
    exhausted_logged: bool,
}

impl Simulation {
    pub fn new(params: Params, controls: Controls) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut rng = match params.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let state = SimulationState::spawn(&params, controls.gas_count, controls.lattice_count, &mut rng);

        let mut sim = Self {
            kinetics: KineticsModel::new(params.kinetics.clone()),
            rules: ReactionRules::new(&params),
            params,
            controls,
            state,
            rng,
            ticks: 0,
            exhausted_logged: false,
        };
        sim.controls.level = sim.clamp_level(sim.controls.level);
        sim.log_restart();
        Ok(sim)
    }

    /// Discards every population and starts over from the current controls.
    /// The pause flag is cleared.
    pub fn restart(&mut self) {
        self.state = SimulationState::spawn(
            &self.params,
            self.controls.gas_count,
            self.controls.lattice_count,
            &mut self.rng,
        );
        self.controls.paused = false;
        self.ticks = 0;
        self.exhausted_logged = false;
        self.log_restart();
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Order: kinetics, motion (H2 and H2O), H2 overlap pass, reactions.
    /// Returns `None` and changes nothing while paused.
    pub fn advance(&mut self, dt: f64) -> Option<StepStats> {
        if self.controls.paused {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let frames = motion::frames_for(dt);
        let bounds = self.rules.bounds;

        let kinetics = self.kinetic_state();

        motion::integrate(&mut self.state.diatomic, kinetics.speed, frames, &bounds);
        motion::integrate(&mut self.state.triatomic, kinetics.speed, frames, &bounds);

        overlap::resolve_pass(&mut self.state.diatomic);
        motion::contain(&mut self.state.diatomic, &bounds);

        let outcome = reaction::react(
            &mut self.state.lattice,
            &mut self.state.diatomic,
            &mut self.state.triatomic,
            kinetics.probability,
            &self.rules,
            &mut self.rng,
        );
        self.state.reaction_events += outcome.reactions;

        for unit in &mut self.state.lattice {
            unit.vibrate(frames);
        }

        self.state.elapsed += dt;
        self.ticks += 1;

        if !self.exhausted_logged && self.state.is_exhausted() {
            self.exhausted_logged = true;
            info!(
                "Reaction complete after {:.1}s: {} events",
                self.state.elapsed, self.state.reaction_events
            );
        }

        Some(StepStats {
            tick: self.ticks,
            elapsed: self.state.elapsed,
            kinetics,
            reactions: outcome.reactions,
            contacts: outcome.contacts,
        })
    }

    /// Kinetics for the current controls and clock, without stepping.
    pub fn kinetic_state(&self) -> KineticState {
        self.kinetics.evaluate(
            self.controls.temperature,
            self.state.elapsed,
            KineticsKnobs {
                level: self.controls.level,
                trap_mode: self.controls.trap_mode,
            },
        )
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.controls.paused = !self.controls.paused;
        self.controls.paused
    }

    /// Moves to the next reaction-speed preset, wrapping around.
    pub fn cycle_level(&mut self) -> usize {
        let n = self.params.kinetics.speed_levels.len().max(1);
        self.controls.level = (self.controls.level + 1) % n;
        self.controls.level
    }

    pub fn level_multiplier(&self) -> f64 {
        self.kinetics.level_multiplier(self.controls.level)
    }

    pub fn kinetics_model(&self) -> &KineticsModel {
        &self.kinetics
    }

    pub fn census(&self) -> Census {
        Census::from_state(&self.state)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn lattice(&self) -> &[LatticeUnit] {
        &self.state.lattice
    }

    pub fn diatomic(&self) -> &[DiatomicGas] {
        &self.state.diatomic
    }

    pub fn triatomic(&self) -> &[TriatomicGas] {
        &self.state.triatomic
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn clamp_level(&self, level: usize) -> usize {
        level.min(self.params.kinetics.speed_levels.len().saturating_sub(1))
    }

    fn log_restart(&self) {
        let initial = self.state.initial;
        info!(
            "Restart: {} H2, {} CuO placed ({} requested), T = {:.0} °C",
            initial.gas, initial.lattice, initial.lattice_requested, self.controls.temperature
        );
    }
}
