use serde::Serialize;

use crate::core::domain::LatticeKind;
use crate::simulation::state::SimulationState;

/// Read-only tally of a simulation state, for counters and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    /// CuO units left.
    pub reactant: usize,
    /// Cu units produced.
    pub product: usize,
    /// H2 molecules left.
    pub diatomic: usize,
    /// H2O molecules produced.
    pub triatomic: usize,
    pub reaction_events: usize,
    pub initial_lattice: usize,
    pub initial_gas: usize,
}

impl Census {
    pub fn from_state(state: &SimulationState) -> Self {
        let (reactant, product) = state
            .lattice
            .iter()
            .fold((0, 0), |(r, p), unit| match unit.kind() {
                LatticeKind::Reactant => (r + 1, p),
                LatticeKind::Product => (r, p + 1),
            });

        Self {
            reactant,
            product,
            diatomic: state.diatomic.len(),
            triatomic: state.triatomic.len(),
            reaction_events: state.reaction_events,
            initial_lattice: state.initial.lattice,
            initial_gas: state.initial.gas,
        }
    }

    /// Fraction of the limiting reagent already converted, in [0, 1].
    pub fn conversion(&self) -> f64 {
        let limit = self.initial_lattice.min(self.initial_gas);
        if limit == 0 {
            return 0.0;
        }
        (self.reaction_events as f64 / limit as f64).min(1.0)
    }

    /// The three conservation laws of the reaction:
    /// CuO + Cu is constant, H2 + events equals the initial H2, and every
    /// event made exactly one H2O.
    pub fn is_balanced(&self) -> bool {
        self.reactant + self.product == self.initial_lattice
            && self.diatomic + self.reaction_events == self.initial_gas
            && self.triatomic == self.reaction_events
    }
}
