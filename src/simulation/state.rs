use log::debug;
use nalgebra::{Point2, Vector2};
use rand::Rng;

use crate::core::chemistry::Envelopes;
use crate::core::domain::{DiatomicGas, LatticeUnit, Params, TriatomicGas};
use crate::core::spatial;
use crate::engine::{lattice, overlap};

/// Counts recorded when the populations were created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitialCounts {
    /// Units actually placed (may be below the request if capped).
    pub lattice: usize,
    pub gas: usize,
    /// What the caller asked for.
    pub lattice_requested: usize,
}

/// Every mutable population of one run. Rebuilt from scratch on restart.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub lattice: Vec<LatticeUnit>,
    pub diatomic: Vec<DiatomicGas>,
    pub triatomic: Vec<TriatomicGas>,
    pub reaction_events: usize,
    pub initial: InitialCounts,
    /// Simulated seconds since the populations were created.
    pub elapsed: f64,
}

impl SimulationState {
    /// Builds the pile, scatters the H2 in the upper part of the box and
    /// relaxes their initial overlaps.
    pub fn spawn<R: Rng + ?Sized>(params: &Params, gas_count: usize, lattice_count: usize, rng: &mut R) -> Self {
        let bounds = params.bounds();
        let envelopes = Envelopes::new(params);

        let lattice = lattice::build_lattice(lattice_count, &params.lattice, &bounds, rng);

        let margin = params.gas.spawn_margin;
        let floor = params.domain.height * params.gas.spawn_floor_fraction;
        let mut diatomic: Vec<DiatomicGas> = (0..gas_count)
            .map(|_| {
                let position = Point2::new(
                    spatial::random_range(rng, margin, bounds.width - margin),
                    spatial::random_range(rng, margin, floor),
                );
                let velocity = Vector2::new(
                    spatial::random_range(rng, -1.0, 1.0),
                    spatial::random_range(rng, -1.0, 1.0),
                );
                DiatomicGas::new(bounds.confine(&position, envelopes.diatomic), velocity, envelopes.diatomic)
            })
            .collect();

        let passes = overlap::settle(&mut diatomic, &bounds, params.gas.settle_passes, rng);
        debug!("Settled {} H2 in {} passes", diatomic.len(), passes);

        Self {
            initial: InitialCounts {
                lattice: lattice.len(),
                gas: diatomic.len(),
                lattice_requested: lattice_count,
            },
            lattice,
            diatomic,
            triatomic: Vec::new(),
            reaction_events: 0,
            elapsed: 0.0,
        }
    }

    pub fn reactant_count(&self) -> usize {
        self.lattice.iter().filter(|u| u.kind().is_reactive()).count()
    }

    /// No further reaction is possible.
    pub fn is_exhausted(&self) -> bool {
        self.diatomic.is_empty() || self.reactant_count() == 0
    }
}
