#![allow(dead_code)]

use cuo_reduction::core::domain::Params;
use cuo_reduction::core::spatial::Bounds;
use cuo_reduction::simulation::runner::Simulation;
use cuo_reduction::simulation::Controls;

/// Fixed tick length used by the scenario tests, close to the TUI's 33 ms.
pub const DT: f64 = 1.0 / 30.0;

/// Default parameters with a fixed seed.
pub fn seeded_params(seed: u64) -> Params {
    Params {
        seed: Some(seed),
        ..Default::default()
    }
}

pub fn controls(temperature: f64, gas: usize, lattice: usize) -> Controls {
    Controls {
        temperature,
        gas_count: gas,
        lattice_count: lattice,
        ..Default::default()
    }
}

pub fn simulation(params: Params, controls: Controls) -> Simulation {
    Simulation::new(params, controls).expect("valid test parameters")
}

/// Runs `ticks` steps and returns the final reaction count.
pub fn run(sim: &mut Simulation, ticks: usize) -> usize {
    for _ in 0..ticks {
        sim.advance(DT);
    }
    sim.census().reaction_events
}

/// Every mobile particle's centre lies in `[r, size - r]` on both axes.
pub fn all_contained(sim: &Simulation, bounds: &Bounds) -> bool {
    sim.diatomic()
        .iter()
        .map(|g| &g.body)
        .chain(sim.triatomic().iter().map(|g| &g.body))
        .all(|b| bounds.contains(&b.position, b.envelope))
}

/// Positions of every particle, for before/after comparisons.
pub fn snapshot(sim: &Simulation) -> Vec<(f64, f64)> {
    sim.lattice()
        .iter()
        .map(|u| (u.position.x, u.position.y))
        .chain(sim.diatomic().iter().map(|g| (g.body.position.x, g.body.position.y)))
        .chain(sim.triatomic().iter().map(|g| (g.body.position.x, g.body.position.y)))
        .collect()
}
