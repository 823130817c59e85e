use std::time::Instant;

use cuo_reduction::core::domain::Params;
use cuo_reduction::simulation::runner::Simulation;
use cuo_reduction::simulation::Controls;

fn main() {
    let params = Params {
        seed: Some(42),
        ..Default::default()
    };
    let controls = Controls {
        gas_count: 60,
        lattice_count: params.lattice.capacity(),
        ..Default::default()
    };

    let mut sim = match Simulation::new(params, controls) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid parameters: {}", e);
            return;
        }
    };

    let ticks = 10_000;
    let start = Instant::now();
    for _ in 0..ticks {
        sim.advance(1.0 / 60.0);
    }
    let duration = start.elapsed();

    let census = sim.census();
    println!(
        "{} ticks took: {:?} ({} reactions, {} H2 left)",
        ticks, duration, census.reaction_events, census.diatomic
    );
}
