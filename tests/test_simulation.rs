mod common;

use common::{all_contained, controls, run, seeded_params, simulation, snapshot, DT};
use cuo_reduction::analysis::census::Census;
use cuo_reduction::core::domain::Params;
use cuo_reduction::engine::kinetics::Regime;
use cuo_reduction::simulation::Controls;

#[test]
fn test_stoichiometric_scenario() {
    // Stock parameters at the reference size.
    let params = seeded_params(7);
    let stock = Params::default();
    assert_eq!(params.domain.width, stock.domain.width);
    assert_eq!(params.domain.height, stock.domain.height);
    let bounds = params.bounds();
    let mut sim = simulation(params, controls(65.0, 10, 10));

    let start = sim.census();
    assert_eq!(start.reactant, 10);
    assert_eq!(start.diatomic, 10);
    assert_eq!(start.triatomic, 0);

    let events = run(&mut sim, 500);
    let end = sim.census();

    assert!((1..=10).contains(&events), "expected some reactions, got {}", events);
    assert_eq!(end.diatomic + end.triatomic, 10);
    assert_eq!(end.reactant + end.product, 10);
    assert!(end.is_balanced());
    assert!(all_contained(&sim, &bounds));
}

#[test]
fn test_invariants_hold_every_tick() {
    let params = seeded_params(21);
    let bounds = params.bounds();
    let mut sim = simulation(params, controls(110.0, 14, 12));

    let mut last = sim.census();
    let mut summed = 0;
    for _ in 0..600 {
        let stats = sim.advance(DT).expect("not paused");
        summed += stats.reactions;

        let now = sim.census();
        assert!(now.is_balanced(), "unbalanced at tick {}: {:?}", stats.tick, now);
        assert!(all_contained(&sim, &bounds), "particle escaped at tick {}", stats.tick);

        assert!(now.reaction_events >= last.reaction_events);
        assert!(now.diatomic <= last.diatomic);
        assert!(now.triatomic >= last.triatomic);
        assert!(now.product >= last.product);
        assert!(now.reactant <= last.reactant);
        // One H2 reduces at most one site.
        assert!(now.reaction_events <= now.initial_lattice.min(now.initial_gas));

        let k = stats.kinetics;
        assert!(k.probability >= 0.0 && k.probability <= 0.5);
        assert!(k.speed > 0.0);
        last = now;
    }

    assert_eq!(summed, last.reaction_events);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let mut a = simulation(seeded_params(3), controls(80.0, 10, 10));
    let mut b = simulation(seeded_params(3), controls(80.0, 10, 10));

    assert_eq!(snapshot(&a), snapshot(&b));
    run(&mut a, 300);
    run(&mut b, 300);
    assert_eq!(snapshot(&a), snapshot(&b));
    assert_eq!(a.census(), b.census());
}

#[test]
fn test_trap_mode_suppresses_reactions() {
    let mut trapped_total = 0;
    let mut cold_total = 0;

    for seed in 0..8 {
        // Fastest preset, just under the cold threshold.
        let base = Controls {
            level: 4,
            ..controls(35.0, 10, 10)
        };
        let mut cold = simulation(seeded_params(seed), base.clone());
        let mut trapped = simulation(
            seeded_params(seed),
            Controls {
                trap_mode: true,
                ..base
            },
        );

        assert_eq!(cold.kinetic_state().regime, Regime::Cold);
        assert_eq!(trapped.kinetic_state().regime, Regime::Trapped);
        assert!(trapped.kinetic_state().probability < cold.kinetic_state().probability);
        assert!(trapped.kinetic_state().speed < cold.kinetic_state().speed);

        cold_total += run(&mut cold, 600);
        trapped_total += run(&mut trapped, 600);
    }

    assert!(
        trapped_total < cold_total,
        "trapped {} vs cold {}",
        trapped_total,
        cold_total
    );
}

#[test]
fn test_pause_freezes_everything() {
    let mut sim = simulation(seeded_params(5), controls(90.0, 10, 10));
    run(&mut sim, 50);

    assert!(sim.toggle_pause());
    let positions = snapshot(&sim);
    let phases: Vec<f64> = sim.lattice().iter().map(|u| u.phase).collect();
    let census = sim.census();
    let ticks = sim.ticks();
    let elapsed = sim.state().elapsed;

    for _ in 0..100 {
        assert!(sim.advance(DT).is_none());
    }

    assert_eq!(snapshot(&sim), positions);
    assert_eq!(sim.lattice().iter().map(|u| u.phase).collect::<Vec<_>>(), phases);
    assert_eq!(sim.census(), census);
    assert_eq!(sim.ticks(), ticks);
    assert_eq!(sim.state().elapsed, elapsed);

    // Pause, unpause, pause again: still nothing moves.
    assert!(!sim.toggle_pause());
    assert!(sim.toggle_pause());
    assert!(sim.advance(DT).is_none());
    assert_eq!(snapshot(&sim), positions);

    assert!(!sim.toggle_pause());
    assert!(sim.advance(DT).is_some());
    assert_eq!(sim.ticks(), ticks + 1);
}

#[test]
fn test_restart_resets_populations() {
    let mut sim = simulation(seeded_params(9), controls(100.0, 10, 10));
    run(&mut sim, 400);
    sim.toggle_pause();

    sim.controls.gas_count = 6;
    sim.controls.lattice_count = 4;
    sim.restart();

    let census = sim.census();
    assert!(!sim.controls.paused);
    assert_eq!(sim.ticks(), 0);
    assert_eq!(sim.state().elapsed, 0.0);
    assert_eq!(
        census,
        Census {
            reactant: 4,
            product: 0,
            diatomic: 6,
            triatomic: 0,
            reaction_events: 0,
            initial_lattice: 4,
            initial_gas: 6,
        }
    );
    assert_eq!(census.conversion(), 0.0);
}

#[test]
fn test_gas_spawns_above_the_pile() {
    for seed in 0..10 {
        let params = seeded_params(seed);
        let floor = params.domain.height * params.gas.spawn_floor_fraction;
        let margin = params.gas.spawn_margin;
        let sim = simulation(params, controls(65.0, 10, 10));

        let pile_top = sim
            .lattice()
            .iter()
            .map(|u| u.position.y)
            .fold(f64::INFINITY, f64::min);
        for g in sim.diatomic() {
            let p = g.body.position;
            // Settling may push a molecule a little past the spawn band.
            assert!(p.y <= floor + 2.0 * g.body.envelope, "seed {}: spawned at y = {}", seed, p.y);
            assert!(p.y < pile_top, "seed {}: gas inside the pile", seed);
            assert!(p.x >= margin - 2.0 * g.body.envelope);
        }
    }
}

#[test]
fn test_oversized_lattice_is_capped() {
    let params = seeded_params(2);
    let cap = params.lattice.capacity();
    let sim = simulation(params, controls(65.0, 10, cap + 40));

    let initial = sim.state().initial;
    assert_eq!(initial.lattice, cap);
    assert_eq!(initial.lattice_requested, cap + 40);
    assert_eq!(sim.census().reactant, cap);
}

#[test]
fn test_empty_populations_are_inert() {
    let mut no_gas = simulation(seeded_params(1), controls(120.0, 0, 10));
    assert!(no_gas.state().is_exhausted());
    assert_eq!(run(&mut no_gas, 200), 0);
    assert_eq!(no_gas.census().reactant, 10);

    let mut no_solid = simulation(seeded_params(1), controls(120.0, 10, 0));
    assert!(no_solid.state().is_exhausted());
    assert_eq!(run(&mut no_solid, 200), 0);
    assert_eq!(no_solid.census().diatomic, 10);
    assert_eq!(no_solid.census().conversion(), 0.0);
}

#[test]
fn test_invalid_time_step_does_not_advance_clock() {
    let mut sim = simulation(seeded_params(4), controls(65.0, 10, 10));

    for dt in [f64::NAN, f64::INFINITY, -1.0] {
        let stats = sim.advance(dt).expect("not paused");
        assert_eq!(stats.elapsed, 0.0);
    }
    assert_eq!(sim.state().elapsed, 0.0);
    assert!(sim.census().is_balanced());
}

#[test]
fn test_level_cycle_wraps() {
    let mut sim = simulation(seeded_params(6), Controls::default());
    assert_eq!(sim.controls.level, 2);
    assert_eq!(sim.level_multiplier(), 1.0);

    assert_eq!(sim.cycle_level(), 3);
    assert_eq!(sim.cycle_level(), 4);
    assert_eq!(sim.cycle_level(), 0);
    assert_eq!(sim.level_multiplier(), 0.25);

    let clamped = simulation(
        seeded_params(6),
        Controls {
            level: 42,
            ..Controls::default()
        },
    );
    assert_eq!(clamped.controls.level, 4);
}

#[test]
fn test_invalid_params_are_rejected() {
    let mut params = seeded_params(1);
    params.domain.height = -5.0;
    assert!(cuo_reduction::simulation::runner::Simulation::new(params, Controls::default()).is_err());
}

#[test]
fn test_app_key_bindings() {
    use cuo_reduction::interface::state::{AppMode, AppState};

    let sim = simulation(seeded_params(8), controls(115.0, 10, 10));
    let cap = sim.params().lattice.capacity();
    let mut app = AppState::new(sim, DT);

    // Temperature saturates at the top of the range.
    app.on_key('+');
    app.on_key('+');
    assert_eq!(app.sim.controls.temperature, 120.0);
    app.on_key('-');
    assert_eq!(app.sim.controls.temperature, 115.0);

    app.on_key('G');
    app.on_key('c');
    assert_eq!(app.sim.controls.gas_count, 11);
    assert_eq!(app.sim.controls.lattice_count, 9);
    // Counts only apply on restart.
    assert_eq!(app.sim.census().initial_gas, 10);

    for _ in 0..(cap + 5) {
        app.on_key('C');
    }
    assert_eq!(app.sim.controls.lattice_count, cap);

    app.on_key('t');
    assert!(app.sim.controls.trap_mode);
    app.on_key('l');
    assert_eq!(app.sim.controls.level, 3);

    app.on_key(' ');
    assert!(app.sim.controls.paused);
    app.tick();
    assert!(app.last_stats.is_none());

    app.on_key('r');
    assert!(!app.sim.controls.paused);
    assert_eq!(app.sim.census().initial_gas, 11);
    assert_eq!(app.sim.census().initial_lattice, cap);
    app.tick();
    assert!(app.last_stats.is_some());
    assert_eq!(app.telemetry.events_history.len(), 1);

    // Overlay and labels are front-end state; the simulation never sees them.
    let controls = app.sim.controls.clone();
    app.on_key('d');
    app.on_key('a');
    assert!(app.show_diagnostics);
    assert!(app.show_labels);
    assert_eq!(app.sim.controls, controls);

    app.on_key('2');
    assert_eq!(app.mode, AppMode::Kinetics);
    app.on_key('q');
    assert!(app.should_quit);
}
