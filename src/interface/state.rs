use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::Local;

use crate::analysis::census::Census;
use crate::simulation::runner::Simulation;
use crate::simulation::StepStats;

// --- Constants ---
const HISTORY_CAPACITY: usize = 1000;
const LOG_CAPACITY: usize = 200;
const TEMPERATURE_STEP: f64 = 5.0;
const MAX_GAS: usize = 60;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Reactor,
    Kinetics,
    Help,
}

// --- Telemetry ---

/// Rolling time series of the populations, for sparklines.
#[derive(Debug, Clone)]
pub struct Telemetry {
    pub events_history: VecDeque<u64>,
    pub gas_history: VecDeque<u64>,
    pub probability_history: VecDeque<f64>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            events_history: VecDeque::with_capacity(HISTORY_CAPACITY),
            gas_history: VecDeque::with_capacity(HISTORY_CAPACITY),
            probability_history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn ingest(&mut self, stats: &StepStats, census: &Census) {
        if self.events_history.len() >= HISTORY_CAPACITY {
            self.events_history.pop_front();
            self.gas_history.pop_front();
            self.probability_history.pop_front();
        }
        self.events_history.push_back(census.reaction_events as u64);
        self.gas_history.push_back(census.diatomic as u64);
        self.probability_history.push_back(stats.kinetics.probability);
    }

    pub fn clear(&mut self) {
        self.events_history.clear();
        self.gas_history.clear();
        self.probability_history.clear();
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

// --- The Master State ---

pub struct AppState {
    pub should_quit: bool,
    pub mode: AppMode,
    pub sim: Simulation,
    /// Simulated seconds per tick.
    pub dt: f64,

    pub last_stats: Option<StepStats>,
    pub telemetry: Telemetry,
    pub logs: VecDeque<String>,

    pub show_diagnostics: bool,
    pub show_labels: bool,

    // Performance Metrics
    pub tick_counter: usize,
    pub ticks_per_second: f64,
    last_rate_check: Instant,
}

impl AppState {
    pub fn new(sim: Simulation, dt: f64) -> Self {
        let mut app = Self {
            should_quit: false,
            mode: AppMode::Reactor,
            sim,
            dt,
            last_stats: None,
            telemetry: Telemetry::new(),
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            show_diagnostics: false,
            show_labels: false,
            tick_counter: 0,
            ticks_per_second: 0.0,
            last_rate_check: Instant::now(),
        };
        app.log_start();
        app
    }

    pub fn tick(&mut self) {
        self.calc_metrics();

        let Some(stats) = self.sim.advance(self.dt) else {
            return;
        };
        self.tick_counter += 1;

        let census = self.sim.census();
        self.telemetry.ingest(&stats, &census);

        if stats.reactions > 0 {
            self.log(format!(
                ">>> {} reaction(s) at t = {:.1}s (total {})",
                stats.reactions, stats.elapsed, census.reaction_events
            ));
            if self.sim.state().is_exhausted() {
                self.log(format!(
                    ">>> Complete: {} Cu, {} H2O, {} CuO and {} H2 left",
                    census.product, census.triatomic, census.reactant, census.diatomic
                ));
            }
        }
        self.last_stats = Some(stats);
    }

    /// Logs a message to the internal buffer.
    fn log(&mut self, msg: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("[{}] {}", stamp, msg.into()));
    }

    fn log_start(&mut self) {
        let census = self.sim.census();
        let requested = self.sim.state().initial.lattice_requested;
        self.log(format!(
            "Start: {} H2, {} CuO at {:.0} °C",
            census.initial_gas, census.initial_lattice, self.sim.controls.temperature
        ));
        if census.initial_lattice < requested {
            self.log(format!(
                "Lattice capped: {} of {} CuO placed",
                census.initial_lattice, requested
            ));
        }
    }

    fn calc_metrics(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_rate_check) >= Duration::from_secs(1) {
            self.ticks_per_second = self.tick_counter as f64;
            self.tick_counter = 0;
            self.last_rate_check = now;
        }
    }

    // --- Input Handling ---

    pub fn on_key(&mut self, key: char) {
        match key {
            'q' => self.should_quit = true,
            '1' => self.mode = AppMode::Reactor,
            '2' => self.mode = AppMode::Kinetics,
            '3' | '?' => self.mode = AppMode::Help,
            ' ' => self.toggle_pause(),
            'r' => self.restart(),
            '+' | '=' => self.adjust_temperature(TEMPERATURE_STEP),
            '-' => self.adjust_temperature(-TEMPERATURE_STEP),
            'g' => self.adjust_gas(-1),
            'G' => self.adjust_gas(1),
            'c' => self.adjust_lattice(-1),
            'C' => self.adjust_lattice(1),
            'l' => self.cycle_level(),
            't' => self.toggle_trap(),
            'd' => self.show_diagnostics = !self.show_diagnostics,
            'a' => self.show_labels = !self.show_labels,
            _ => {}
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.sim.toggle_pause() {
            self.log("Paused.");
        } else {
            self.log("Resumed.");
        }
    }

    pub fn restart(&mut self) {
        self.sim.restart();
        self.telemetry.clear();
        self.last_stats = None;
        self.log_start();
    }

    fn adjust_temperature(&mut self, delta: f64) {
        let k = &self.sim.params().kinetics;
        let (lo, hi) = (k.temperature_min, k.temperature_max);
        let t = (self.sim.controls.temperature + delta).clamp(lo, hi);
        self.sim.controls.temperature = t;
    }

    fn adjust_gas(&mut self, delta: isize) {
        let n = self.sim.controls.gas_count.saturating_add_signed(delta).min(MAX_GAS);
        self.sim.controls.gas_count = n;
        self.log(format!("H2 = {} (applies on restart)", n));
    }

    fn adjust_lattice(&mut self, delta: isize) {
        let cap = self.sim.params().lattice.capacity();
        let n = self.sim.controls.lattice_count.saturating_add_signed(delta).min(cap);
        self.sim.controls.lattice_count = n;
        self.log(format!("CuO = {} (applies on restart)", n));
    }

    fn cycle_level(&mut self) {
        self.sim.cycle_level();
        let m = self.sim.level_multiplier();
        self.log(format!("Reaction speed level x{}", m));
    }

    fn toggle_trap(&mut self) {
        self.sim.controls.trap_mode = !self.sim.controls.trap_mode;
        let state = if self.sim.controls.trap_mode { "ON" } else { "OFF" };
        self.log(format!("Trap mode {}", state));
    }
}
