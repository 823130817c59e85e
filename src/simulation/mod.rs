use serde::Serialize;

use crate::engine::kinetics::KineticState;

/// Inputs the front end owns and the simulation reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    /// °C, read every tick.
    pub temperature: f64,
    /// H2 molecules spawned on restart.
    pub gas_count: usize,
    /// CuO units requested on restart.
    pub lattice_count: usize,
    pub paused: bool,
    /// Index into the reaction-speed presets.
    pub level: usize,
    pub trap_mode: bool,
}

impl Default for Controls {
    fn default() -> Self {
        // Stoichiometric start: one H2 per CuO.
        Self {
            temperature: 65.0,
            gas_count: 10,
            lattice_count: 10,
            paused: false,
            level: 2,
            trap_mode: false,
        }
    }
}

/// Summary of one completed `advance` call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepStats {
    pub tick: u64,
    pub elapsed: f64,
    pub kinetics: KineticState,
    pub reactions: usize,
    pub contacts: usize,
}

pub mod runner;
pub mod state;
