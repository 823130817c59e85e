//! Particle visualization of copper(II) oxide reduced by hydrogen:
//! CuO(s) + H2(g) -> Cu(s) + H2O(g).
//!
//! The library holds the simulation core (geometry, particles, kinetics,
//! reactions) and a terminal front end. `main.rs` wires them to a CLI.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod interface;
pub mod simulation;
