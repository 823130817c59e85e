pub mod kinetics;
pub mod lattice;
pub mod motion;
pub mod overlap;
pub mod reaction;
