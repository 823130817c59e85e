use std::path::PathBuf;

use thiserror::Error;

/// Everything that can be wrong with a [`Params`](crate::core::domain::Params) value.
///
/// The simulation itself has no failure modes; a valid configuration always
/// runs, at worst as an empty scene.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("domain must have a positive finite size, got {width} x {height}")]
    NonPositiveDomain { width: f64, height: f64 },

    #[error("{axis} spacing {spacing} must exceed the Cu + O radii sum {required}")]
    SpacingTooTight {
        axis: &'static str,
        spacing: f64,
        required: f64,
    },

    #[error("lattice needs 1 <= min_columns <= max_columns, got {min}..{max}")]
    InvalidColumns { min: usize, max: usize },

    #[error("widest lattice row spans {span} but the domain is only {width} wide")]
    LatticeTooWide { span: f64, width: f64 },

    #[error("lattice stack of {stack} does not fit under the ground line at {ground}")]
    LatticeTooTall { stack: f64, ground: f64 },

    #[error("gas spawn region is empty for a {width} x {height} domain")]
    EmptySpawnRegion { width: f64, height: f64 },

    #[error("reaction speed levels must be non-empty and non-negative with a valid default index")]
    InvalidSpeedLevels,

    #[error("probability cap {0} must lie in (0, 1)")]
    InvalidProbabilityCap(f64),

    #[error("contact widening {0} must be greater than 1")]
    InvalidContactWidening(f64),

    #[error("temperature range {min}..{max} is empty")]
    EmptyTemperatureRange { min: f64, max: f64 },
}
