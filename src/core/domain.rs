use std::fs;
use std::path::Path;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::core::chemistry::Envelopes;
use crate::core::error::ConfigError;
use crate::core::spatial::Bounds;

// --- Constants ---
pub const ABSOLUTE_ZERO_OFFSET: f64 = 273.15;

/// Phase advance of the lattice vibration per reference frame.
const VIBRATION_PHASE_STEP: f64 = 0.03;

// --- Particle Types ---

/// State of one formula-unit site of the solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatticeKind {
    /// CuO, still able to react.
    Reactant,
    /// Cu, reduced. Terminal.
    Product,
}

impl LatticeKind {
    pub fn formula(self) -> &'static str {
        match self {
            LatticeKind::Reactant => "CuO",
            LatticeKind::Product => "Cu",
        }
    }

    pub fn is_reactive(self) -> bool {
        match self {
            LatticeKind::Reactant => true,
            LatticeKind::Product => false,
        }
    }
}

/// A fixed site of the solid pile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeUnit {
    pub position: Point2<f64>,
    /// Vibration phase in radians. Visual only, never moves `position`.
    pub phase: f64,
    kind: LatticeKind,
}

impl LatticeUnit {
    pub fn new(position: Point2<f64>, phase: f64) -> Self {
        Self {
            position,
            phase,
            kind: LatticeKind::Reactant,
        }
    }

    pub fn kind(&self) -> LatticeKind {
        self.kind
    }

    /// Reduces CuO to Cu. Returns `false` (and changes nothing) if the
    /// unit was already reduced, so a site can only ever flip once.
    pub fn reduce(&mut self) -> bool {
        match self.kind {
            LatticeKind::Reactant => {
                self.kind = LatticeKind::Product;
                true
            }
            LatticeKind::Product => false,
        }
    }

    pub fn vibrate(&mut self, frames: f64) {
        self.phase = (self.phase + VIBRATION_PHASE_STEP * frames).rem_euclid(std::f64::consts::TAU);
    }

    /// Where to draw the unit: its site plus a small temperature-dependent
    /// jitter (at most half a length unit).
    pub fn jittered_position(&self, temperature_c: f64) -> Point2<f64> {
        let amplitude = 0.15 + (temperature_c.max(0.0) / 120.0).min(1.0) * 0.35;
        Point2::new(
            self.position.x + self.phase.cos() * amplitude,
            self.position.y + self.phase.sin() * amplitude,
        )
    }
}

/// Kinematic state shared by every mobile particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
    /// Collision / contact radius. Constant for the particle's lifetime.
    pub envelope: f64,
}

/// Anything the motion integrator and overlap resolver can push around.
pub trait Mobile {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Inactive particles are ignored by every physics pass.
    fn is_active(&self) -> bool {
        true
    }
}

/// H2 molecule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiatomicGas {
    pub body: Body,
    pub consumed: bool,
}

impl DiatomicGas {
    pub fn new(position: Point2<f64>, velocity: Vector2<f64>, envelope: f64) -> Self {
        Self {
            body: Body { position, velocity, envelope },
            consumed: false,
        }
    }
}

impl Mobile for DiatomicGas {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn is_active(&self) -> bool {
        !self.consumed
    }
}

/// H2O molecule, only ever produced by a reaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriatomicGas {
    pub body: Body,
}

impl TriatomicGas {
    pub fn new(position: Point2<f64>, velocity: Vector2<f64>, envelope: f64) -> Self {
        Self {
            body: Body { position, velocity, envelope },
        }
    }
}

impl Mobile for TriatomicGas {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

// --- Configuration Types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainParams {
    pub width: f64,
    pub height: f64,
}

impl Default for DomainParams {
    fn default() -> Self {
        Self {
            width: 440.0,
            height: 330.0,
        }
    }
}

/// Drawing radii of the atoms; every envelope is derived from these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtomRadii {
    pub hydrogen: f64,
    pub oxygen: f64,
    pub copper: f64,
}

impl Default for AtomRadii {
    fn default() -> Self {
        Self {
            hydrogen: 6.0,
            oxygen: 8.0,
            copper: 10.0,
        }
    }
}

/// Brick layout of the solid pile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeLayout {
    pub column_spacing: f64,
    pub row_spacing: f64,
    pub max_columns: usize,
    /// Upper rows never get narrower than this.
    pub min_columns: usize,
    /// Hard cap on the pile height; units beyond it are not placed.
    pub max_rows: usize,
    /// Distance from the bottom edge of the domain to the bottom row.
    pub ground_margin: f64,
}

impl Default for LatticeLayout {
    fn default() -> Self {
        Self {
            column_spacing: 34.0,
            row_spacing: 28.0,
            max_columns: 7,
            min_columns: 3,
            max_rows: 11,
            ground_margin: 18.0,
        }
    }
}

impl LatticeLayout {
    /// Width (in units) of row `row`. Shrinks by one every two rows.
    pub fn columns_in_row(&self, row: usize) -> usize {
        self.max_columns.saturating_sub(row / 2).max(self.min_columns)
    }

    /// Most units the layout can place.
    pub fn capacity(&self) -> usize {
        (0..self.max_rows).map(|r| self.columns_in_row(r)).sum()
    }

    pub fn ground_y(&self, bounds: &Bounds) -> f64 {
        bounds.height - self.ground_margin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasParams {
    /// Added to the atom radii to form a gas particle's envelope.
    pub envelope_margin: f64,
    /// Distance kept from the side and top walls when spawning.
    pub spawn_margin: f64,
    /// Lowest spawn height as a fraction of the domain height. Keeps the
    /// gas well above the pile at start, at any box size.
    pub spawn_floor_fraction: f64,
    /// Overlap-resolution passes run right after spawning.
    pub settle_passes: usize,
}

impl Default for GasParams {
    fn default() -> Self {
        Self {
            envelope_margin: 6.0,
            spawn_margin: 50.0,
            spawn_floor_fraction: 0.5,
            settle_passes: 80,
        }
    }
}

/// One step of the early-time boost schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostPhase {
    /// Phase applies while elapsed time is below this (seconds).
    pub until: f64,
    pub factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticsParams {
    /// User-facing temperature range (°C).
    pub temperature_min: f64,
    pub temperature_max: f64,

    pub speed_at_min: f64,
    pub speed_at_max: f64,
    pub speed_floor: f64,
    pub speed_ceiling: f64,
    /// Lowest speed after cold/trap damping.
    pub damped_speed_floor: f64,

    /// J/mol.
    pub activation_energy: f64,
    /// J/(mol K).
    pub gas_constant: f64,
    pub prefactor: f64,

    pub speed_levels: Vec<f64>,
    pub default_level: usize,
    /// Ordered by `until`; after the last phase the boost is 1.
    pub boost_schedule: Vec<BoostPhase>,

    pub cold_threshold: f64,
    pub cold_speed_factor: f64,
    pub cold_probability_factor: f64,
    pub trap_speed_factor: f64,
    pub trap_probability_factor: f64,

    pub probability_cap: f64,
}

impl Default for KineticsParams {
    fn default() -> Self {
        Self {
            temperature_min: 10.0,
            temperature_max: 120.0,
            speed_at_min: 0.5,
            speed_at_max: 3.6,
            speed_floor: 0.45,
            speed_ceiling: 3.6,
            damped_speed_floor: 0.05,
            activation_energy: 25_000.0,
            gas_constant: 8.314,
            // Base probability of ~0.15 at 120 °C.
            prefactor: 314.0,
            speed_levels: vec![0.25, 0.5, 1.0, 2.0, 4.0],
            default_level: 2,
            boost_schedule: vec![
                BoostPhase { until: 8.0, factor: 10.0 },
                BoostPhase { until: 20.0, factor: 5.0 },
            ],
            cold_threshold: 40.0,
            cold_speed_factor: 0.6,
            cold_probability_factor: 0.3,
            trap_speed_factor: 0.25,
            trap_probability_factor: 0.01,
            probability_cap: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionParams {
    /// Radius assigned to a lattice site for contact tests.
    pub site_radius: f64,
    /// Multiplier (> 1) on the contact distance.
    pub contact_widening: f64,
    /// Sites at least this far above the ground line count as surface.
    /// `None` uses one row spacing, i.e. every row but the bottom one.
    pub surface_height: Option<f64>,
    pub surface_boost: f64,
    /// Max horizontal offset of a new H2O from its site.
    pub product_jitter_x: f64,
    /// Vertical offset range (upwards) of a new H2O from its site.
    pub product_lift: (f64, f64),
}

impl Default for ReactionParams {
    fn default() -> Self {
        Self {
            site_radius: 14.0,
            contact_widening: 1.25,
            surface_height: None,
            surface_boost: 1.5,
            product_jitter_x: 10.0,
            product_lift: (26.0, 34.0),
        }
    }
}

/// Immutable configuration shared by every component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub domain: DomainParams,
    pub radii: AtomRadii,
    pub lattice: LatticeLayout,
    pub gas: GasParams,
    pub kinetics: KineticsParams,
    pub reaction: ReactionParams,
    /// Fixed RNG seed for reproducible runs. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Params {
    /// Loads and validates a JSON config. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params: Params = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.domain.width, self.domain.height)
    }

    pub fn surface_height(&self) -> f64 {
        self.reaction.surface_height.unwrap_or(self.lattice.row_spacing)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = (self.domain.width, self.domain.height);
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(ConfigError::NonPositiveDomain { width: w, height: h });
        }

        let required = self.radii.copper + self.radii.oxygen;
        for (axis, spacing) in [
            ("column", self.lattice.column_spacing),
            ("row", self.lattice.row_spacing),
        ] {
            if spacing <= required {
                return Err(ConfigError::SpacingTooTight { axis, spacing, required });
            }
        }

        let layout = &self.lattice;
        if layout.min_columns == 0 || layout.min_columns > layout.max_columns {
            return Err(ConfigError::InvalidColumns {
                min: layout.min_columns,
                max: layout.max_columns,
            });
        }

        let margin = self.gas.spawn_margin;
        if margin >= w - margin || margin >= h * self.gas.spawn_floor_fraction {
            return Err(ConfigError::EmptySpawnRegion { width: w, height: h });
        }

        // Widest row and tallest stack must both fit inside the box.
        let footprint = Envelopes::new(self).lattice_footprint;
        let span = (layout.max_columns - 1) as f64 * layout.column_spacing + 2.0 * footprint;
        if span > w {
            return Err(ConfigError::LatticeTooWide { span, width: w });
        }
        let stack = (layout.max_rows.max(1) - 1) as f64 * layout.row_spacing + footprint;
        let ground = layout.ground_y(&self.bounds());
        if stack > ground {
            return Err(ConfigError::LatticeTooTall { stack, ground });
        }

        let k = &self.kinetics;
        if k.temperature_max <= k.temperature_min {
            return Err(ConfigError::EmptyTemperatureRange {
                min: k.temperature_min,
                max: k.temperature_max,
            });
        }
        if k.speed_levels.is_empty()
            || k.speed_levels.iter().any(|l| !l.is_finite() || *l < 0.0)
            || k.default_level >= k.speed_levels.len()
        {
            return Err(ConfigError::InvalidSpeedLevels);
        }
        if !(k.probability_cap > 0.0 && k.probability_cap < 1.0) {
            return Err(ConfigError::InvalidProbabilityCap(k.probability_cap));
        }

        if self.reaction.contact_widening <= 1.0 {
            return Err(ConfigError::InvalidContactWidening(self.reaction.contact_widening));
        }

        Ok(())
    }
}
