use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::core::domain::{AtomRadii, LatticeKind, Params};

/// Elements drawn by the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    H,
    O,
    Cu,
}

impl Element {
    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::O => "O",
            Element::Cu => "Cu",
        }
    }

    pub fn radius(self, radii: &AtomRadii) -> f64 {
        match self {
            Element::H => radii.hydrogen,
            Element::O => radii.oxygen,
            Element::Cu => radii.copper,
        }
    }
}

/// One atom of a drawn particle, offset from the particle centre in
/// domain coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomSite {
    pub element: Element,
    pub offset: Vector2<f64>,
}

impl AtomSite {
    fn new(element: Element, dx: f64, dy: f64) -> Self {
        Self {
            element,
            offset: Vector2::new(dx, dy),
        }
    }
}

/// CuO is Cu and O side by side; a reduced site keeps only the Cu.
/// The first atom is the one every bond starts from.
pub fn lattice_atoms(kind: LatticeKind, radii: &AtomRadii) -> Vec<AtomSite> {
    let copper = AtomSite::new(Element::Cu, -radii.copper, 0.0);
    match kind {
        LatticeKind::Reactant => vec![copper, AtomSite::new(Element::O, radii.oxygen, 0.0)],
        LatticeKind::Product => vec![copper],
    }
}

pub fn diatomic_atoms(radii: &AtomRadii) -> [AtomSite; 2] {
    let r = radii.hydrogen;
    [AtomSite::new(Element::H, -r, 0.0), AtomSite::new(Element::H, r, 0.0)]
}

/// Bent H2O: O at the centre, both H hanging below it.
pub fn triatomic_atoms(radii: &AtomRadii) -> [AtomSite; 3] {
    let (ro, rh) = (radii.oxygen, radii.hydrogen);
    let (hx, hy) = (ro + 0.4 * rh, 0.7 * ro);
    [
        AtomSite::new(Element::O, 0.0, 0.0),
        AtomSite::new(Element::H, -hx, hy),
        AtomSite::new(Element::H, hx, hy),
    ]
}

/// Pre-computed collision and contact radii derived from the atomic radii.
///
/// Built once per restart so the hot loops never recompute sums or
/// square roots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelopes {
    /// H2: two H atoms side by side plus the gas margin.
    pub diatomic: f64,
    /// H2O: O plus two H atoms plus the gas margin.
    pub triatomic: f64,
    /// Half of (Cu + O); two neighbouring footprints never touch.
    pub lattice_footprint: f64,
    /// Squared H2-to-site distance below which a contact happens.
    pub contact_sq: f64,
}

impl Envelopes {
    pub fn new(params: &Params) -> Self {
        let radii = &params.radii;
        let margin = params.gas.envelope_margin;

        let diatomic = 2.0 * radii.hydrogen + margin;
        let triatomic = 2.0 * radii.hydrogen + radii.oxygen + margin;
        let lattice_footprint = 0.5 * (radii.copper + radii.oxygen);

        let contact = (diatomic + params.reaction.site_radius) * params.reaction.contact_widening;

        Self {
            diatomic,
            triatomic,
            lattice_footprint,
            contact_sq: contact * contact,
        }
    }

    #[inline(always)]
    pub fn contact_distance(&self) -> f64 {
        self.contact_sq.sqrt()
    }
}
