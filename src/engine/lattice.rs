use log::{debug, warn};
use nalgebra::Point2;
use rand::Rng;

use crate::core::domain::{LatticeLayout, LatticeUnit};
use crate::core::spatial::{self, Bounds};

/// Stacks `count` CuO units into a pile resting on the ground line.
///
/// Rows are filled bottom-up and centred horizontally; each row is at most
/// as wide as the one below it. Spacing exceeds the Cu + O radii on both
/// axes (checked by `Params::validate`), so units never overlap.
///
/// Units beyond [`LatticeLayout::capacity`] are not placed.
pub fn build_lattice<R: Rng + ?Sized>(
    count: usize,
    layout: &LatticeLayout,
    bounds: &Bounds,
    rng: &mut R,
) -> Vec<LatticeUnit> {
    let placed = count.min(layout.capacity());
    if placed < count {
        warn!(
            "Lattice capped at {} units ({} requested, {} rows max)",
            placed, count, layout.max_rows
        );
    }

    let mut units = Vec::with_capacity(placed);
    let ground_y = layout.ground_y(bounds);
    let center_x = bounds.width / 2.0;

    let mut remaining = placed;
    let mut row = 0;
    while remaining > 0 && row < layout.max_rows {
        let cols = remaining.min(layout.columns_in_row(row));
        let y = ground_y - row as f64 * layout.row_spacing;
        let x0 = center_x - (cols as f64 - 1.0) * layout.column_spacing / 2.0;

        for c in 0..cols {
            let x = x0 + c as f64 * layout.column_spacing;
            let phase = spatial::random_range(rng, 0.0, std::f64::consts::TAU);
            units.push(LatticeUnit::new(Point2::new(x, y), phase));
        }

        remaining -= cols;
        row += 1;
    }

    debug!("Built lattice: {} units in {} rows", units.len(), row);
    units
}

/// Whether a unit sits high enough above the ground to count as an
/// exposed surface site.
#[inline]
pub fn is_surface(unit: &LatticeUnit, ground_y: f64, surface_height: f64) -> bool {
    ground_y - unit.position.y >= surface_height - 1e-9
}
