use cuo_reduction::core::chemistry::{self, Element, Envelopes};
use cuo_reduction::core::domain::{LatticeKind, LatticeLayout, LatticeUnit, Params};
use cuo_reduction::core::error::ConfigError;
use cuo_reduction::core::spatial::{self, Bounds};
use cuo_reduction::engine::lattice::{build_lattice, is_surface};
use nalgebra::{Point2, Vector2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_geometry_helpers() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for _ in 0..1000 {
        let x = spatial::random_range(&mut rng, -2.0, 3.0);
        assert!((-2.0..3.0).contains(&x));
    }
    // Collapsed and inverted ranges fall back to `min`.
    assert_eq!(spatial::random_range(&mut rng, 5.0, 5.0), 5.0);
    assert_eq!(spatial::random_range(&mut rng, 5.0, 1.0), 5.0);

    assert_eq!(spatial::clamp(7.0, 0.0, 5.0), 5.0);
    assert_eq!(spatial::clamp(-1.0, 0.0, 5.0), 0.0);
    assert_eq!(spatial::clamp(9.0, 4.0, 2.0), 4.0);

    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(3.0, 4.0);
    assert!((spatial::distance(&a, &b) - 5.0).abs() < 1e-12);
    assert!((spatial::distance_sq(&a, &b) - 25.0).abs() < 1e-12);

    let n = spatial::normalize(&Vector2::new(3.0, 4.0)).expect("non-zero vector");
    assert!((n.norm() - 1.0).abs() < 1e-12);
    assert!(spatial::normalize(&Vector2::zeros()).is_none());

    let d = spatial::random_direction(&mut rng);
    assert!((d.norm() - 1.0).abs() < 1e-12);
}

#[test]
fn test_bounds_confine() {
    let bounds = Bounds::new(100.0, 50.0);
    let p = bounds.confine(&Point2::new(-10.0, 80.0), 5.0);
    assert_eq!(p, Point2::new(5.0, 45.0));
    assert!(bounds.contains(&p, 5.0));
    assert!(!bounds.contains(&Point2::new(2.0, 20.0), 5.0));
}

#[test]
fn test_envelopes() {
    let params = Params::default();
    let env = Envelopes::new(&params);

    // 2 * 6 + 6 and 2 * 6 + 8 + 6
    assert!((env.diatomic - 18.0).abs() < 1e-12);
    assert!((env.triatomic - 26.0).abs() < 1e-12);
    assert!(env.triatomic > env.diatomic);
    assert!((env.lattice_footprint - 9.0).abs() < 1e-12);

    // (18 + 14) * 1.25
    assert!((env.contact_distance() - 40.0).abs() < 1e-9);

    assert_eq!(Element::Cu.radius(&params.radii), 10.0);
    assert_eq!(Element::H.symbol(), "H");
}

#[test]
fn test_atom_layouts() {
    let radii = Params::default().radii;
    let symbols = |atoms: &[chemistry::AtomSite]| atoms.iter().map(|a| a.element.symbol()).collect::<Vec<_>>();

    let h2 = chemistry::diatomic_atoms(&radii);
    assert_eq!(symbols(&h2), ["H", "H"]);
    assert_eq!(h2[0].offset.x, -h2[1].offset.x);

    let h2o = chemistry::triatomic_atoms(&radii);
    assert_eq!(symbols(&h2o), ["O", "H", "H"]);
    assert_eq!(h2o[0].offset.norm(), 0.0);
    // Both H sit below the O.
    assert!(h2o[1..].iter().all(|a| a.offset.y > 0.0));

    let cuo = chemistry::lattice_atoms(LatticeKind::Reactant, &radii);
    assert_eq!(symbols(&cuo), ["Cu", "O"]);
    assert_eq!(symbols(&chemistry::lattice_atoms(LatticeKind::Product, &radii)), ["Cu"]);

    // Neighbouring atoms touch without overlapping.
    let gap = (cuo[1].offset - cuo[0].offset).norm();
    assert_eq!(gap, cuo[0].element.radius(&radii) + cuo[1].element.radius(&radii));
    assert_eq!(LatticeKind::Reactant.formula(), "CuO");
    assert_eq!(LatticeKind::Product.formula(), "Cu");
}

#[test]
fn test_lattice_placement() {
    let params = Params::default();
    let layout = &params.lattice;
    let bounds = params.bounds();
    let footprint = Envelopes::new(&params).lattice_footprint;
    let cap = layout.capacity();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    assert_eq!(cap, 53);

    for n in 1..=(cap + 20) {
        let units = build_lattice(n, layout, &bounds, &mut rng);
        assert_eq!(units.len(), n.min(cap), "wrong unit count for n = {}", n);

        for (i, a) in units.iter().enumerate() {
            assert_eq!(a.kind(), LatticeKind::Reactant);
            assert!(bounds.contains(&a.position, footprint), "unit outside the box for n = {}", n);
            for b in &units[i + 1..] {
                let d = spatial::distance(&a.position, &b.position);
                assert!(d >= 2.0 * footprint, "units overlap for n = {}: d = {}", n, d);
            }
        }
    }
}

#[test]
fn test_lattice_shape() {
    let params = Params::default();
    let layout = &params.lattice;
    let bounds = params.bounds();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let units = build_lattice(30, layout, &bounds, &mut rng);
    let ground = layout.ground_y(&bounds);

    // Group by row (rows are exact multiples of the spacing above ground).
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for u in &units {
        let row = ((ground - u.position.y) / layout.row_spacing).round() as usize;
        if rows.len() <= row {
            rows.resize(row + 1, Vec::new());
        }
        rows[row].push(u.position.x);
    }

    assert!(units.iter().all(|u| u.position.y <= ground + 1e-9));
    for pair in rows.windows(2) {
        assert!(pair[1].len() <= pair[0].len(), "row wider than the one below");
    }
    for row in &rows {
        assert!(row.len() <= layout.max_columns);
        let mean = row.iter().sum::<f64>() / row.len() as f64;
        assert!((mean - bounds.width / 2.0).abs() < 1e-9, "row not centred");
    }
}

#[test]
fn test_lattice_empty_and_capped() {
    let params = Params::default();
    let bounds = params.bounds();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    assert!(build_lattice(0, &params.lattice, &bounds, &mut rng).is_empty());

    let short = LatticeLayout {
        max_rows: 2,
        ..Default::default()
    };
    assert_eq!(short.capacity(), 14);
    assert_eq!(build_lattice(100, &short, &bounds, &mut rng).len(), 14);
}

#[test]
fn test_surface_classification() {
    let params = Params::default();
    let bounds = params.bounds();
    let ground = params.lattice.ground_y(&bounds);
    let h = params.surface_height();

    let bottom = LatticeUnit::new(Point2::new(400.0, ground), 0.0);
    let second = LatticeUnit::new(Point2::new(400.0, ground - params.lattice.row_spacing), 0.0);
    assert!(!is_surface(&bottom, ground, h));
    assert!(is_surface(&second, ground, h));
}

#[test]
fn test_lattice_unit_reduces_once() {
    let mut unit = LatticeUnit::new(Point2::new(10.0, 10.0), 0.0);
    assert_eq!(unit.kind().formula(), "CuO");
    assert!(unit.reduce());
    assert_eq!(unit.kind(), LatticeKind::Product);
    assert!(!unit.reduce());
    assert_eq!(unit.kind(), LatticeKind::Product);
}

#[test]
fn test_vibration_is_bounded() {
    let mut unit = LatticeUnit::new(Point2::new(50.0, 60.0), 1.0);
    for _ in 0..500 {
        unit.vibrate(1.0);
        let p = unit.jittered_position(120.0);
        assert!(spatial::distance(&p, &unit.position) <= 0.5 + 1e-12);
        assert!((0.0..std::f64::consts::TAU).contains(&unit.phase));
    }
    assert_eq!(unit.position, Point2::new(50.0, 60.0));
}

#[test]
fn test_params_validation() {
    assert!(Params::default().validate().is_ok());

    let mut tight = Params::default();
    tight.lattice.row_spacing = 18.0;
    assert!(matches!(
        tight.validate(),
        Err(ConfigError::SpacingTooTight { axis: "row", .. })
    ));

    let mut cap = Params::default();
    cap.kinetics.probability_cap = 1.0;
    assert!(matches!(cap.validate(), Err(ConfigError::InvalidProbabilityCap(_))));

    let mut tiny = Params::default();
    tiny.domain.width = 80.0;
    assert!(matches!(tiny.validate(), Err(ConfigError::EmptySpawnRegion { .. })));

    // Room for the gas but not for the widest row of the pile.
    let mut narrow = Params::default();
    narrow.domain.width = 120.0;
    assert!(matches!(narrow.validate(), Err(ConfigError::LatticeTooWide { .. })));

    // Full stack of rows would poke through the ceiling.
    let mut low = Params::default();
    low.domain.height = 200.0;
    assert!(matches!(low.validate(), Err(ConfigError::LatticeTooTall { .. })));

    let mut levels = Params::default();
    levels.kinetics.default_level = 9;
    assert!(matches!(levels.validate(), Err(ConfigError::InvalidSpeedLevels)));

    let mut widen = Params::default();
    widen.reaction.contact_widening = 1.0;
    assert!(matches!(widen.validate(), Err(ConfigError::InvalidContactWidening(_))));
}

#[test]
fn test_params_from_partial_json() {
    let path = std::env::temp_dir().join(format!("cuo_reduction_cfg_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "domain": { "width": 640.0 }, "seed": 9 }"#).unwrap();

    let params = Params::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(params.domain.width, 640.0);
    assert_eq!(params.domain.height, 330.0);
    assert_eq!(params.seed, Some(9));
    assert_eq!(params.lattice.max_columns, 7);
}

#[test]
fn test_params_from_missing_file() {
    let err = Params::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
