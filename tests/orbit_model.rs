//! End-to-end checks of the orbit model: conservation, periodicity and the
//! reference launch scenarios.

use std::f64::consts::{FRAC_PI_4, TAU};

use kepler_orbit::{ApsisKind, IntegrationError, OrbitError, OrbitModel, ASTRONOMICAL_UNIT, SUN_MU};

fn rel(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs()
}

/// Launch speeds covering near-circular through strongly eccentric orbits.
const BOUND_SPEEDS: [f64; 5] = [22_000.0, 27_500.0, 29_784.0, 35_000.0, 40_000.0];

#[test]
fn test_bound_orbits_have_valid_shape() {
    for v0 in BOUND_SPEEDS {
        let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();
        let e = model.eccentricity().unwrap();
        assert!((0.0..1.0).contains(&e), "v0 = {}: e = {}", v0, e);
        assert!(model.semi_major_axis().unwrap() > 0.0);
        assert!(model.orbital_period().unwrap() > 0.0);
        assert!(model.semi_minor_axis().unwrap() <= model.semi_major_axis().unwrap());
    }
}

#[test]
fn test_energy_and_momentum_conserved() {
    for v0 in BOUND_SPEEDS {
        let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();
        let period = model.orbital_period().unwrap();
        let energy = model.specific_energy();
        let h = model.specific_angular_momentum();

        for fraction in [0.13, 0.5, 0.87, 2.4] {
            let state = model.state_at_time(period * fraction).unwrap();
            let drift_energy = rel(state.specific_energy(SUN_MU), energy);
            let drift_h = rel(state.specific_angular_momentum(), h);
            assert!(
                drift_energy < 1e-6,
                "v0 = {}, t = {}T: energy drift {:.3e}",
                v0,
                fraction,
                drift_energy
            );
            assert!(drift_h < 1e-12, "v0 = {}: h drift {:.3e}", v0, drift_h);
        }
    }
}

#[test]
fn test_returns_to_launch_after_one_period() {
    for v0 in BOUND_SPEEDS {
        let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();
        let period = model.orbital_period().unwrap();

        let start = model.state_at_time(0.0).unwrap();
        let end = model.state_at_time(period).unwrap();

        assert!(
            rel(end.radius, start.radius) < 1e-6,
            "v0 = {}: r(T) = {}, r(0) = {}",
            v0,
            end.radius,
            start.radius
        );
        assert!(
            (end.angle - start.angle - TAU).abs() < 1e-5,
            "v0 = {}: swept {} rad",
            v0,
            end.angle - start.angle
        );
    }
}

#[test]
fn test_angle_accumulates_over_revolutions() {
    let model = OrbitModel::new(33_000.0, ASTRONOMICAL_UNIT).unwrap();
    let period = model.orbital_period().unwrap();

    let state = model.state_at_time(3.0 * period).unwrap();
    assert!((state.angle - 3.0 * TAU).abs() < 1e-4, "angle {}", state.angle);
    assert!(rel(state.radius, ASTRONOMICAL_UNIT) < 1e-6);
}

#[test]
fn test_boundary_launch_conditions_rejected() {
    for (v0, r0) in [(30_000.0, 0.0), (30_000.0, -ASTRONOMICAL_UNIT), (-0.5, ASTRONOMICAL_UNIT)] {
        assert!(matches!(
            OrbitModel::new(v0, r0),
            Err(OrbitError::InvalidParameter { .. })
        ));
    }
}

#[test]
fn test_escape_speed_is_unbound() {
    let escape = (2.0 * SUN_MU / ASTRONOMICAL_UNIT).sqrt();
    let model = OrbitModel::new(escape * 1.05, ASTRONOMICAL_UNIT).unwrap();
    assert!(model.specific_energy() > 0.0);
    assert!(matches!(model.orbital_period(), Err(OrbitError::Unbound { .. })));
}

#[test]
fn test_circular_orbit_keeps_radius() {
    let v0 = (SUN_MU / ASTRONOMICAL_UNIT).sqrt();
    assert!((v0 - 29_784.0).abs() < 10.0, "circular speed {}", v0);

    let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();
    assert!(model.eccentricity().unwrap() < 1e-6);

    let period = model.orbital_period().unwrap();
    assert!(rel(period, 3.156e7) < 1e-3, "period {} s", period);

    for i in 1..=8 {
        let state = model.state_at_time(period * i as f64 / 8.0).unwrap();
        assert!(
            rel(state.radius, ASTRONOMICAL_UNIT) < 1e-7,
            "r = {} at step {}",
            state.radius,
            i
        );
        assert!(rel(state.tangential_velocity, v0) < 1e-7);
    }
}

#[test]
fn test_eccentric_orbit_starts_at_perihelion() {
    let v0 = 35_000.0;
    let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();

    let e = model.eccentricity().unwrap();
    assert!(e > 0.2 && e < 0.4, "e = {}", e);

    let v_max = model.max_velocity().unwrap();
    let v_min = model.min_velocity().unwrap();
    assert!(v_min < v0 && v0 <= v_max * (1.0 + 1e-9), "{} < {} <= {}", v_min, v0, v_max);
    let v_ap = model.aphelion_speed().unwrap();

    // The fastest point is the closest one: no sample dips inside r0
    for state in model.trajectory(60).unwrap() {
        assert!(
            state.radius >= ASTRONOMICAL_UNIT * (1.0 - 1e-7),
            "r = {} at t = {}",
            state.radius,
            state.time
        );
        assert!(state.speed() <= v_max * (1.0 + 1e-6));
        assert!(state.speed() >= v_ap * (1.0 - 1e-6));
    }
}

#[test]
fn test_slow_launch_starts_at_aphelion() {
    let v0 = 25_000.0;
    let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();

    assert!(rel(model.aphelion_distance().unwrap(), ASTRONOMICAL_UNIT) < 1e-9);
    assert!(rel(model.aphelion_speed().unwrap(), v0) < 1e-9);

    let perihelion = model.next_apsis(ApsisKind::Perihelion).unwrap().unwrap();
    let period = model.orbital_period().unwrap();
    assert!((perihelion.time - period / 2.0).abs() / period < 1e-5);
    assert!(rel(perihelion.state.radius, model.perihelion_distance().unwrap()) < 1e-6);
    assert!(rel(perihelion.state.speed(), model.max_velocity().unwrap()) < 1e-5);
}

#[test]
fn test_near_radial_orbits_conserve_energy_or_fail() {
    // e from 0.9955 (2 km/s) to 0.9999999 (10 m/s)
    for v0 in [2_000.0, 100.0, 10.0] {
        let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();
        let period = model.orbital_period().unwrap();
        let energy = model.specific_energy();

        for fraction in [0.6, 0.75, 1.0, 1.6] {
            match model.state_at_time(period * fraction) {
                Ok(state) => {
                    let drift = rel(state.specific_energy(SUN_MU), energy);
                    assert!(
                        drift < 1e-6,
                        "v0 = {}, t = {}T: energy drift {:.3e}",
                        v0,
                        fraction,
                        drift
                    );
                    assert!(state.radius > 0.0);
                }
                Err(OrbitError::NumericalInstability { .. })
                | Err(OrbitError::IntegrationDiverged { .. }) => {}
                Err(other) => panic!("v0 = {}: unexpected error {:?}", v0, other),
            }
        }
    }
}

#[test]
fn test_near_radial_orbit_survives_perihelion() {
    let model = OrbitModel::new(2_000.0, ASTRONOMICAL_UNIT).unwrap();
    let period = model.orbital_period().unwrap();

    // Perihelion at T/2; one full period later the planet is back at launch
    let state = model.state_at_time(period).unwrap();
    assert!(rel(state.radius, ASTRONOMICAL_UNIT) < 1e-6, "r(T) = {}", state.radius);
    assert!((state.angle - TAU).abs() < 1e-5, "swept {} rad", state.angle);
    assert!(rel(state.specific_energy(SUN_MU), model.specific_energy()) < 1e-7);
}

#[test]
fn test_radial_infall_diverges() {
    let model = OrbitModel::new(0.0, ASTRONOMICAL_UNIT).unwrap();
    // Degenerate ellipse with a = r0 / 2: the fall takes half its period
    let period = model.orbital_period().unwrap();

    let falling = model.state_at_time(period / 4.0).unwrap();
    assert!(falling.radius > 0.0 && falling.radius < ASTRONOMICAL_UNIT);
    assert!(falling.radial_velocity < 0.0);
    assert_eq!(falling.angle, 0.0);

    match model.state_at_time(period) {
        Err(OrbitError::IntegrationDiverged { source, .. }) => {
            assert!(
                matches!(
                    source,
                    IntegrationError::StepSizeTooSmall { .. }
                        | IntegrationError::InadmissibleState { .. }
                        | IntegrationError::NonFiniteState { .. }
                        | IntegrationError::MaxStepsExceeded
                ),
                "unexpected solver failure {:?}",
                source
            );
        }
        other => panic!("expected divergence, got {:?}", other),
    }
}

#[test]
fn test_angled_launch_conserves_energy_and_momentum() {
    let model = OrbitModel::with_launch_angle(30_000.0, ASTRONOMICAL_UNIT, FRAC_PI_4).unwrap();
    let h = ASTRONOMICAL_UNIT * 30_000.0 * FRAC_PI_4.cos();
    assert!(rel(model.specific_angular_momentum(), h) < 1e-15);

    let start = model.initial_state();
    assert!(start.radial_velocity > 0.0, "outward launch must raise r");

    let period = model.orbital_period().unwrap();
    for fraction in [0.1, 0.6, 1.0] {
        let state = model.state_at_time(period * fraction).unwrap();
        assert!(rel(state.specific_energy(SUN_MU), model.specific_energy()) < 1e-6);
        assert!(rel(state.specific_angular_momentum(), h) < 1e-12);
    }

    let end = model.state_at_time(period).unwrap();
    assert!(rel(end.radius, ASTRONOMICAL_UNIT) < 1e-6);
    assert!((end.radial_velocity - start.radial_velocity).abs() < 1e-2);
}

#[test]
fn test_retrograde_launch_sweeps_backwards() {
    // cos(pi) = -1: same orbit, opposite direction
    let prograde = OrbitModel::new(31_000.0, ASTRONOMICAL_UNIT).unwrap();
    let retrograde =
        OrbitModel::with_launch_angle(31_000.0, ASTRONOMICAL_UNIT, std::f64::consts::PI).unwrap();

    assert!(retrograde.specific_angular_momentum() < 0.0);
    assert!(rel(retrograde.eccentricity().unwrap(), prograde.eccentricity().unwrap()) < 1e-9);

    let t = prograde.orbital_period().unwrap() / 3.0;
    let forward = prograde.state_at_time(t).unwrap();
    let backward = retrograde.state_at_time(t).unwrap();
    assert!(rel(backward.radius, forward.radius) < 1e-6);
    assert!((backward.angle + forward.angle).abs() < 1e-6);
}

#[test]
fn test_repeated_queries_are_identical() {
    let model = OrbitModel::new(36_000.0, ASTRONOMICAL_UNIT).unwrap();
    let t = model.orbital_period().unwrap() * 0.731;

    let first = model.state_at_time(t).unwrap();
    for _ in 0..3 {
        assert_eq!(model.state_at_time(t).unwrap(), first);
    }
}

#[test]
fn test_trajectory_agrees_with_point_queries() {
    let model = OrbitModel::new(34_000.0, ASTRONOMICAL_UNIT).unwrap();
    let path = model.trajectory(9).unwrap();

    for state in &path {
        let direct = model.state_at_time(state.time).unwrap();
        assert!(rel(direct.radius, state.radius) < 1e-7, "t = {}", state.time);
        assert!((direct.angle - state.angle).abs() < 1e-6);
    }
}
