use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kepler_orbit::{ApsisKind, OrbitModel, PolarTwoBody, Rkf78, Tolerances, ASTRONOMICAL_UNIT, SUN_MU};

fn bench_circular_orbit_1period(c: &mut Criterion) {
    let v0 = (SUN_MU / ASTRONOMICAL_UNIT).sqrt();
    let model = OrbitModel::new(v0, ASTRONOMICAL_UNIT).unwrap();
    let period = model.orbital_period().unwrap();

    c.bench_function("circular_orbit_1period", |b| {
        b.iter(|| model.state_at_time(black_box(period)).unwrap())
    });
}

fn bench_eccentric_orbit_1period(c: &mut Criterion) {
    let model = OrbitModel::new(40_000.0, ASTRONOMICAL_UNIT).unwrap();
    let period = model.orbital_period().unwrap();

    c.bench_function("eccentric_orbit_1period", |b| {
        b.iter(|| model.state_at_time(black_box(period)).unwrap())
    });
}

fn bench_polar_system_tight_tolerance(c: &mut Criterion) {
    let v0 = 35_000.0;
    let sys = PolarTwoBody {
        mu: SUN_MU,
        h: ASTRONOMICAL_UNIT * v0,
    };
    let y0 = [ASTRONOMICAL_UNIT, 0.0, 0.0];
    let period = OrbitModel::new(v0, ASTRONOMICAL_UNIT)
        .unwrap()
        .orbital_period()
        .unwrap();

    c.bench_function("polar_two_body_1e-12", |b| {
        b.iter(|| {
            let tol = Tolerances::new(1e-12, 1e-12);
            let mut solver = Rkf78::new(tol);
            solver
                .integrate(&sys, 0.0, black_box(&y0), period, period / 1000.0)
                .unwrap()
        })
    });
}

fn bench_trajectory_40_samples(c: &mut Criterion) {
    let model = OrbitModel::new(32_000.0, ASTRONOMICAL_UNIT).unwrap();

    c.bench_function("trajectory_40_samples", |b| {
        b.iter(|| model.trajectory(black_box(40)).unwrap())
    });
}

fn bench_aphelion_search(c: &mut Criterion) {
    let model = OrbitModel::new(35_000.0, ASTRONOMICAL_UNIT).unwrap();

    c.bench_function("aphelion_search", |b| {
        b.iter(|| model.next_apsis(black_box(ApsisKind::Aphelion)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_circular_orbit_1period,
    bench_eccentric_orbit_1period,
    bench_polar_system_tight_tolerance,
    bench_trajectory_40_samples,
    bench_aphelion_search
);
criterion_main!(benches);
