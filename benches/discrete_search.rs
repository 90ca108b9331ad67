use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skycheck::search::{find_discrete, find_maxima};

/// Quadrant of a phase turning once every `period` days, like the season or lunar phase
/// step functions.
#[inline]
fn quadrant(t: f64, period: f64) -> i32 {
    ((t / period).rem_euclid(1.0) * 4.0).floor() as i32
}

fn bench_discrete(c: &mut Criterion) {
    let start = 2_451_545.0;

    c.bench_function("find_discrete/seasons_50y", |b| {
        b.iter(|| {
            let events = find_discrete(
                black_box(start),
                black_box(start + 50.0 * 365.25),
                90.0,
                |t| Ok(quadrant(t, 365.2422)),
                None,
            )
            .unwrap();
            black_box(events)
        })
    });

    c.bench_function("find_discrete/moon_phases_1y", |b| {
        b.iter(|| {
            let events = find_discrete(
                black_box(start),
                black_box(start + 365.25),
                5.0,
                |t| Ok(quadrant(t, 29.530_589)),
                None,
            )
            .unwrap();
            black_box(events)
        })
    });
}

fn bench_extrema(c: &mut Criterion) {
    let start = 2_451_545.0;
    c.bench_function("find_maxima/cosine_10y", |b| {
        b.iter(|| {
            let maxima = find_maxima(
                black_box(start),
                black_box(start + 3652.5),
                10.0,
                |t| Ok((std::f64::consts::TAU * t / 29.530_589).cos()),
                None,
            )
            .unwrap();
            black_box(maxima)
        })
    });
}

criterion_group!(benches, bench_discrete, bench_extrema);
criterion_main!(benches);
