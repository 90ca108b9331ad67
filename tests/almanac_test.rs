mod common;

use approx::assert_abs_diff_eq;
use common::analytic_context;
use skycheck::{
    bodies::Body,
    config::SkycheckConfig,
    observers::GeodeticLocation,
    search::DiscreteEvent,
    time::calendar_to_jd_utc,
    Skycheck, SkycheckError,
};

fn tdb(ctx: &Skycheck, year: i32, month: u8, day: u8) -> f64 {
    ctx.instant(calendar_to_jd_utc(year, month, day, 0, 0, 0))
        .unwrap()
        .tdb()
}

fn nyc() -> GeodeticLocation {
    GeodeticLocation::new("loc_nyc", 40.7128, -74.0060).unwrap()
}

fn assert_cyclic(events: &[DiscreteEvent], modulus: i32) {
    for pair in events.windows(2) {
        assert_eq!(pair[1].new_value, (pair[0].new_value + 1) % modulus);
        assert!(pair[1].t > pair[0].t);
    }
}

#[test]
fn test_seasons_2000_2050() {
    let ctx = analytic_context(SkycheckConfig::default());
    let start = tdb(&ctx, 2000, 1, 1);
    let end = tdb(&ctx, 2050, 12, 31);
    let seasons = ctx.almanac().seasons(start, end).unwrap();

    assert_eq!(seasons.len(), 204);
    assert_eq!(seasons[0].new_value, 0);
    assert_eq!(seasons[203].new_value, 3);
    assert_cyclic(&seasons, 4);

    // the parallel window split finds the same events
    let windowed = ctx
        .almanac()
        .in_windows(start, end, 3652.5, |a, s, e| a.seasons(s, e))
        .unwrap();
    assert_eq!(windowed.len(), seasons.len());
    for (w, s) in windowed.iter().zip(&seasons) {
        assert_eq!(w.new_value, s.new_value);
        assert_abs_diff_eq!(w.t, s.t, epsilon = 1e-6);
    }
}

#[test]
fn test_moon_phases_2024() {
    let ctx = analytic_context(SkycheckConfig::default());
    let phases = ctx
        .almanac()
        .moon_phases(tdb(&ctx, 2024, 1, 1), tdb(&ctx, 2025, 1, 1))
        .unwrap();
    assert!((49..=50).contains(&phases.len()), "{} phases", phases.len());
    assert_cyclic(&phases, 4);

    let full: Vec<f64> = phases
        .iter()
        .filter(|e| e.new_value == 2)
        .map(|e| e.t)
        .collect();
    for pair in full.windows(2) {
        // circular orbits give a constant synodic month
        assert_abs_diff_eq!(pair[1] - pair[0], 29.53, epsilon = 0.05);
    }
}

#[test]
fn test_sunrise_sunset_nyc() {
    let ctx = analytic_context(SkycheckConfig::default());
    let start = tdb(&ctx, 2024, 1, 1);
    let events = ctx
        .almanac()
        .sunrise_sunset(&nyc(), start, start + 10.0)
        .unwrap();

    assert_eq!(events.len(), 20);
    assert_eq!(events[0].new_value, 1);
    assert_cyclic(&events, 2);
    for e in &events {
        let utc_hour = ((e.t - 0.5).rem_euclid(1.0)) * 24.0;
        if e.new_value == 1 {
            assert!((11.5..13.5).contains(&utc_hour), "sunrise at {utc_hour} h UTC");
        } else {
            assert!((20.5..22.5).contains(&utc_hour), "sunset at {utc_hour} h UTC");
        }
    }
}

#[test]
fn test_twilight_nyc() {
    let ctx = analytic_context(SkycheckConfig::default());
    let start = tdb(&ctx, 2024, 1, 1);
    let events = ctx.almanac().twilight(&nyc(), start, start + 2.0).unwrap();

    assert_eq!(events.len(), 16);
    let levels: Vec<i32> = events.iter().take(8).map(|e| e.new_value).collect();
    assert_eq!(levels, vec![1, 2, 3, 4, 3, 2, 1, 0]);
    for pair in events.windows(2) {
        assert_eq!((pair[1].new_value - pair[0].new_value).abs(), 1);
    }
}

#[test]
fn test_sun_rise_set_transit() {
    let ctx = analytic_context(SkycheckConfig::default());
    let almanac = ctx.almanac();
    let site = nyc();
    let start = tdb(&ctx, 2024, 3, 1);
    let end = start + 3.0;

    let risings = almanac.risings(Body::Sun, &site, start, end).unwrap();
    let settings = almanac.settings(Body::Sun, &site, start, end).unwrap();
    let transits = almanac.transits(Body::Sun, &site, start, end).unwrap();
    assert_eq!(risings.len(), 3);
    assert_eq!(settings.len(), 3);
    assert_eq!(transits.len(), 3);

    for ((rise, transit), set) in risings.iter().zip(&transits).zip(&settings) {
        assert!(rise.t < transit.t && transit.t < set.t);
        // local noon is halfway between rising and setting
        assert_abs_diff_eq!(transit.t, 0.5 * (rise.t + set.t), epsilon = 0.01);
        let altitude = almanac.altitude(Body::Sun, &site, transit.t).unwrap();
        assert!(altitude > 40.0 && altitude < 50.0);
    }
}

#[test]
fn test_mars_oppositions() {
    let ctx = analytic_context(SkycheckConfig::default());
    let events = ctx
        .almanac()
        .oppositions_conjunctions(Body::Mars, tdb(&ctx, 2000, 1, 1), tdb(&ctx, 2050, 12, 31))
        .unwrap();
    assert_cyclic(&events, 2);
    let oppositions = events.iter().filter(|e| e.new_value == 1).count();
    assert!((23..=24).contains(&oppositions), "{oppositions} oppositions");
}

#[test]
fn test_invalid_windows() {
    let ctx = analytic_context(SkycheckConfig::default());
    let almanac = ctx.almanac();
    let t = tdb(&ctx, 2024, 1, 1);
    assert!(matches!(
        almanac.seasons(t, t - 1.0),
        Err(SkycheckError::InvalidRange { .. })
    ));
    assert!(matches!(
        almanac.in_windows(t, t + 10.0, 0.0, |a, s, e| a.seasons(s, e)),
        Err(SkycheckError::InvalidStep(_))
    ));
    // outside the ephemeris coverage
    assert!(matches!(
        almanac.seasons(2_300_000.5, 2_300_400.5),
        Err(SkycheckError::OutOfRangeTime { .. })
    ));
}
