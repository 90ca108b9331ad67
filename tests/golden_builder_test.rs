mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use camino::Utf8Path;
use common::{analytic_context, AnalyticEphemeris};
use skycheck::{
    bodies::Body,
    config::SkycheckConfig,
    constants::J2000_JD,
    golden::{
        fixtures::{FixtureFamily, SeasonEntry, TimescaleEntry},
        CancellationToken, EventWindows, Fixture, FixtureGenerator, TimeGrid, WideTable,
    },
    harness::{compare, Category, Tolerances},
    jpl_ephem::{naif::naif_ids::PlanetaryBary, NaifIds},
    time::calendar_to_jd_utc,
    Skycheck, SkycheckError,
};

/// Sun, Moon and mean nodes on the default 1850..2149 grid, from the analytic ephemeris.
const GOLDEN_SUN_MOON: &str = "tests/data/golden_sun_moon.csv";

/// 1800-01-01 .. 2200-01-01.
const WIDE_COVERAGE: (f64, f64) = (2_378_496.5, 2_524_593.5);

fn sun_moon_config() -> SkycheckConfig {
    SkycheckConfig {
        bodies: vec![Body::Sun, Body::Moon],
        galactic_center: false,
        locations: Vec::new(),
        ..SkycheckConfig::default()
    }
}

fn year_2024() -> TimeGrid {
    TimeGrid::uniform(
        calendar_to_jd_utc(2024, 1, 1, 0, 0, 0),
        calendar_to_jd_utc(2024, 12, 31, 0, 0, 0),
        30.0,
    )
    .unwrap()
}

#[test]
fn test_build_and_round_trip_csv() {
    let ctx = analytic_context(SkycheckConfig::default());
    let grid = year_2024();
    let dataset = ctx
        .builder()
        .build_grid(&grid, &CancellationToken::new())
        .unwrap();

    // 10 bodies + gc + 6 sites, two angles each, plus both nodes
    assert_eq!(dataset.columns.len(), 36);
    assert_eq!(dataset.records.len(), 36 * grid.len());
    assert_eq!(dataset.dropped, 0);
    assert!(dataset.records.windows(2).all(|w| w[0].index <= w[1].index));
    assert_eq!(dataset.records[0].time_key, "2024-01-01 00:00:00+00:00");

    let table = dataset.to_table();
    assert_eq!(table.n_rows(), grid.len());
    assert_eq!(table.columns()[0], "sun_lat_deg");
    assert_eq!(table.columns()[35], "south_node_lon_deg");

    // coplanar circular orbits stay on the J2000 ecliptic
    let lat = table.column_index("mars_lat_deg").unwrap();
    for row in 0..table.n_rows() {
        assert_abs_diff_eq!(table.value(row, lat), 0.0, epsilon = 1e-6);
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("golden.csv");
    let path = Utf8Path::from_path(&path).unwrap();
    table.to_path(path).unwrap();
    let back = WideTable::from_path(path).unwrap();
    assert_eq!(back, table);

    let report = compare(&table, &back, &Tolerances::default()).unwrap();
    assert!(report.passed());
    assert_eq!(report.matched_rows, grid.len());
    let planets = report
        .categories
        .iter()
        .find(|c| c.category == Category::Planets)
        .unwrap();
    assert_eq!(planets.columns, 20);
    assert_eq!(planets.rollup.unwrap().max, 0.0);
}

#[test]
fn test_perturbed_dataset_fails_planets_only() {
    let ctx = analytic_context(SkycheckConfig::default());
    let table = ctx
        .builder()
        .build_grid(&year_2024(), &CancellationToken::new())
        .unwrap()
        .to_table();

    let mars = table.column_index("mars_lon_deg").unwrap();
    let mut perturbed = WideTable::new(table.columns().to_vec());
    for row in 0..table.n_rows() {
        let (key, values) = table.row(row).unwrap();
        let mut values = values.to_vec();
        values[mars] += 1e-3;
        perturbed.push_row(key, values).unwrap();
    }

    let report = compare(&table, &perturbed, &Tolerances::default()).unwrap();
    assert_eq!(report.failed_categories(), vec![Category::Planets]);
    let column = report
        .columns
        .iter()
        .find(|c| c.column == "mars_lon_deg")
        .unwrap();
    assert!(!column.passed);
    assert_abs_diff_eq!(column.stats.unwrap().max, 1e-3, epsilon = 1e-9);
    assert_eq!(
        report.into_result(),
        Err(SkycheckError::ToleranceExceeded(vec!["Planets".to_string()]))
    );
}

#[test]
fn test_disjoint_datasets_do_not_match() {
    let ctx = analytic_context(SkycheckConfig::default());
    let cancel = CancellationToken::new();
    let a = ctx.builder().build_grid(&year_2024(), &cancel).unwrap();
    let shifted = TimeGrid::from_jds(year_2024().jd_utc().iter().map(|jd| jd + 0.5).collect());
    let b = ctx.builder().build_grid(&shifted, &cancel).unwrap();

    assert!(matches!(
        compare(&a.to_table(), &b.to_table(), &Tolerances::default()),
        Err(SkycheckError::UnmatchedRows { .. })
    ));
}

#[test]
fn test_cancelled_build() {
    let ctx = analytic_context(SkycheckConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(
        ctx.builder().build_grid(&year_2024(), &cancel),
        Err(SkycheckError::Cancelled(0))
    );
}

#[test]
fn test_unsupported_body_is_dropped() {
    let ephem = AnalyticEphemeris::new().without(NaifIds::PB(PlanetaryBary::Pluto));
    let ctx = Skycheck::new(Arc::new(ephem), SkycheckConfig::default());
    let grid = year_2024();
    let dataset = ctx
        .builder()
        .build_grid(&grid, &CancellationToken::new())
        .unwrap();
    assert_eq!(dataset.dropped, 2 * grid.len());

    let table = dataset.to_table();
    let pluto = table.column_index("pluto_lon_deg").unwrap();
    assert!(table.value(0, pluto).is_nan());

    let mut csv = Vec::new();
    table.write_csv(&mut csv).unwrap();
    let header_and_first = String::from_utf8(csv).unwrap();
    let first_row = header_and_first.lines().nth(1).unwrap();
    assert!(first_row.contains(",,"));

    // the NaN column has no finite pair and does not fail the comparison
    let report = compare(&table, &table, &Tolerances::default()).unwrap();
    let pluto = report
        .columns
        .iter()
        .find(|c| c.column == "pluto_lon_deg")
        .unwrap();
    assert!(pluto.stats.is_none());
    assert!(report.passed());
}

#[test]
fn test_configured_grid_is_clamped_to_coverage() {
    let ctx = analytic_context(SkycheckConfig::default());
    let grid = ctx.builder().configured_grid().unwrap();
    let (start, end) = ctx.ephem().coverage();
    assert!(!grid.is_empty());
    assert!(grid.len() < 3653);
    assert!(grid.jd_utc()[0] >= start - 1.0);
    assert!(*grid.jd_utc().last().unwrap() <= end + 1.0);

    let outside = Skycheck::new(
        Arc::new(AnalyticEphemeris::with_coverage(J2000_JD, J2000_JD + 10.0)),
        SkycheckConfig::default(),
    );
    assert!(matches!(
        outside.builder().configured_grid(),
        Err(SkycheckError::OutOfRangeTime { .. })
    ));
}

#[test]
fn test_fixtures() {
    let ctx = analytic_context(SkycheckConfig::default());
    let generator = FixtureGenerator::new(&ctx);
    let instants: Vec<_> = year_2024()
        .jd_utc()
        .iter()
        .map(|&jd| ctx.instant(jd).unwrap())
        .collect();

    let timescale = generator.timescale(&instants);
    assert_eq!(timescale.tests.len(), instants.len());
    let first = &timescale.tests[0];
    assert_abs_diff_eq!((first.tt_jd - first.utc_jd) * 86400.0, 69.184, epsilon = 1e-4);

    let ecliptic = generator.ecliptic(&instants).unwrap();
    assert_eq!(ecliptic.tests.len(), 11 * instants.len());
    let gc = ecliptic.tests.iter().find(|e| e.body_name == "gc").unwrap();
    assert_eq!(gc.body_id, 0);
    assert_abs_diff_eq!(gc.ecl_lat_deg, -5.536, epsilon = 0.01);

    let phase = generator.phase(&instants).unwrap();
    assert!(phase
        .tests
        .iter()
        .all(|p| (0.0..=1.0).contains(&p.fraction_illuminated)
            && (0.0..=180.0).contains(&p.phase_angle_deg)));

    let separation = generator.separation(&instants).unwrap();
    assert!(separation
        .tests
        .iter()
        .all(|s| (0.0..=180.0).contains(&s.separation_deg)));

    let elongation = generator.elongation(&instants).unwrap();
    assert!(elongation
        .tests
        .iter()
        .all(|e| (0.0..360.0).contains(&e.elongation_deg)));

    let refraction = generator.refraction();
    assert_eq!(refraction.tests.len(), 3 * 93);

    let seasons = generator.seasons(&EventWindows::default()).unwrap();
    assert_eq!(seasons.tests.len(), 204);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(FixtureFamily::Seasons.file_name());
    let path = Utf8Path::from_path(&path).unwrap();
    seasons.to_path(path).unwrap();
    let back: Fixture<SeasonEntry> = Fixture::from_path(path).unwrap();
    assert_eq!(back, seasons);

    let twilight = generator.twilight(&EventWindows::default()).unwrap();
    assert_eq!(twilight.metadata["lat"], 40.7128);
    assert!(twilight.tests.iter().all(|e| (0..=4).contains(&e.level)));

    let oppositions = generator
        .oppositions(Body::Mars, &EventWindows::default())
        .unwrap();
    assert_eq!(oppositions.metadata["body_id"], 4);

    let empty: Fixture<TimescaleEntry> = Fixture::new(FixtureFamily::Timescale, Vec::new());
    assert!(empty.tests.is_empty());
}

#[test]
fn test_default_grid_matches_golden_table() {
    let golden = WideTable::from_path(Utf8Path::new(GOLDEN_SUN_MOON)).unwrap();
    assert_eq!(golden.n_rows(), 3653);

    let (start, end) = WIDE_COVERAGE;
    let ctx = Skycheck::new(
        Arc::new(AnalyticEphemeris::with_coverage(start, end)),
        sun_moon_config(),
    );
    let dataset = ctx.builder().build(&CancellationToken::new()).unwrap();
    assert_eq!(dataset.dropped, 0);

    let table = dataset.to_table();
    assert_eq!(table.columns(), golden.columns());
    assert_eq!(table.keys().first().unwrap(), "1850-01-01 00:00:00+00:00");
    assert_eq!(table.keys().last().unwrap(), "2149-12-19 00:00:00+00:00");

    let report = compare(&table, &golden, &ctx.config().tolerances)
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(report.matched_rows, 3653);
    assert_eq!(report.unmatched_left() + report.unmatched_right(), 0);
    for category in [Category::Planets, Category::LunarNodes] {
        let summary = report
            .categories
            .iter()
            .find(|c| c.category == category)
            .unwrap();
        assert!(summary.rollup.unwrap().max < 1e-6, "{report}");
    }
}

#[test]
fn test_clamped_grid_matches_golden_subset() {
    let golden = WideTable::from_path(Utf8Path::new(GOLDEN_SUN_MOON)).unwrap();
    // 1900..2100 only
    let ctx = analytic_context(sun_moon_config());
    let grid = ctx.builder().configured_grid().unwrap();
    assert!(grid.len() < golden.n_rows());

    let table = ctx
        .builder()
        .build_grid(&grid, &CancellationToken::new())
        .unwrap()
        .to_table();
    let report = compare(&table, &golden, &ctx.config().tolerances).unwrap();
    assert!(report.passed(), "{report}");
    assert_eq!(report.matched_rows, grid.len());
    assert_eq!(report.unmatched_right(), golden.n_rows() - grid.len());
}
