//! # Comparison harness
//!
//! Aligns two independently produced [`WideTable`]s on their time key and measures how far
//! apart they are, column by column and per semantic [`Category`].
//!
//! ## Pipeline
//!
//! 1. **Join** rows whose `Time` strings are identical. Rows present on one side only are
//!    counted; if no row matches at all the comparison fails with
//!    [`SkycheckError::UnmatchedRows`].
//! 2. **Columns** present in both tables are compared; columns present in one table only
//!    are listed in the report.
//! 3. **Per column**: `{count, max, mean, median}` of `|a − b|` over the rows where both
//!    values are finite (rayon, one task per column). A column without any finite pair is
//!    reported as `N/A`.
//! 4. **Per category**: max of the column maxima, mean of the column means, median of the
//!    column medians.
//! 5. **Verdict**: a category fails when its rolled-up statistic (selected by its
//!    [`ToleranceSpec`]) exceeds the bound. A failing category never aborts the run: the
//!    report is always complete; [`Report::into_result`] turns failures into
//!    [`SkycheckError::ToleranceExceeded`].
pub mod category;
pub mod stats;

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{golden::WideTable, skycheck_errors::SkycheckError};

pub use category::{categorize, Category};
pub use stats::{ErrorStats, Statistic};

/// Bound on one statistic of a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToleranceSpec {
    pub bound: f64,
    #[serde(default)]
    pub statistic: Statistic,
}

impl ToleranceSpec {
    pub fn max(bound: f64) -> Self {
        ToleranceSpec {
            bound,
            statistic: Statistic::Max,
        }
    }

    pub fn accepts(&self, stats: &ErrorStats) -> bool {
        stats.get(self.statistic) <= self.bound
    }
}

/// Tolerances by category; a category without an entry always passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerances(BTreeMap<Category, ToleranceSpec>);

impl Default for Tolerances {
    /// 1e-6° on every angular category, 1 km on positions.
    fn default() -> Self {
        let mut map = BTreeMap::new();
        for category in [
            Category::Planets,
            Category::GalacticCenter,
            Category::LunarNodes,
            Category::Locations,
            Category::Satellites,
        ] {
            map.insert(category, ToleranceSpec::max(1e-6));
        }
        map.insert(Category::Positions, ToleranceSpec::max(1.0));
        Tolerances(map)
    }
}

impl Tolerances {
    pub fn empty() -> Self {
        Tolerances(BTreeMap::new())
    }

    pub fn with(mut self, category: Category, spec: ToleranceSpec) -> Self {
        self.0.insert(category, spec);
        self
    }

    pub fn get(&self, category: Category) -> Option<&ToleranceSpec> {
        self.0.get(&category)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReport {
    pub column: String,
    pub category: Category,
    /// `None` when no row has a finite value on both sides.
    pub stats: Option<ErrorStats>,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub category: Category,
    /// Number of columns with statistics.
    pub columns: usize,
    pub rollup: Option<ErrorStats>,
    pub tolerance: Option<ToleranceSpec>,
    pub passed: bool,
}

/// Outcome of [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub left_rows: usize,
    pub right_rows: usize,
    pub matched_rows: usize,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
    pub columns: Vec<ColumnReport>,
    pub categories: Vec<CategoryReport>,
}

impl Report {
    pub fn unmatched_left(&self) -> usize {
        self.left_rows.saturating_sub(self.matched_rows)
    }

    pub fn unmatched_right(&self) -> usize {
        self.right_rows.saturating_sub(self.matched_rows)
    }

    pub fn failed_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.category)
            .collect()
    }

    pub fn passed(&self) -> bool {
        self.categories.iter().all(|c| c.passed)
    }

    /// The report itself when every category passed, `ToleranceExceeded` otherwise.
    pub fn into_result(self) -> Result<Self, SkycheckError> {
        let failed = self.failed_categories();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(SkycheckError::ToleranceExceeded(
                failed.iter().map(|c| c.to_string()).collect(),
            ))
        }
    }
}

/// Row index of every time key, rejecting repeated keys.
fn index_keys<'t>(
    table: &'t WideTable,
    side: &'static str,
) -> Result<AHashMap<&'t str, usize>, SkycheckError> {
    let mut index = AHashMap::with_capacity(table.n_rows());
    for (row, key) in table.keys().iter().enumerate() {
        if index.insert(key.as_str(), row).is_some() {
            return Err(SkycheckError::DuplicateTimeKey {
                key: key.clone(),
                side,
            });
        }
    }
    Ok(index)
}

/// Compare two datasets.
///
/// Arguments
/// -----------------
/// * `left`, `right`: tables sharing a `Time` key and `<label>_<quantity>` columns.
/// * `tolerances`: bound per category.
///
/// Return
/// ----------
/// * The full [`Report`], [`SkycheckError::UnmatchedRows`] when no time key matches, or
///   [`SkycheckError::DuplicateTimeKey`] when a key occurs twice in either table.
#[instrument(skip_all, fields(left = left.n_rows(), right = right.n_rows()))]
pub fn compare(
    left: &WideTable,
    right: &WideTable,
    tolerances: &Tolerances,
) -> Result<Report, SkycheckError> {
    index_keys(left, "left")?;
    let right_index = index_keys(right, "right")?;
    let pairs: Vec<(usize, usize)> = left
        .keys()
        .iter()
        .enumerate()
        .filter_map(|(i, key)| right_index.get(key.as_str()).map(|&j| (i, j)))
        .collect();

    if pairs.is_empty() {
        return Err(SkycheckError::UnmatchedRows {
            left_rows: left.n_rows(),
            right_rows: right.n_rows(),
        });
    }
    let matched_rows = pairs.len();
    if matched_rows < left.n_rows() || matched_rows < right.n_rows() {
        warn!(
            matched_rows,
            unmatched_left = left.n_rows().saturating_sub(matched_rows),
            unmatched_right = right.n_rows().saturating_sub(matched_rows),
            "rows without a partner were left out"
        );
    }

    let left_cols: BTreeSet<&str> = left.columns().iter().map(String::as_str).collect();
    let right_cols: BTreeSet<&str> = right.columns().iter().map(String::as_str).collect();
    let common: Vec<&str> = left_cols.intersection(&right_cols).copied().collect();
    let only_left = left_cols.difference(&right_cols).map(|c| c.to_string()).collect();
    let only_right = right_cols.difference(&left_cols).map(|c| c.to_string()).collect();

    let columns: Vec<ColumnReport> = common
        .par_iter()
        .filter_map(|name| {
            let li = left.column_index(name)?;
            let ri = right.column_index(name)?;
            let a: Vec<f64> = pairs.iter().map(|&(i, _)| left.value(i, li)).collect();
            let b: Vec<f64> = pairs.iter().map(|&(_, j)| right.value(j, ri)).collect();
            let category = categorize(name);
            let stats = ErrorStats::from_pairs(&a, &b);
            let passed = match (tolerances.get(category), &stats) {
                (Some(spec), Some(s)) => spec.accepts(s),
                _ => true,
            };
            Some(ColumnReport {
                column: name.to_string(),
                category,
                stats,
                passed,
            })
        })
        .collect();

    let categories = Category::REPORTED
        .iter()
        .map(|&category| rollup(category, &columns, tolerances))
        .collect::<Vec<_>>();

    let report = Report {
        left_rows: left.n_rows(),
        right_rows: right.n_rows(),
        matched_rows,
        only_left,
        only_right,
        columns,
        categories,
    };
    info!(
        matched_rows,
        passed = report.passed(),
        "comparison finished"
    );
    Ok(report)
}

fn rollup(category: Category, columns: &[ColumnReport], tolerances: &Tolerances) -> CategoryReport {
    let per_column: Vec<&ErrorStats> = columns
        .iter()
        .filter(|c| c.category == category)
        .filter_map(|c| c.stats.as_ref())
        .collect();
    let tolerance = tolerances.get(category).copied();

    let rollup = if per_column.is_empty() {
        None
    } else {
        let n = per_column.len();
        let mut medians: Vec<f64> = per_column.iter().map(|s| s.median).collect();
        Some(ErrorStats {
            count: per_column.iter().map(|s| s.count).sum(),
            max: per_column.iter().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max),
            mean: per_column.iter().map(|s| s.mean).sum::<f64>() / n as f64,
            median: stats::median(&mut medians),
        })
    };
    let passed = match (&tolerance, &rollup) {
        (Some(spec), Some(r)) => spec.accepts(r),
        _ => true,
    };
    CategoryReport {
        category,
        columns: per_column.len(),
        rollup,
        tolerance,
        passed,
    }
}

/// `1.23e-07`, the exponent padded to two digits.
fn sci(value: f64) -> String {
    let s = format!("{value:.2e}");
    match s.split_once('e') {
        Some((m, e)) => {
            let (sign, digits) = match e.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', e),
            };
            format!("{m}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

const RULE_WIDTH: usize = 98;

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Left rows: {}, right rows: {}", self.left_rows, self.right_rows)?;
        writeln!(f, "Matched rows (by Time): {}", self.matched_rows)?;
        writeln!(f, "Unmatched left rows: {}", self.unmatched_left())?;
        writeln!(f, "Unmatched right rows: {}", self.unmatched_right())?;
        if !self.only_left.is_empty() {
            writeln!(f, "Columns only in left: {:?}", self.only_left)?;
        }
        if !self.only_right.is_empty() {
            writeln!(f, "Columns only in right: {:?}", self.only_right)?;
        }

        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "\n{rule}")?;
        writeln!(
            f,
            "{:<30} {:<16} {:>7} {:>12} {:>12} {:>12} {:>6}",
            "Column", "Category", "Rows", "Max Error", "Mean Error", "Median Error", "Status"
        )?;
        writeln!(f, "{rule}")?;
        for col in &self.columns {
            let status = if col.passed { "ok" } else { "FAIL" };
            match &col.stats {
                Some(s) => writeln!(
                    f,
                    "{:<30} {:<16} {:>7} {:>12} {:>12} {:>12} {:>6}",
                    col.column,
                    col.category.name(),
                    s.count,
                    sci(s.max),
                    sci(s.mean),
                    sci(s.median),
                    status
                )?,
                None => writeln!(
                    f,
                    "{:<30} {:<16} {:>7} {:>12} {:>12} {:>12} {:>6}",
                    col.column,
                    col.category.name(),
                    0,
                    "N/A",
                    "N/A",
                    "N/A",
                    status
                )?,
            }
        }

        writeln!(f, "\n{rule}")?;
        writeln!(
            f,
            "{:<20} {:>12} {:>12} {:>12} {:>16} {:>6}",
            "Category", "Max Error", "Mean Error", "Median Error", "Tolerance", "Status"
        )?;
        writeln!(f, "{rule}")?;
        for cat in &self.categories {
            let tolerance = cat.tolerance.map_or("-".to_string(), |t| {
                format!("{:?} {}", t.statistic, sci(t.bound)).to_lowercase()
            });
            let status = if cat.passed { "PASS" } else { "FAIL" };
            match &cat.rollup {
                Some(r) => writeln!(
                    f,
                    "{:<20} {:>12} {:>12} {:>12} {:>16} {:>6}",
                    cat.category.name(),
                    sci(r.max),
                    sci(r.mean),
                    sci(r.median),
                    tolerance,
                    status
                )?,
                None => writeln!(
                    f,
                    "{:<20} {:>12} {:>12} {:>12} {:>16} {:>6}",
                    cat.category.name(),
                    "N/A",
                    "N/A",
                    "N/A",
                    tolerance,
                    status
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod harness_test {
    use super::*;

    fn table(columns: &[&str], rows: &[(&str, Vec<f64>)]) -> WideTable {
        let mut t = WideTable::new(columns.iter().map(|c| c.to_string()).collect());
        for (key, values) in rows {
            t.push_row(*key, values.clone()).unwrap();
        }
        t
    }

    #[test]
    fn test_sci_format() {
        assert_eq!(sci(1.234e-7), "1.23e-07");
        assert_eq!(sci(0.0), "0.00e+00");
        assert_eq!(sci(12345.0), "1.23e+04");
    }

    #[test]
    fn test_duplicate_time_keys_are_rejected() {
        let unique = table(&["mars_lat_deg"], &[("t1", vec![1.0]), ("t2", vec![2.0])]);
        let repeated = table(&["mars_lat_deg"], &[("t1", vec![1.0]), ("t1", vec![5.0])]);

        assert_eq!(
            compare(&unique, &repeated, &Tolerances::default()).unwrap_err(),
            SkycheckError::DuplicateTimeKey {
                key: "t1".into(),
                side: "right"
            }
        );
        assert_eq!(
            compare(&repeated, &unique, &Tolerances::default()).unwrap_err(),
            SkycheckError::DuplicateTimeKey {
                key: "t1".into(),
                side: "left"
            }
        );
    }

    #[test]
    fn test_compare_reports_errors_by_category() {
        let a = table(
            &["mars_lat_deg", "loc_ny_lon_deg", "only_a"],
            &[("t1", vec![1.0, 10.0, 0.0]), ("t2", vec![2.0, 20.0, 0.0]), ("t3", vec![3.0, 30.0, 0.0])],
        );
        let b = table(
            &["mars_lat_deg", "loc_ny_lon_deg", "only_b"],
            &[("t2", vec![2.0, 20.5, 0.0]), ("t1", vec![1.0 + 1e-8, 10.0, 0.0]), ("t9", vec![0.0, 0.0, 0.0])],
        );
        let report = compare(&a, &b, &Tolerances::default()).unwrap();

        assert_eq!(report.matched_rows, 2);
        assert_eq!(report.unmatched_left(), 1);
        assert_eq!(report.unmatched_right(), 1);
        assert_eq!(report.only_left, vec!["only_a".to_string()]);
        assert_eq!(report.only_right, vec!["only_b".to_string()]);

        let planets = report
            .categories
            .iter()
            .find(|c| c.category == Category::Planets)
            .unwrap();
        assert!(planets.passed);
        let locations = report
            .categories
            .iter()
            .find(|c| c.category == Category::Locations)
            .unwrap();
        assert!(!locations.passed);
        assert_eq!(locations.rollup.unwrap().max, 0.5);

        assert!(!report.passed());
        assert_eq!(
            report.clone().into_result(),
            Err(SkycheckError::ToleranceExceeded(vec!["Locations".into()]))
        );

        let text = report.to_string();
        assert!(text.contains("Matched rows (by Time): 2"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn test_disjoint_time_keys_are_fatal() {
        let a = table(&["sun_lat_deg"], &[("2000", vec![0.0])]);
        let b = table(&["sun_lat_deg"], &[("2001", vec![0.0])]);
        assert_eq!(
            compare(&a, &b, &Tolerances::default()),
            Err(SkycheckError::UnmatchedRows {
                left_rows: 1,
                right_rows: 1
            })
        );
    }

    #[test]
    fn test_column_without_finite_pairs() {
        let a = table(&["gc_lat_deg"], &[("t", vec![f64::NAN])]);
        let b = table(&["gc_lat_deg"], &[("t", vec![1.0])]);
        let report = compare(&a, &b, &Tolerances::default()).unwrap();
        assert!(report.columns[0].stats.is_none());
        assert!(report.passed());
    }

    #[test]
    fn test_tolerance_statistic_selection() {
        let a = table(&["sun_lon_deg"], &[("1", vec![0.0]), ("2", vec![0.0]), ("3", vec![0.0])]);
        let b = table(&["sun_lon_deg"], &[("1", vec![0.0]), ("2", vec![0.0]), ("3", vec![9.0])]);
        let by_median = Tolerances::empty().with(
            Category::Planets,
            ToleranceSpec {
                bound: 1e-6,
                statistic: Statistic::Median,
            },
        );
        assert!(compare(&a, &b, &by_median).unwrap().passed());
        let by_max = Tolerances::empty().with(Category::Planets, ToleranceSpec::max(1e-6));
        assert!(!compare(&a, &b, &by_max).unwrap().passed());
    }
}
