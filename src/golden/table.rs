//! Wide CSV tables: one `Time` column, then one column per quantity.
//!
//! Writing follows the reference tables byte for byte: floats are printed like C's
//! `%.17g` and a non-finite value is an empty cell. Reading is lenient: an empty or
//! unparsable cell becomes NaN, which the harness skips.
use std::io;

use ahash::AHashMap;
use camino::Utf8Path;
use tracing::debug;

use super::record::QuantityRecord;
use crate::skycheck_errors::SkycheckError;

pub const TIME_COLUMN: &str = "Time";

/// A dataset keyed by time, values stored row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WideTable {
    columns: Vec<String>,
    keys: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl WideTable {
    /// An empty table with the given quantity columns (without `Time`).
    pub fn new(columns: Vec<String>) -> Self {
        WideTable {
            columns,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn push_row(&mut self, key: impl Into<String>, row: Vec<f64>) -> Result<(), SkycheckError> {
        let key = key.into();
        if row.len() != self.columns.len() {
            return Err(SkycheckError::InvalidConfig(format!(
                "row '{key}' has {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.keys.push(key);
        self.values.push(row);
        Ok(())
    }

    /// Pivot records into rows, one per distinct instant index, in index order.
    ///
    /// Records whose column is not listed are ignored; missing cells are NaN.
    pub fn from_records(columns: Vec<String>, records: &[QuantityRecord]) -> Self {
        let position: AHashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        let mut table = WideTable::new(columns);

        let mut current: Option<usize> = None;
        for rec in records {
            if current != Some(rec.index) {
                current = Some(rec.index);
                table.keys.push(rec.time_key.clone());
                table.values.push(vec![f64::NAN; table.columns.len()]);
            }
            if let (Some(&col), Some(row)) = (position.get(&rec.column()), table.values.last_mut()) {
                row[col] = rec.value;
            }
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn n_rows(&self) -> usize {
        self.keys.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(f64::NAN)
    }

    pub fn row(&self, row: usize) -> Option<(&str, &[f64])> {
        Some((self.keys.get(row)?.as_str(), self.values.get(row)?.as_slice()))
    }

    /// Read a table with a `Time` column from any CSV source.
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Self, SkycheckError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let time_idx = headers
            .iter()
            .position(|h| h == TIME_COLUMN)
            .ok_or_else(|| SkycheckError::InvalidConfig("CSV has no 'Time' column".into()))?;
        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != time_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut table = WideTable::new(columns);
        for record in rdr.records() {
            let record = record?;
            let key = record.get(time_idx).unwrap_or_default().to_string();
            let row: Vec<f64> = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != time_idx)
                .map(|(_, cell)| cell.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect();
            table.push_row(key, row)?;
        }
        debug!(rows = table.n_rows(), columns = table.columns.len(), "CSV table read");
        Ok(table)
    }

    pub fn from_path(path: &Utf8Path) -> Result<Self, SkycheckError> {
        let file = std::fs::File::open(path)?;
        WideTable::read_csv(io::BufReader::new(file))
    }

    /// Write the table, `Time` first.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), SkycheckError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(std::iter::once(TIME_COLUMN).chain(self.columns.iter().map(String::as_str)))?;
        for (key, row) in self.keys.iter().zip(&self.values) {
            let cells = row.iter().map(|v| format_float(*v));
            wtr.write_record(std::iter::once(key.clone()).chain(cells))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_path(&self, path: &Utf8Path) -> Result<(), SkycheckError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(io::BufWriter::new(file))
    }
}

/// Format like C's `%.17g`; empty for NaN and infinities.
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let sci = format!("{value:.16e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return format!("{value:?}");
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return format!("{value:?}");
    };

    if !(-4..17).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_trailing_zeros(mantissa), exp.abs())
    } else {
        let precision = (16 - exp) as usize;
        strip_trailing_zeros(&format!("{value:.precision$}")).to_string()
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
