//! Directory footer of an SPK Type 2/3 segment.
//!
//! The last four DP words of every Chebyshev segment describe its fixed-length records:
//!
//! * `init`: start of the first record (TDB seconds past J2000),
//! * `intlen`: length of each record's time span (seconds),
//! * `rsize`: record size in DP words (`2 + 3·ncoeff` for Type 2, `2 + 6·ncoeff` for Type 3),
//! * `n_records`: number of records in the segment.
use std::fmt;

use crate::skycheck_errors::SkycheckError;

#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    pub init: f64,
    pub intlen: f64,
    pub rsize: usize,
    pub n_records: usize,
}

impl DirectoryData {
    /// Read the footer from the decoded words of a segment.
    ///
    /// Arguments
    /// -----------------
    /// * `words`: every DP word of the segment, footer included.
    ///
    /// Return
    /// ----------
    /// * The footer, or [`SkycheckError::InvalidKernel`] when it is inconsistent with
    ///   the segment length.
    pub fn from_segment_words(words: &[f64]) -> Result<Self, SkycheckError> {
        let n = words.len();
        if n < 4 {
            return Err(SkycheckError::InvalidKernel(format!(
                "segment of {n} words has no directory"
            )));
        }
        let dir = DirectoryData {
            init: words[n - 4],
            intlen: words[n - 3],
            rsize: words[n - 2] as usize,
            n_records: words[n - 1] as usize,
        };

        if dir.intlen.is_nan() || dir.intlen <= 0.0 || dir.rsize < 3 || dir.n_records == 0 {
            return Err(SkycheckError::InvalidKernel(format!("bad segment directory: {dir}")));
        }
        let announced = dir
            .rsize
            .checked_mul(dir.n_records)
            .and_then(|words| words.checked_add(4));
        if announced.map_or(true, |words| words > n) {
            return Err(SkycheckError::InvalidKernel(format!(
                "directory announces {} records of {} words in a {n}-word segment",
                dir.n_records, dir.rsize
            )));
        }
        Ok(dir)
    }

    /// Index of the record covering `et_seconds`, clamped into the segment.
    pub fn record_index(&self, et_seconds: f64) -> usize {
        let idx = ((et_seconds - self.init) / self.intlen).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.n_records - 1)
        }
    }
}

impl fmt::Display for DirectoryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "init={} intlen={} rsize={} n={}",
            self.init, self.intlen, self.rsize, self.n_records
        )
    }
}
