//! Segment summaries of a DAF/SPK kernel.
//!
//! Summary records form a doubly linked list starting at `DAFHeader::fward`. Each record
//! begins with three control doubles (`next`, `prev`, `nsum`) followed by `nsum` packed
//! summaries of `nd + ceil(ni / 2)` DP words. For SPK, a summary is:
//!
//! ```text
//! [ start_et, end_et | target, center, frame, type, initial_addr, final_addr ]
//! ```
use std::fmt;

use hifitime::Epoch;
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f64, le_i32},
    IResult,
};

use crate::skycheck_errors::SkycheckError;

use super::daf_header::{DAFHeader, DAF_RECORD_BYTES};

/// Descriptor of one SPK segment.
#[derive(Debug, PartialEq, Clone)]
pub struct Summary {
    /// Coverage start, TDB seconds past J2000.
    pub start_epoch: f64,
    /// Coverage end, TDB seconds past J2000.
    pub end_epoch: f64,
    pub target: i32,
    pub center: i32,
    pub frame_id: i32,
    pub data_type: i32,
    /// 1-based DP-word address of the first segment word.
    pub initial_addr: i32,
    /// 1-based DP-word address of the last segment word.
    pub final_addr: i32,
}

impl Summary {
    fn parse(input: &[u8], nd: usize, ni: usize) -> IResult<&[u8], Self> {
        let (input, doubles) = count(le_f64, nd)(input)?;
        let (input, ints) = count(le_i32, ni)(input)?;
        // integer block is padded to a whole number of DP words
        let (input, _) = take((ni % 2) * 4)(input)?;
        Ok((
            input,
            Summary {
                start_epoch: doubles[0],
                end_epoch: doubles[1],
                target: ints[0],
                center: ints[1],
                frame_id: ints[2],
                data_type: ints[3],
                initial_addr: ints[4],
                final_addr: ints[5],
            },
        ))
    }

    /// Whether `et_seconds` lies inside the segment coverage (bounds included).
    pub fn covers(&self, et_seconds: f64) -> bool {
        et_seconds >= self.start_epoch && et_seconds <= self.end_epoch
    }
}

/// Walk the summary-record list and collect every segment summary.
///
/// Arguments
/// -----------------
/// * `file`: the whole kernel.
/// * `header`: the parsed file record.
///
/// Return
/// ----------
/// * All summaries in file order, or [`SkycheckError::InvalidKernel`] if a record
///   pointer leaves the file or the list loops.
pub fn read_summaries(file: &[u8], header: &DAFHeader) -> Result<Vec<Summary>, SkycheckError> {
    let nd = header.nd as usize;
    let ni = header.ni as usize;
    let summary_bytes = header.summary_words() * 8;
    let max_records = file.len() / DAF_RECORD_BYTES;

    let mut summaries = Vec::new();
    let mut record_number = header.fward as usize;
    let mut visited = 0;

    while record_number != 0 {
        visited += 1;
        if visited > max_records {
            return Err(SkycheckError::InvalidKernel(
                "summary record list does not terminate".into(),
            ));
        }

        let record = (record_number - 1)
            .checked_mul(DAF_RECORD_BYTES)
            .and_then(|start| file.get(start..start.checked_add(DAF_RECORD_BYTES)?))
            .ok_or_else(|| {
                SkycheckError::InvalidKernel(format!(
                    "summary record {record_number} lies past the end of the file"
                ))
            })?;

        let (rest, next) = le_f64::<_, nom::error::Error<&[u8]>>(record)?;
        let (rest, _prev) = le_f64::<_, nom::error::Error<&[u8]>>(rest)?;
        let (mut rest, nsum) = le_f64::<_, nom::error::Error<&[u8]>>(rest)?;

        let nsum = nsum as usize;
        let used = nsum
            .checked_mul(summary_bytes)
            .and_then(|bytes| bytes.checked_add(24));
        if used.map_or(true, |bytes| bytes > DAF_RECORD_BYTES) {
            return Err(SkycheckError::InvalidKernel(format!(
                "summary record {record_number} announces {nsum} summaries"
            )));
        }
        for _ in 0..nsum {
            let (r, summary) = Summary::parse(rest, nd, ni)?;
            summaries.push(summary);
            rest = r;
        }

        record_number = next as usize;
    }

    Ok(summaries)
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = Epoch::from_et_seconds(self.start_epoch);
        let end = Epoch::from_et_seconds(self.end_epoch);
        write!(
            f,
            "{:>4} wrt {:>4} | type {} | {} .. {} | words {}..{}",
            self.target,
            self.center,
            self.data_type,
            start,
            end,
            self.initial_addr,
            self.final_addr
        )
    }
}
