//! In-memory SPK kernel with barycentric state evaluation.
//!
//! # What this module does
//! 1. Validates the **DAF file record** ([`DAFHeader`]).
//! 2. Walks the **summary records** to discover segments.
//! 3. Decodes every Type 2/3 segment (directory footer + coefficient words).
//! 4. Stacks segments of the same `(target, center)` pair in time order.
//! 5. Resolves, for every target, the **chain of pairs** leading to the Solar System
//!    Barycenter, rejecting cycles and dangling centers at load time.
//!
//! A barycentric state is then the sum of the relative states along the chain:
//!
//! ```text
//! Moon(t) = [301 wrt 3](t) + [3 wrt 0](t)
//! ```
//!
//! # Units & time scales
//! * Input epochs are **TDB Julian Dates**; segments are indexed in TDB seconds past J2000.
//! * Positions are **km**, velocities **km/day**, axes ICRF.
use std::fmt;

use ahash::AHashMap;
use camino::Utf8Path;
use itertools::Itertools;
use nom::{multi::count, number::complete::le_f64};
use smallvec::SmallVec;
use tracing::{debug, info, instrument};

use crate::{
    constants::{JulianDate, J2000_JD, SECONDS_PER_DAY},
    jpl_ephem::EphemerisSource,
    skycheck_errors::SkycheckError,
    state_vector::StateVector,
};

use super::{
    daf_header::DAFHeader,
    directory::DirectoryData,
    ephemeris_record::EphemerisRecord,
    naif_ids::{naif_type::SpkDataType, NaifIds},
    summary_record::{read_summaries, Summary},
};

/// One decoded Chebyshev segment.
#[derive(Debug, Clone)]
pub struct Segment {
    pub summary: Summary,
    pub directory: DirectoryData,
    data_type: SpkDataType,
    n_coeffs: usize,
    words: Vec<f64>,
}

impl Segment {
    fn decode(file: &[u8], summary: Summary) -> Result<Self, SkycheckError> {
        let data_type = SpkDataType::from_i32(summary.data_type)?;
        if summary.initial_addr < 1 || summary.final_addr < summary.initial_addr {
            return Err(SkycheckError::InvalidKernel(format!(
                "segment {} wrt {} has addresses {}..{}",
                summary.target, summary.center, summary.initial_addr, summary.final_addr
            )));
        }

        let start = (summary.initial_addr as usize - 1) * 8;
        let end = summary.final_addr as usize * 8;
        let bytes = file.get(start..end).ok_or_else(|| {
            SkycheckError::InvalidKernel(format!(
                "segment {} wrt {} extends past the end of the file",
                summary.target, summary.center
            ))
        })?;
        let (_, words) =
            count(le_f64::<_, nom::error::Error<&[u8]>>, bytes.len() / 8)(bytes)?;

        let directory = DirectoryData::from_segment_words(&words)?;
        let n_coeffs = data_type.n_coeffs(directory.rsize);
        if n_coeffs == 0 {
            return Err(SkycheckError::InvalidKernel(format!(
                "record size {} leaves no coefficients",
                directory.rsize
            )));
        }

        Ok(Segment {
            summary,
            directory,
            data_type,
            n_coeffs,
            words,
        })
    }

    fn record(&self, idx: usize) -> Option<EphemerisRecord<'_>> {
        let start = idx * self.directory.rsize;
        let words = self.words.get(start..start + self.directory.rsize)?;
        EphemerisRecord::new(words, self.n_coeffs, self.data_type)
    }

    /// Relative state (km, km/day) of the segment target at `et_seconds`.
    fn state(&self, et_seconds: f64) -> Option<StateVector> {
        let record = self.record(self.directory.record_index(et_seconds))?;
        let (position, velocity) = record.interpolate(et_seconds);
        Some(StateVector::new(position, velocity * SECONDS_PER_DAY))
    }
}

/// All segments of one `(target, center)` pair, sorted by start epoch.
#[derive(Debug, Clone)]
struct SegmentStack {
    center: i32,
    segments: Vec<Segment>,
}

impl SegmentStack {
    fn span(&self) -> (f64, f64) {
        let start = self
            .segments
            .iter()
            .map(|s| s.summary.start_epoch)
            .fold(f64::INFINITY, f64::min);
        let end = self
            .segments
            .iter()
            .map(|s| s.summary.end_epoch)
            .fold(f64::NEG_INFINITY, f64::max);
        (start, end)
    }

    fn find(&self, et_seconds: f64) -> Option<&Segment> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.summary.covers(et_seconds))
    }
}

type Chain = SmallVec<[i32; 4]>;

/// A loaded SPK kernel.
///
/// See also
/// ------------
/// * [`SpkKernel::from_bytes`] – decode a kernel already in memory.
/// * [`SpkKernel::from_file`] – read and decode a kernel from disk.
/// * [`EphemerisSource`] – the interface the rest of the crate consumes.
#[derive(Debug, Clone)]
pub struct SpkKernel {
    pub daf_header: DAFHeader,
    // target -> segments relative to its center
    stacks: AHashMap<i32, SegmentStack>,
    // target -> targets whose relative states sum to the barycentric state
    chains: AHashMap<i32, Chain>,
    span: (f64, f64),
}

impl SpkKernel {
    /// Decode an SPK kernel held in memory.
    ///
    /// Arguments
    /// -----------------
    /// * `file`: the complete kernel bytes.
    ///
    /// Return
    /// ----------
    /// * The kernel, or an error if the DAF structure is invalid, a segment has an
    ///   unsupported type, or a body cannot be chained to the Solar System Barycenter.
    #[instrument(level = "debug", skip(file), fields(bytes = file.len()))]
    pub fn from_bytes(file: &[u8]) -> Result<Self, SkycheckError> {
        let daf_header = DAFHeader::parse(file)?;
        let summaries = read_summaries(file, &daf_header)?;
        if summaries.is_empty() {
            return Err(SkycheckError::InvalidKernel("kernel has no segments".into()));
        }

        let mut stacks: AHashMap<i32, SegmentStack> = AHashMap::new();
        for summary in summaries {
            let (target, center) = (summary.target, summary.center);
            let segment = Segment::decode(file, summary)?;
            let stack = stacks.entry(target).or_insert_with(|| SegmentStack {
                center,
                segments: Vec::new(),
            });
            if stack.center != center {
                return Err(SkycheckError::BrokenChain {
                    body: target,
                    reason: format!(
                        "segments relative to both {} and {center}",
                        stack.center
                    ),
                });
            }
            stack.segments.push(segment);
        }
        for stack in stacks.values_mut() {
            stack
                .segments
                .sort_by(|a, b| a.summary.start_epoch.total_cmp(&b.summary.start_epoch));
        }

        let mut chains = AHashMap::new();
        for &target in stacks.keys() {
            chains.insert(target, resolve_chain(&stacks, target)?);
        }

        let span = stacks.values().map(SegmentStack::span).fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(lo, hi), (s, e)| (lo.max(s), hi.min(e)),
        );

        debug!(
            segments = stacks.values().map(|s| s.segments.len()).sum::<usize>(),
            targets = ?stacks.keys().sorted().collect::<Vec<_>>(),
            "decoded SPK kernel"
        );

        Ok(SpkKernel {
            daf_header,
            stacks,
            chains,
            span,
        })
    }

    /// Read and decode an SPK kernel from disk.
    #[instrument(level = "info")]
    pub fn from_file(path: &Utf8Path) -> Result<Self, SkycheckError> {
        let bytes = std::fs::read(path)?;
        let kernel = Self::from_bytes(&bytes)?;
        let (start, end) = kernel.coverage();
        info!(start_jd = start, end_jd = end, "loaded ephemeris kernel {path}");
        Ok(kernel)
    }

    /// NAIF ids of every body the kernel can place relative to the barycenter.
    pub fn targets(&self) -> Vec<i32> {
        self.chains.keys().copied().sorted().collect()
    }

    /// Segment chain used for `body`, from the body itself up to the barycenter.
    pub fn chain(&self, body: i32) -> Option<&[i32]> {
        self.chains.get(&body).map(|c| c.as_slice())
    }

    fn out_of_range(&self, jd_tdb: JulianDate, start: f64, end: f64) -> SkycheckError {
        SkycheckError::OutOfRangeTime {
            jd: jd_tdb,
            start: J2000_JD + start / SECONDS_PER_DAY,
            end: J2000_JD + end / SECONDS_PER_DAY,
            source_name: "SPK kernel",
        }
    }

    /// Barycentric state of a raw NAIF id.
    pub fn state_of_id(&self, body: i32, jd_tdb: JulianDate) -> Result<StateVector, SkycheckError> {
        if body == 0 {
            return Ok(StateVector::zeros());
        }
        let chain = self
            .chains
            .get(&body)
            .ok_or(SkycheckError::UnsupportedBody(body))?;
        let et = (jd_tdb - J2000_JD) * SECONDS_PER_DAY;

        let mut total = StateVector::zeros();
        for link in chain {
            let stack = self
                .stacks
                .get(link)
                .ok_or(SkycheckError::UnsupportedBody(*link))?;
            let segment = stack.find(et).ok_or_else(|| {
                let (start, end) = stack.span();
                self.out_of_range(jd_tdb, start, end)
            })?;
            let state = segment.state(et).ok_or_else(|| {
                SkycheckError::InvalidKernel(format!("truncated record in segment of {link}"))
            })?;
            total = total + state;
        }
        Ok(total)
    }
}

fn resolve_chain(
    stacks: &AHashMap<i32, SegmentStack>,
    target: i32,
) -> Result<Chain, SkycheckError> {
    let mut chain = Chain::new();
    let mut current = target;
    while current != 0 {
        if chain.contains(&current) {
            return Err(SkycheckError::BrokenChain {
                body: target,
                reason: format!("cycle through {current}"),
            });
        }
        let stack = stacks.get(&current).ok_or_else(|| SkycheckError::BrokenChain {
            body: target,
            reason: format!("no segment for intermediate center {current}"),
        })?;
        chain.push(current);
        current = stack.center;
    }
    Ok(chain)
}

impl EphemerisSource for SpkKernel {
    fn state(&self, body: NaifIds, jd_tdb: JulianDate) -> Result<StateVector, SkycheckError> {
        self.state_of_id(body.to_id(), jd_tdb)
    }

    fn coverage(&self) -> (JulianDate, JulianDate) {
        (
            J2000_JD + self.span.0 / SECONDS_PER_DAY,
            J2000_JD + self.span.1 / SECONDS_PER_DAY,
        )
    }

    fn supports(&self, body: NaifIds) -> bool {
        let id = body.to_id();
        id == 0 || self.chains.contains_key(&id)
    }
}

impl fmt::Display for SpkKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.daf_header)?;
        for target in self.targets() {
            if let Some(stack) = self.stacks.get(&target) {
                for segment in &stack.segments {
                    writeln!(f, "{}", segment.summary)?;
                }
            }
        }
        Ok(())
    }
}
