//! Ephemeris Position Service.
//!
//! ## Overview
//!
//! The rest of the crate never touches kernel files directly: it asks an
//! [`EphemerisSource`] for the barycentric [`StateVector`] of a body at a TDB instant.
//! The production implementation is [`naif::spk_kernel::SpkKernel`], a reader for binary
//! DAF/SPK planetary kernels (DE4xx). Tests and benches plug in analytic sources through
//! the same trait.
//!
//! All states are ICRF, centered on the Solar System Barycenter, in **km** and **km/day**.
pub mod naif;

use crate::{constants::JulianDate, skycheck_errors::SkycheckError, state_vector::StateVector};

pub use naif::naif_ids::NaifIds;
pub use naif::spk_kernel::SpkKernel;

/// A time-indexed interpolant of body states.
///
/// Implementors must be shareable across worker threads: one source is loaded once and
/// read concurrently by every builder and almanac worker.
pub trait EphemerisSource: Send + Sync + std::fmt::Debug {
    /// Barycentric state of `body` at a TDB Julian Date.
    ///
    /// Return
    /// ----------
    /// * [`SkycheckError::UnsupportedBody`] if the body has no segment,
    /// * [`SkycheckError::OutOfRangeTime`] if `jd_tdb` is outside its coverage.
    fn state(&self, body: NaifIds, jd_tdb: JulianDate) -> Result<StateVector, SkycheckError>;

    /// TDB Julian Date span over which every supported body can be evaluated.
    fn coverage(&self) -> (JulianDate, JulianDate);

    /// Whether `body` can be evaluated at all.
    fn supports(&self, body: NaifIds) -> bool;

    /// State of `target` relative to `center`.
    fn relative_state(
        &self,
        target: NaifIds,
        center: NaifIds,
        jd_tdb: JulianDate,
    ) -> Result<StateVector, SkycheckError> {
        Ok(self.state(target, jd_tdb)? - self.state(center, jd_tdb)?)
    }

    /// Fail with `OutOfRangeTime` unless `jd_tdb` lies inside [`Self::coverage`].
    fn check_coverage(&self, jd_tdb: JulianDate) -> Result<(), SkycheckError> {
        let (start, end) = self.coverage();
        if jd_tdb < start || jd_tdb > end {
            return Err(SkycheckError::OutOfRangeTime {
                jd: jd_tdb,
                start,
                end,
                source_name: "ephemeris",
            });
        }
        Ok(())
    }
}
