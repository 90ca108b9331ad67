//! # Skycheck: the shared computation context
//!
//! [`Skycheck`] bundles the read-only state every component needs:
//!
//! 1. the **ephemeris** behind an `Arc<dyn EphemerisSource>`, loaded once and shared by all
//!    workers;
//! 2. the **time-scale tables** ([`TimeScales`]) with the configured out-of-table policy;
//! 3. the **configuration** ([`SkycheckConfig`]): grid, bodies, sites and tolerances.
//!
//! The context is `Send + Sync` and never mutated after construction, so builder and
//! almanac workers borrow it freely across rayon threads.
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use skycheck::{config::SkycheckConfig, skycheck::Skycheck};
//!
//! let ctx = Skycheck::from_kernel_file(Utf8Path::new("de440s.bsp"), SkycheckConfig::default())?;
//! let instant = ctx.scales().instant_from_calendar(2024, 3, 20, 3, 6, 0)?;
//! let season = ctx.almanac().season_at(instant.tdb())?;
//! # Ok::<(), skycheck::skycheck_errors::SkycheckError>(())
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::golden::DatasetBuilder`] – grid sampling over this context.
//! * [`crate::almanac::Almanac`] – event searches over this context.
use std::sync::Arc;

use camino::Utf8Path;

use crate::{
    almanac::Almanac,
    config::SkycheckConfig,
    constants::JulianDate,
    golden::DatasetBuilder,
    jpl_ephem::{EphemerisSource, SpkKernel},
    skycheck_errors::SkycheckError,
    time::{Instant, TimeScales},
};

#[derive(Debug, Clone)]
pub struct Skycheck {
    ephem: Arc<dyn EphemerisSource>,
    scales: TimeScales,
    config: SkycheckConfig,
}

impl Skycheck {
    /// Build a context over an already loaded ephemeris.
    pub fn new(ephem: Arc<dyn EphemerisSource>, config: SkycheckConfig) -> Self {
        Skycheck {
            ephem,
            scales: TimeScales::with_policy(config.time.table_policy),
            config,
        }
    }

    /// Load a binary SPK kernel and build a context over it.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: DAF/SPK file (e.g. `de440s.bsp`).
    /// * `config`: dataset and validation configuration.
    ///
    /// Return
    /// ----------
    /// * The context, or the I/O / kernel decoding error.
    pub fn from_kernel_file(path: &Utf8Path, config: SkycheckConfig) -> Result<Self, SkycheckError> {
        let kernel = SpkKernel::from_file(path)?;
        Ok(Skycheck::new(Arc::new(kernel), config))
    }

    /// Replace the time tables (e.g. with an extended leap-second table).
    pub fn with_time_scales(mut self, scales: TimeScales) -> Self {
        self.scales = scales;
        self
    }

    pub fn ephem(&self) -> &dyn EphemerisSource {
        self.ephem.as_ref()
    }

    /// Shared handle on the ephemeris.
    pub fn ephem_handle(&self) -> Arc<dyn EphemerisSource> {
        Arc::clone(&self.ephem)
    }

    pub fn scales(&self) -> &TimeScales {
        &self.scales
    }

    pub fn config(&self) -> &SkycheckConfig {
        &self.config
    }

    /// Instant of a UTC Julian Date.
    pub fn instant(&self, jd_utc: JulianDate) -> Result<Instant, SkycheckError> {
        self.scales.instant(jd_utc)
    }

    pub fn almanac(&self) -> Almanac<'_> {
        Almanac::new(self.ephem.as_ref(), &self.scales)
    }

    pub fn builder(&self) -> DatasetBuilder<'_> {
        DatasetBuilder::new(self)
    }
}

#[cfg(test)]
mod skycheck_test {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_shareable() {
        assert_send_sync::<Skycheck>();
    }
}
