//! Golden dataset builder.
//!
//! For every instant of a [`TimeGrid`] the builder emits, in column order:
//!
//! 1. for each configured body: ecliptic latitude and longitude (J2000 mean ecliptic) of
//!    its astrometric geocentric position, optionally followed by the ICRF position in km;
//! 2. the galactic centre direction on the same ecliptic;
//! 3. for each site: the ecliptic coordinates of its geocentric direction at UT1;
//! 4. the mean lunar north and south node longitudes.
//!
//! Instants are processed by chunks of `grid.chunk_size` on the rayon pool. Between
//! chunks the [`CancellationToken`] is polled; a cancelled run returns
//! [`SkycheckError::Cancelled`]. Within a chunk, `OutOfRangeTime` and `UnsupportedBody`
//! only drop the affected values (counted in [`Dataset::dropped`]); any other error aborts
//! the build. The emitted records are stably sorted by grid index.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::{
    grid::TimeGrid,
    record::{Quantity, QuantityRecord},
    table::WideTable,
};
use crate::{
    astrometry::astrometric,
    bodies::{Body, FixedStar, Target},
    derived::lunar_nodes::mean_lunar_nodes,
    observers::Observer,
    ref_system::icrf_to_ecliptic,
    skycheck::Skycheck,
    skycheck_errors::SkycheckError,
    time::Instant,
};

/// Cooperative cancellation flag shared between a build and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Records of a finished build.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<QuantityRecord>,
    /// Values skipped because of a sample-local error.
    pub dropped: usize,
}

impl Dataset {
    pub fn to_table(&self) -> WideTable {
        WideTable::from_records(self.columns.clone(), &self.records)
    }
}

/// Samples a [`Skycheck`] context over a time grid.
#[derive(Debug, Clone, Copy)]
pub struct DatasetBuilder<'a> {
    ctx: &'a Skycheck,
}

struct Sample {
    records: Vec<QuantityRecord>,
    dropped: usize,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(ctx: &'a Skycheck) -> Self {
        DatasetBuilder { ctx }
    }

    /// Column names in emission order.
    pub fn columns(&self) -> Vec<String> {
        let config = self.ctx.config();
        let mut columns = Vec::new();
        for body in &config.bodies {
            columns.push(Quantity::EclipticLatitude.column(Some(body.name())));
            columns.push(Quantity::EclipticLongitude.column(Some(body.name())));
            if config.positions {
                for q in [Quantity::PositionX, Quantity::PositionY, Quantity::PositionZ] {
                    columns.push(q.column(Some(body.name())));
                }
            }
        }
        if config.galactic_center {
            columns.push(Quantity::EclipticLatitude.column(Some("gc")));
            columns.push(Quantity::EclipticLongitude.column(Some("gc")));
        }
        for site in &config.locations {
            columns.push(Quantity::EclipticLatitude.column(Some(site.label())));
            columns.push(Quantity::EclipticLongitude.column(Some(site.label())));
        }
        columns.push(Quantity::NorthNodeLongitude.column(None));
        columns.push(Quantity::SouthNodeLongitude.column(None));
        columns
    }

    /// The grid of the configuration, trimmed to the ephemeris coverage.
    pub fn configured_grid(&self) -> Result<TimeGrid, SkycheckError> {
        TimeGrid::from_config(&self.ctx.config().grid)?
            .clamp_to_coverage(self.ctx.ephem().coverage(), self.ctx.scales())
    }

    /// Build the dataset of the configured grid.
    pub fn build(&self, cancel: &CancellationToken) -> Result<Dataset, SkycheckError> {
        let grid = self.configured_grid()?;
        self.build_grid(&grid, cancel)
    }

    /// Build the dataset of an explicit grid.
    ///
    /// Arguments
    /// -----------------
    /// * `grid`: UTC Julian Dates to sample.
    /// * `cancel`: polled between chunks.
    ///
    /// Return
    /// ----------
    /// * The records sorted by grid index, or the first fatal error, or
    ///   [`SkycheckError::Cancelled`] with the number of instants completed.
    #[instrument(skip_all, fields(instants = grid.len()))]
    pub fn build_grid(
        &self,
        grid: &TimeGrid,
        cancel: &CancellationToken,
    ) -> Result<Dataset, SkycheckError> {
        let chunk_size = self.ctx.config().grid.chunk_size.max(1);
        let indexed: Vec<(usize, f64)> = grid.jd_utc().iter().copied().enumerate().collect();

        #[cfg(feature = "progress")]
        let mut progress = crate::progress_bar::BuildProgress::new(indexed.len());

        let mut records = Vec::new();
        let mut dropped = 0;
        let mut done = 0;
        for chunk in indexed.chunks(chunk_size) {
            if cancel.is_cancelled() {
                #[cfg(feature = "progress")]
                progress.interrupted();
                warn!(done, "dataset build cancelled");
                return Err(SkycheckError::Cancelled(done));
            }
            let samples = chunk
                .par_iter()
                .map(|&(index, jd_utc)| self.sample(index, jd_utc))
                .collect::<Result<Vec<_>, _>>()?;
            for sample in samples {
                dropped += sample.dropped;
                records.extend(sample.records);
            }
            done += chunk.len();
            debug!(done, "chunk finished");
            #[cfg(feature = "progress")]
            progress.chunk_done(chunk.len());
        }
        #[cfg(feature = "progress")]
        progress.finish();

        records.sort_by_key(|r| r.index);
        info!(records = records.len(), dropped, "dataset built");
        Ok(Dataset {
            columns: self.columns(),
            records,
            dropped,
        })
    }

    /// Records of one grid instant.
    fn sample(&self, index: usize, jd_utc: f64) -> Result<Sample, SkycheckError> {
        let instant = match self.ctx.instant(jd_utc) {
            Ok(instant) => instant,
            Err(err) if err.is_sample_local() => {
                debug!(jd_utc, %err, "instant dropped");
                return Ok(Sample {
                    records: Vec::new(),
                    dropped: self.columns().len(),
                });
            }
            Err(err) => return Err(err),
        };
        let key = instant.time_key();
        let config = self.ctx.config();
        let mut out = Sample {
            records: Vec::with_capacity(2 * (config.bodies.len() + config.locations.len()) + 4),
            dropped: 0,
        };
        let mut push = |label: Option<&str>, quantity: Quantity, value: f64| {
            out.records
                .push(QuantityRecord::new(index, &key, label, quantity, value));
        };

        let mut dropped = 0;
        for body in &config.bodies {
            match self.body_values(*body, &instant) {
                Ok((lat, lon, pos)) => {
                    push(Some(body.name()), Quantity::EclipticLatitude, lat);
                    push(Some(body.name()), Quantity::EclipticLongitude, lon);
                    if config.positions {
                        push(Some(body.name()), Quantity::PositionX, pos[0]);
                        push(Some(body.name()), Quantity::PositionY, pos[1]);
                        push(Some(body.name()), Quantity::PositionZ, pos[2]);
                    }
                }
                Err(err) if err.is_sample_local() => {
                    debug!(body = body.name(), jd_utc, %err, "body dropped");
                    dropped += if config.positions { 5 } else { 2 };
                }
                Err(err) => return Err(err),
            }
        }

        if config.galactic_center {
            let (lat, lon) = icrf_to_ecliptic(&FixedStar::galactic_center().direction());
            push(Some("gc"), Quantity::EclipticLatitude, lat);
            push(Some("gc"), Quantity::EclipticLongitude, lon);
        }

        for site in &config.locations {
            let (lat, lon) = icrf_to_ecliptic(&site.direction(&instant));
            push(Some(site.label()), Quantity::EclipticLatitude, lat);
            push(Some(site.label()), Quantity::EclipticLongitude, lon);
        }

        let (north, south) = mean_lunar_nodes(instant.tt());
        push(None, Quantity::NorthNodeLongitude, north);
        push(None, Quantity::SouthNodeLongitude, south);

        out.dropped = dropped;
        Ok(out)
    }

    fn body_values(&self, body: Body, instant: &Instant) -> Result<(f64, f64, [f64; 3]), SkycheckError> {
        if !self.ctx.ephem().supports(body.naif()) {
            return Err(SkycheckError::UnsupportedBody(body.id()));
        }
        let astro = astrometric(&body as &dyn Target, &Observer::geocenter(), self.ctx.ephem(), instant)?;
        let (lat, lon) = astro.ecliptic_latlon();
        let p = astro.position;
        Ok((lat, lon, [p.x, p.y, p.z]))
    }
}
