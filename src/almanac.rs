//! # Almanac events
//!
//! Step functions of time fed to [`find_discrete`], one per event family:
//!
//! | family | level | coarse step |
//! |---|---|---|
//! | seasons | `⌊λ☉ / 90°⌋` on the ecliptic of date (0 = March equinox) | 90 d |
//! | moon phases | `⌊(λ☾ − λ☉) / 90°⌋` (0 = new moon) | 5 d |
//! | sunrise / sunset | Sun altitude ≥ −0.8333° | 0.04 d |
//! | twilight | night, astronomical, nautical, civil, day | 0.01 d |
//! | risings / settings | body altitude ≥ −34′ | 0.25 d |
//! | meridian transits | hour angle in `[0°, 180°]` | 0.4 d |
//! | oppositions / conjunctions | `⌊(λ☉ − λ) / 180°⌋` (1 = opposition) | 40 d |
//!
//! Positions are apparent (light-time, deflection, aberration). Horizon events use the
//! topocentric observer at the site. Every search argument is a **TDB** Julian Date.
//!
//! Long spans can be split into windows searched concurrently with rayon
//! ([`Almanac::in_windows`]); each window reports transitions in `(start, end]`, so
//! adjacent windows never report the same event twice.
use rayon::prelude::*;
use tracing::debug;

use crate::{
    astrometry::apparent,
    bodies::Body,
    constants::{normalize_degrees, Degree, JulianDate},
    derived::{horizon::altaz, horizon::hour_angle_dec},
    jpl_ephem::EphemerisSource,
    observers::{GeodeticLocation, Observer},
    ref_system::icrf_to_ecliptic_of_date,
    search::{find_discrete, DiscreteEvent},
    skycheck_errors::SkycheckError,
    time::{Instant, TimeScales},
};

pub const SEASON_NAMES: [&str; 4] = [
    "Vernal Equinox",
    "Summer Solstice",
    "Autumnal Equinox",
    "Winter Solstice",
];

pub const MOON_PHASE_NAMES: [&str; 4] = ["New Moon", "First Quarter", "Full Moon", "Last Quarter"];

pub const TWILIGHT_NAMES: [&str; 5] = [
    "Night",
    "Astronomical twilight",
    "Nautical twilight",
    "Civil twilight",
    "Day",
];

/// Altitude of the Sun's upper limb at sunrise, refraction included.
pub const SUNRISE_ALTITUDE: Degree = -0.8333;

/// Horizon refraction used for rising and setting of other bodies.
pub const RISE_SET_ALTITUDE: Degree = -34.0 / 60.0;

const SEASON_STEP: f64 = 90.0;
const MOON_PHASE_STEP: f64 = 5.0;
const SUNRISE_STEP: f64 = 0.04;
const TWILIGHT_STEP: f64 = 0.01;
const RISE_SET_STEP: f64 = 0.25;
const TRANSIT_STEP: f64 = 0.4;
const OPPOSITION_STEP: f64 = 40.0;

/// Event finder bound to an ephemeris and time-scale tables.
#[derive(Debug, Clone, Copy)]
pub struct Almanac<'a> {
    ephem: &'a dyn EphemerisSource,
    scales: &'a TimeScales,
}

impl<'a> Almanac<'a> {
    pub fn new(ephem: &'a dyn EphemerisSource, scales: &'a TimeScales) -> Self {
        Almanac { ephem, scales }
    }

    fn instant(&self, jd_tdb: JulianDate) -> Result<Instant, SkycheckError> {
        self.scales.instant_from_tdb(jd_tdb)
    }

    /// Apparent ecliptic-of-date longitude of a body seen from the geocentre.
    pub fn ecliptic_longitude(&self, body: Body, jd_tdb: JulianDate) -> Result<Degree, SkycheckError> {
        let instant = self.instant(jd_tdb)?;
        let pos = apparent(&body, &Observer::geocenter(), self.ephem, &instant)?;
        Ok(icrf_to_ecliptic_of_date(&pos.position, instant.tt()).1)
    }

    /// Apparent altitude (no refraction) of a body above a site.
    pub fn altitude(
        &self,
        body: Body,
        site: &GeodeticLocation,
        jd_tdb: JulianDate,
    ) -> Result<Degree, SkycheckError> {
        let instant = self.instant(jd_tdb)?;
        let observer = Observer::topocentric(site.clone());
        let pos = apparent(&body, &observer, self.ephem, &instant)?;
        Ok(altaz(&pos.position, site, &instant).altitude)
    }

    // -------------------------------------------------------------------------------------
    // Step functions
    // -------------------------------------------------------------------------------------

    /// Season index 0..=3.
    pub fn season_at(&self, jd_tdb: JulianDate) -> Result<i32, SkycheckError> {
        let lon = self.ecliptic_longitude(Body::Sun, jd_tdb)?;
        Ok((lon / 90.0).floor() as i32 % 4)
    }

    /// Moon phase index 0..=3.
    pub fn moon_phase_at(&self, jd_tdb: JulianDate) -> Result<i32, SkycheckError> {
        let moon = self.ecliptic_longitude(Body::Moon, jd_tdb)?;
        let sun = self.ecliptic_longitude(Body::Sun, jd_tdb)?;
        Ok((normalize_degrees(moon - sun) / 90.0).floor() as i32 % 4)
    }

    /// 1 while the Sun is up, 0 otherwise.
    pub fn sun_is_up_at(&self, site: &GeodeticLocation, jd_tdb: JulianDate) -> Result<i32, SkycheckError> {
        let alt = self.altitude(Body::Sun, site, jd_tdb)?;
        Ok(i32::from(alt >= SUNRISE_ALTITUDE))
    }

    /// Twilight level 0 (night) ..= 4 (day).
    pub fn twilight_at(&self, site: &GeodeticLocation, jd_tdb: JulianDate) -> Result<i32, SkycheckError> {
        let alt = self.altitude(Body::Sun, site, jd_tdb)?;
        Ok(twilight_level(alt))
    }

    /// 1 while `body` is above the horizon.
    pub fn body_is_up_at(
        &self,
        body: Body,
        site: &GeodeticLocation,
        jd_tdb: JulianDate,
    ) -> Result<i32, SkycheckError> {
        let alt = self.altitude(body, site, jd_tdb)?;
        Ok(i32::from(alt >= RISE_SET_ALTITUDE))
    }

    /// 1 once `body` has crossed the meridian (hour angle in `[0°, 180°]`), 0 before.
    pub fn meridian_side_at(
        &self,
        body: Body,
        site: &GeodeticLocation,
        jd_tdb: JulianDate,
    ) -> Result<i32, SkycheckError> {
        let instant = self.instant(jd_tdb)?;
        let observer = Observer::topocentric(site.clone());
        let pos = apparent(&body, &observer, self.ephem, &instant)?;
        let (ha, _) = hour_angle_dec(&pos.position, site.longitude(), &instant);
        Ok(i32::from(ha <= 180.0))
    }

    /// 1 when `body` is on the far side of the Earth from the Sun in ecliptic longitude.
    pub fn opposition_at(&self, body: Body, jd_tdb: JulianDate) -> Result<i32, SkycheckError> {
        let sun = self.ecliptic_longitude(Body::Sun, jd_tdb)?;
        let lon = self.ecliptic_longitude(body, jd_tdb)?;
        Ok((normalize_degrees(sun - lon) / 180.0).floor() as i32 % 2)
    }

    // -------------------------------------------------------------------------------------
    // Event streams
    // -------------------------------------------------------------------------------------

    /// Equinoxes and solstices.
    pub fn seasons(&self, start: JulianDate, end: JulianDate) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        find_discrete(start, end, SEASON_STEP, |t| self.season_at(t), None)
    }

    /// New moons, quarters and full moons.
    pub fn moon_phases(&self, start: JulianDate, end: JulianDate) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        find_discrete(start, end, MOON_PHASE_STEP, |t| self.moon_phase_at(t), None)
    }

    /// Sunrises (new value 1) and sunsets (new value 0).
    pub fn sunrise_sunset(
        &self,
        site: &GeodeticLocation,
        start: JulianDate,
        end: JulianDate,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        find_discrete(start, end, SUNRISE_STEP, |t| self.sun_is_up_at(site, t), None)
    }

    /// Every change of twilight level.
    pub fn twilight(
        &self,
        site: &GeodeticLocation,
        start: JulianDate,
        end: JulianDate,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        find_discrete(start, end, TWILIGHT_STEP, |t| self.twilight_at(site, t), None)
    }

    fn rise_set(
        &self,
        body: Body,
        site: &GeodeticLocation,
        start: JulianDate,
        end: JulianDate,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        find_discrete(start, end, RISE_SET_STEP, |t| self.body_is_up_at(body, site, t), None)
    }

    pub fn risings(
        &self,
        body: Body,
        site: &GeodeticLocation,
        start: JulianDate,
        end: JulianDate,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        let mut events = self.rise_set(body, site, start, end)?;
        events.retain(|e| e.new_value == 1);
        Ok(events)
    }

    pub fn settings(
        &self,
        body: Body,
        site: &GeodeticLocation,
        start: JulianDate,
        end: JulianDate,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        let mut events = self.rise_set(body, site, start, end)?;
        events.retain(|e| e.new_value == 0);
        Ok(events)
    }

    /// Upper meridian transits.
    pub fn transits(
        &self,
        body: Body,
        site: &GeodeticLocation,
        start: JulianDate,
        end: JulianDate,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        let mut events = find_discrete(
            start,
            end,
            TRANSIT_STEP,
            |t| self.meridian_side_at(body, site, t),
            None,
        )?;
        events.retain(|e| e.new_value == 1);
        Ok(events)
    }

    /// Oppositions (new value 1) and conjunctions (new value 0) of a body with the Sun.
    pub fn oppositions_conjunctions(
        &self,
        body: Body,
        start: JulianDate,
        end: JulianDate,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError> {
        find_discrete(start, end, OPPOSITION_STEP, |t| self.opposition_at(body, t), None)
    }

    /// Run `search` over consecutive windows of `window_days` in parallel.
    ///
    /// Arguments
    /// -----------------
    /// * `start`, `end`: full span, TDB Julian Dates.
    /// * `window_days`: window length; the last window is shortened to end on `end`.
    /// * `search`: one of the event streams above, as `|almanac, a, b| ...`.
    ///
    /// Return
    /// ----------
    /// * The events of all windows in time order, or the first error of any window.
    pub fn in_windows<F>(
        &self,
        start: JulianDate,
        end: JulianDate,
        window_days: f64,
        search: F,
    ) -> Result<Vec<DiscreteEvent>, SkycheckError>
    where
        F: Fn(&Almanac<'a>, JulianDate, JulianDate) -> Result<Vec<DiscreteEvent>, SkycheckError>
            + Sync,
    {
        if !(start < end) {
            return Err(SkycheckError::InvalidRange { start, end });
        }
        if !(window_days > 0.0) {
            return Err(SkycheckError::InvalidStep(window_days));
        }
        let n_windows = ((end - start) / window_days).ceil().max(1.0) as usize;
        debug!(n_windows, window_days, "almanac search split into windows");

        let chunks = (0..n_windows)
            .into_par_iter()
            .map(|k| {
                let a = start + k as f64 * window_days;
                let b = (a + window_days).min(end);
                search(self, a, b)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks.into_iter().flatten().collect())
    }
}

/// Twilight level of a solar altitude.
pub fn twilight_level(sun_altitude: Degree) -> i32 {
    match sun_altitude {
        a if a >= SUNRISE_ALTITUDE => 4,
        a if a >= -6.0 => 3,
        a if a >= -12.0 => 2,
        a if a >= -18.0 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod almanac_test {
    use super::*;

    #[test]
    fn test_twilight_levels() {
        assert_eq!(twilight_level(10.0), 4);
        assert_eq!(twilight_level(-0.8333), 4);
        assert_eq!(twilight_level(-1.0), 3);
        assert_eq!(twilight_level(-6.0), 3);
        assert_eq!(twilight_level(-11.9), 2);
        assert_eq!(twilight_level(-17.0), 1);
        assert_eq!(twilight_level(-40.0), 0);
    }

    #[test]
    fn test_names() {
        assert_eq!(SEASON_NAMES[0], "Vernal Equinox");
        assert_eq!(MOON_PHASE_NAMES[2], "Full Moon");
        assert_eq!(TWILIGHT_NAMES.len(), 5);
    }
}
