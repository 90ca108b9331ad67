//! Time scale conversions (UTC, TT, TDB, UT1).
//!
//! All conversions are pure functions of a Julian Date and two tables:
//!
//! * a **leap-second table** (TAI − UTC as a step function of the UTC Julian Date),
//! * a **ΔT table** (TT − UT1, yearly values from 1800 to 2200, linearly interpolated).
//!
//! ```text
//! TT  = UTC + (leap(UTC) + 32.184 s) / 86400
//! UT1 = TT  − ΔT(year(TT)) / 86400
//! TDB = TT  + (TDB − TT)(TT) / 86400      (Fairhead & Bretagnon, < 2 ms)
//! ```
//!
//! Outside the tables the behavior is governed by [`TablePolicy`]:
//! [`TablePolicy::Clamp`] holds the first/last table value constant,
//! [`TablePolicy::Strict`] fails with [`SkycheckError::OutOfRangeTime`].
//!
//! ΔUT1 (UT1 − UTC) is not tabulated separately: it is derived as
//! `leap + 32.184 − ΔT`, which keeps UTC → UT1 and TT → UT1 consistent.
//!
//! See also
//! ------------
//! * [`Instant`] – a point in time carrying all four representations.
//! * [`TimeScales`] – owner of the tables and of the policy.
use hifitime::{Duration, Epoch};

use crate::constants::{
    JulianDate, DAYS_PER_YEAR, J2000_JD, SECONDS_PER_DAY, TT_MINUS_TAI, UNIX_EPOCH_JD,
};
use crate::skycheck_errors::SkycheckError;

/// Behavior of the table lookups outside their tabulated span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TablePolicy {
    /// Hold the nearest table value constant.
    #[default]
    Clamp,
    /// Reject the lookup with `OutOfRangeTime`.
    Strict,
}

/// TAI − UTC in seconds, indexed by the UTC Julian Date at which it takes effect.
const IERS_LEAP_SECONDS: [(f64, f64); 28] = [
    (2441317.5, 10.0), // 1972-01-01
    (2441499.5, 11.0), // 1972-07-01
    (2441683.5, 12.0), // 1973-01-01
    (2442048.5, 13.0), // 1974-01-01
    (2442413.5, 14.0), // 1975-01-01
    (2442778.5, 15.0), // 1976-01-01
    (2443144.5, 16.0), // 1977-01-01
    (2443509.5, 17.0), // 1978-01-01
    (2443874.5, 18.0), // 1979-01-01
    (2444239.5, 19.0), // 1980-01-01
    (2444786.5, 20.0), // 1981-07-01
    (2445151.5, 21.0), // 1982-07-01
    (2445516.5, 22.0), // 1983-07-01
    (2446247.5, 23.0), // 1985-07-01
    (2447161.5, 24.0), // 1988-01-01
    (2447892.5, 25.0), // 1990-01-01
    (2448257.5, 26.0), // 1991-01-01
    (2448804.5, 27.0), // 1992-07-01
    (2449169.5, 28.0), // 1993-07-01
    (2449534.5, 29.0), // 1994-07-01
    (2450083.5, 30.0), // 1996-01-01
    (2450630.5, 31.0), // 1997-07-01
    (2451179.5, 32.0), // 1999-01-01
    (2453736.5, 33.0), // 2006-01-01
    (2454832.5, 34.0), // 2009-01-01
    (2456109.5, 35.0), // 2012-07-01
    (2457204.5, 36.0), // 2015-07-01
    (2457754.5, 37.0), // 2017-01-01
];

/// Last UTC Julian Date for which the bundled leap-second table is known to hold
/// (2026-12-28, expiry announced by IERS Bulletin C).
const IERS_LEAP_HORIZON: f64 = 2461402.5;

/// First year of [`DELTA_T_YEARLY`].
const DELTA_T_FIRST_YEAR: f64 = 1800.0;

/// ΔT = TT − UT1 in seconds on January 1st of each year, 1800 to 2200.
///
/// 1800–1972 from the Morrison, Stephenson, Hohenkerk & Zawilski (2021) S15
/// splines, 1973–2024 from the IERS observed values, then a cubic transition
/// towards the Stephenson–Morrison–Hohenkerk (2016) long-term parabola.
#[rustfmt::skip]
const DELTA_T_YEARLY: [f64; 401] = [
    18.3670, 18.0096, 17.6411, 17.2731, 16.9172, 16.5847, 16.2873, 16.0364,
    15.8436, 15.7203, 15.6780, 15.7226, 15.8369, 15.9980, 16.1831, 16.3693,
    16.5336, 16.6534, 16.7056, 16.6674, 16.5160, 16.2355, 15.8384, 15.3441,
    14.7722, 14.1422, 13.4736, 12.7859, 12.0986, 11.4311, 10.8040, 10.2315,
    9.7174, 9.2610, 8.8617, 8.5190, 8.2323, 8.0010, 7.8246, 7.7025,
    7.6340, 7.6184, 7.6528, 7.7339, 7.8584, 8.0231, 8.2249, 8.4603,
    8.7264, 9.0196, 9.3380, 9.6698, 9.9800, 10.2264, 10.3665, 10.3570,
    10.1767, 9.8801, 9.5419, 9.2369, 9.0400, 8.9933, 9.0105, 8.9726,
    8.7607, 8.2550, 7.3796, 6.2230, 4.9156, 3.5881, 2.3710, 1.3655,
    0.5571, -0.0983, -0.6443, -1.1260, -1.5784, -2.0111, -2.4260, -2.8250,
    -3.2100, -3.5780, -3.9068, -4.1695, -4.3389, -4.3880, -4.3056, -4.1449,
    -3.9749, -3.8646, -3.8840, -4.0742, -4.3725, -4.6891, -4.9342, -5.0170,
    -4.8665, -4.4762, -3.8570, -3.0203, -1.9770, -0.7463, 0.6194, 2.0600,
    3.5149, 4.9230, 6.2412, 7.4876, 8.6969, 9.9035, 11.1420, 12.4346,
    13.7542, 15.0610, 16.3154, 17.4790, 18.5190, 19.4401, 20.2549, 20.9760,
    21.6170, 22.1868, 22.6886, 23.1226, 23.4893, 23.7890, 24.0234, 24.1974,
    24.3171, 24.3886, 24.4180, 24.4116, 24.3760, 24.3182, 24.2449, 24.1640,
    24.0849, 24.0378, 24.0563, 24.1741, 24.4260, 24.8296, 25.3470, 25.9251,
    26.5108, 27.0500, 27.5054, 27.8918, 28.2385, 28.5751, 28.9320, 29.3219,
    29.6990, 30.0020, 30.2033, 30.4092, 30.7600, 31.3425, 32.0324, 32.6520,
    33.0726, 33.3580, 33.6210, 33.9628, 34.4391, 35.0930, 35.9473, 36.9323,
    37.9560, 38.9483, 39.9316, 40.9510, 42.0353, 43.3700, 44.4900, 45.4800,
    46.4600, 47.5200, 48.5300, 49.5900, 50.5400, 51.3800, 52.1700, 52.9600,
    53.7900, 54.3400, 54.8700, 55.3200, 55.8200, 56.3000, 56.8600, 57.5700,
    58.3100, 59.1200, 59.9800, 60.7800, 61.6300, 62.2900, 62.9700, 63.4700,
    63.8290, 64.0900, 64.3000, 64.4700, 64.5700, 64.6900, 64.8500, 65.1500,
    65.4600, 65.7800, 66.0700, 66.3200, 66.6000, 66.9100, 67.2800, 67.6400,
    68.1000, 68.5900, 68.9700, 69.2200, 69.3600, 69.3600, 69.2900, 69.2000,
    69.1800, 69.1853, 69.2011, 69.2275, 69.2645, 69.3120, 69.3701, 69.4387,
    69.5178, 69.6074, 69.7076, 69.8182, 69.9394, 70.0711, 70.2132, 70.3659,
    70.5290, 70.7026, 70.8867, 71.0812, 71.2862, 71.5016, 71.7275, 71.9638,
    72.2105, 72.4677, 72.7352, 73.0132, 73.3016, 73.6004, 73.9096, 74.2291,
    74.5591, 74.8994, 75.2501, 75.6112, 75.9826, 76.3643, 76.7564, 77.1588,
    77.5716, 77.9947, 78.4281, 78.8718, 79.3258, 79.7902, 80.2648, 80.7497,
    81.2449, 81.7503, 82.2661, 82.7921, 83.3283, 83.8748, 84.4315, 84.9985,
    85.5757, 86.1632, 86.7608, 87.3687, 87.9867, 88.6150, 89.2535, 89.9021,
    90.5610, 91.2300, 91.9091, 92.5985, 93.2980, 94.0076, 94.7274, 95.4574,
    96.1974, 96.9476, 97.7079, 98.4783, 99.2589, 100.0495, 100.8502, 101.6611,
    102.4819, 103.3129, 104.1540, 105.0051, 105.8662, 106.7375, 107.6187, 108.5100,
    109.4113, 110.3227, 111.2441, 112.1755, 113.1169, 114.0683, 115.0297, 116.0011,
    116.9825, 117.9738, 118.9751, 119.9864, 121.0077, 122.0389, 123.0800, 124.1311,
    125.1921, 126.2630, 127.3439, 128.4347, 129.5354, 130.6460, 131.7664, 132.8968,
    134.0371, 135.1872, 136.3472, 137.5171, 138.6968, 139.8864, 141.0859, 142.2951,
    143.5143, 144.7432, 145.9820, 147.2305, 148.4889, 149.7571, 151.0351, 152.3229,
    153.6204, 154.9278, 156.2449, 157.5718, 158.9084, 160.2548, 161.6110, 162.9768,
    164.3525, 165.7378, 167.1329, 168.5377, 169.9522, 171.3764, 172.8103, 174.2539,
    175.7071, 177.1701, 178.6427, 180.1250, 181.6170, 183.1186, 184.6299, 186.1508,
    187.6813, 189.2215, 190.7713, 192.3307, 193.8997, 195.4783, 197.0666, 198.6644,
    200.2718, 201.8888, 203.5153, 205.1515, 206.7972, 208.4524, 210.1172, 211.7915,
    213.4754, 215.1688, 216.8718, 218.5842, 220.3062, 222.0376, 223.7786, 225.5291,
    227.2890,
];

/// Step-function table of TAI − UTC.
///
/// The table is extensible: [`LeapSecondTable::with_entry`] appends a newly announced
/// leap second and [`LeapSecondTable::with_horizon`] moves the validity horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSecondTable {
    entries: Vec<(JulianDate, f64)>,
    horizon: JulianDate,
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        Self::iers()
    }
}

impl LeapSecondTable {
    /// Table of every leap second announced up to 2017-01-01.
    pub fn iers() -> Self {
        LeapSecondTable {
            entries: IERS_LEAP_SECONDS.to_vec(),
            horizon: IERS_LEAP_HORIZON,
        }
    }

    /// Add a transition `(jd_utc, tai_minus_utc)`; entries are kept sorted by date.
    pub fn with_entry(mut self, jd_utc: JulianDate, offset: f64) -> Self {
        let idx = self.entries.partition_point(|(jd, _)| *jd < jd_utc);
        self.entries.insert(idx, (jd_utc, offset));
        if self.horizon < jd_utc {
            self.horizon = jd_utc;
        }
        self
    }

    /// Move the date up to which the table is declared valid.
    pub fn with_horizon(mut self, horizon: JulianDate) -> Self {
        self.horizon = horizon;
        self
    }

    /// First UTC Julian Date covered by the table.
    pub fn first_jd(&self) -> JulianDate {
        self.entries.first().map_or(f64::NAN, |(jd, _)| *jd)
    }

    /// UTC Julian Date up to which the table is declared valid.
    pub fn horizon(&self) -> JulianDate {
        self.horizon
    }

    /// TAI − UTC in seconds at a UTC Julian Date.
    ///
    /// Arguments
    /// -----------------
    /// * `jd_utc`: UTC Julian Date.
    /// * `policy`: behavior before the first entry and after the horizon.
    ///
    /// Return
    /// ----------
    /// * The offset in seconds. Before 1972 the first value (10 s) is returned under
    ///   [`TablePolicy::Clamp`]; after the last entry the last value is held.
    pub fn offset_at(&self, jd_utc: JulianDate, policy: TablePolicy) -> Result<f64, SkycheckError> {
        let first = self.first_jd();
        if policy == TablePolicy::Strict && (jd_utc < first || jd_utc > self.horizon) {
            return Err(SkycheckError::OutOfRangeTime {
                jd: jd_utc,
                start: first,
                end: self.horizon,
                source_name: "leap-second table",
            });
        }

        let idx = self.entries.partition_point(|(jd, _)| *jd <= jd_utc);
        let offset = match idx {
            0 => self.entries.first().map_or(0.0, |(_, o)| *o),
            i => self.entries[i - 1].1,
        };
        Ok(offset)
    }
}

/// Yearly table of ΔT = TT − UT1, linearly interpolated.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaTTable {
    first_year: f64,
    values: Vec<f64>,
}

impl Default for DeltaTTable {
    fn default() -> Self {
        DeltaTTable {
            first_year: DELTA_T_FIRST_YEAR,
            values: DELTA_T_YEARLY.to_vec(),
        }
    }
}

impl DeltaTTable {
    /// Build a table from yearly values starting on January 1st of `first_year`.
    pub fn new(first_year: f64, values: Vec<f64>) -> Result<Self, SkycheckError> {
        if values.len() < 2 {
            return Err(SkycheckError::InvalidConfig(
                "a ΔT table needs at least two yearly values".into(),
            ));
        }
        Ok(DeltaTTable { first_year, values })
    }

    pub fn first_year(&self) -> f64 {
        self.first_year
    }

    pub fn last_year(&self) -> f64 {
        self.first_year + (self.values.len() - 1) as f64
    }

    /// ΔT in seconds at a fractional year.
    ///
    /// Arguments
    /// -----------------
    /// * `year`: decimal year, e.g. `2000.5`.
    /// * `policy`: clamp to the end values or fail outside the table.
    pub fn delta_t(&self, year: f64, policy: TablePolicy) -> Result<f64, SkycheckError> {
        let last_year = self.last_year();
        if year < self.first_year || year > last_year {
            return match policy {
                TablePolicy::Strict => Err(SkycheckError::OutOfRangeTime {
                    jd: J2000_JD + (year - 2000.0) * DAYS_PER_YEAR,
                    start: J2000_JD + (self.first_year - 2000.0) * DAYS_PER_YEAR,
                    end: J2000_JD + (last_year - 2000.0) * DAYS_PER_YEAR,
                    source_name: "ΔT table",
                }),
                TablePolicy::Clamp if year < self.first_year => Ok(self.values[0]),
                TablePolicy::Clamp => Ok(self.values[self.values.len() - 1]),
            };
        }

        let pos = year - self.first_year;
        let n = self.values.len();
        let idx = (pos.floor() as usize).min(n - 2);
        let frac = pos - idx as f64;
        Ok(self.values[idx] + frac * (self.values[idx + 1] - self.values[idx]))
    }
}

/// TDB − TT in seconds (Fairhead & Bretagnon series, USNO Circular 179 eq. 2.6).
///
/// Accepts a TT or TDB Julian Date; the difference between the two is far below the
/// resolution of the series. The amplitude stays under 2 ms between 1850 and 2150.
pub fn tdb_minus_tt(jd: JulianDate) -> f64 {
    let t = (jd - J2000_JD) / 36525.0;
    0.001657 * (628.3076 * t + 6.2401).sin()
        + 0.000022 * (575.3385 * t + 4.2970).sin()
        + 0.000014 * (1256.6152 * t + 6.1969).sin()
        + 0.000005 * (606.9777 * t + 4.0212).sin()
        + 0.000005 * (52.9691 * t + 0.4444).sin()
        + 0.000002 * (21.3299 * t + 5.5431).sin()
        + 0.000010 * t * (628.3076 * t + 4.2490).sin()
}

/// Decimal year of a TT Julian Date, as used to index the ΔT table.
#[inline]
pub fn decimal_year(jd_tt: JulianDate) -> f64 {
    2000.0 + (jd_tt - J2000_JD) / DAYS_PER_YEAR
}

/// A point in time carrying its UTC, TT, TDB and UT1 Julian Dates.
///
/// An `Instant` can only be produced by [`TimeScales`], so its four
/// representations are always consistent with the tables that built it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instant {
    utc: JulianDate,
    tt: JulianDate,
    tdb: JulianDate,
    ut1: JulianDate,
}

impl Instant {
    pub fn utc(&self) -> JulianDate {
        self.utc
    }

    pub fn tt(&self) -> JulianDate {
        self.tt
    }

    pub fn tdb(&self) -> JulianDate {
        self.tdb
    }

    pub fn ut1(&self) -> JulianDate {
        self.ut1
    }

    /// TDB − TT at this instant, in seconds.
    pub fn tdb_minus_tt(&self) -> f64 {
        tdb_minus_tt(self.tt)
    }

    /// Time key used by the CSV tables, e.g. `"2025-01-01 00:00:00+00:00"`.
    pub fn time_key(&self) -> String {
        utc_time_key(self.utc)
    }
}

/// Owner of the leap-second and ΔT tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeScales {
    leap_seconds: LeapSecondTable,
    delta_t: DeltaTTable,
    policy: TablePolicy,
}

impl TimeScales {
    pub fn new(leap_seconds: LeapSecondTable, delta_t: DeltaTTable, policy: TablePolicy) -> Self {
        TimeScales {
            leap_seconds,
            delta_t,
            policy,
        }
    }

    /// Bundled tables with the given out-of-table policy.
    pub fn with_policy(policy: TablePolicy) -> Self {
        TimeScales {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> TablePolicy {
        self.policy
    }

    pub fn leap_seconds(&self) -> &LeapSecondTable {
        &self.leap_seconds
    }

    pub fn delta_t_table(&self) -> &DeltaTTable {
        &self.delta_t
    }

    /// TAI − UTC in seconds at a UTC Julian Date.
    pub fn leap_seconds_at(&self, jd_utc: JulianDate) -> Result<f64, SkycheckError> {
        self.leap_seconds.offset_at(jd_utc, self.policy)
    }

    /// ΔT = TT − UT1 in seconds at a TT Julian Date.
    pub fn delta_t_at(&self, jd_tt: JulianDate) -> Result<f64, SkycheckError> {
        self.delta_t.delta_t(decimal_year(jd_tt), self.policy)
    }

    /// ΔUT1 = UT1 − UTC in seconds at a UTC Julian Date.
    pub fn delta_ut1_at(&self, jd_utc: JulianDate) -> Result<f64, SkycheckError> {
        let tt = self.utc_to_tt(jd_utc)?;
        Ok((tt - jd_utc) * SECONDS_PER_DAY - self.delta_t_at(tt)?)
    }

    /// UTC → TT.
    pub fn utc_to_tt(&self, jd_utc: JulianDate) -> Result<JulianDate, SkycheckError> {
        let leap = self.leap_seconds_at(jd_utc)?;
        Ok(jd_utc + leap / SECONDS_PER_DAY + TT_MINUS_TAI / SECONDS_PER_DAY)
    }

    /// TT → UTC, inverting the leap-second step by fixed-point iteration.
    pub fn tt_to_utc(&self, jd_tt: JulianDate) -> Result<JulianDate, SkycheckError> {
        let mut utc = jd_tt - TT_MINUS_TAI / SECONDS_PER_DAY;
        for _ in 0..3 {
            let leap = self.leap_seconds_at(utc)?;
            utc = jd_tt - (leap + TT_MINUS_TAI) / SECONDS_PER_DAY;
        }
        Ok(utc)
    }

    /// TT → UT1.
    pub fn tt_to_ut1(&self, jd_tt: JulianDate) -> Result<JulianDate, SkycheckError> {
        Ok(jd_tt - self.delta_t_at(jd_tt)? / SECONDS_PER_DAY)
    }

    /// UT1 → TT, the exact inverse of [`Self::tt_to_ut1`] for a fixed table.
    pub fn ut1_to_tt(&self, jd_ut1: JulianDate) -> Result<JulianDate, SkycheckError> {
        let mut tt = jd_ut1;
        for _ in 0..4 {
            tt = jd_ut1 + self.delta_t_at(tt)? / SECONDS_PER_DAY;
        }
        Ok(tt)
    }

    /// UTC → UT1.
    pub fn utc_to_ut1(&self, jd_utc: JulianDate) -> Result<JulianDate, SkycheckError> {
        self.tt_to_ut1(self.utc_to_tt(jd_utc)?)
    }

    /// TT → TDB.
    pub fn tt_to_tdb(&self, jd_tt: JulianDate) -> JulianDate {
        jd_tt + tdb_minus_tt(jd_tt) / SECONDS_PER_DAY
    }

    /// TDB → TT.
    pub fn tdb_to_tt(&self, jd_tdb: JulianDate) -> JulianDate {
        let tt = jd_tdb - tdb_minus_tt(jd_tdb) / SECONDS_PER_DAY;
        jd_tdb - tdb_minus_tt(tt) / SECONDS_PER_DAY
    }

    /// Build an [`Instant`] from a UTC Julian Date.
    pub fn instant(&self, jd_utc: JulianDate) -> Result<Instant, SkycheckError> {
        let tt = self.utc_to_tt(jd_utc)?;
        Ok(Instant {
            utc: jd_utc,
            tt,
            tdb: self.tt_to_tdb(tt),
            ut1: self.tt_to_ut1(tt)?,
        })
    }

    /// Build an [`Instant`] from a TT Julian Date.
    pub fn instant_from_tt(&self, jd_tt: JulianDate) -> Result<Instant, SkycheckError> {
        let utc = self.tt_to_utc(jd_tt)?;
        Ok(Instant {
            utc,
            tt: jd_tt,
            tdb: self.tt_to_tdb(jd_tt),
            ut1: self.tt_to_ut1(jd_tt)?,
        })
    }

    /// Build an [`Instant`] from a TDB Julian Date (the ephemeris argument).
    pub fn instant_from_tdb(&self, jd_tdb: JulianDate) -> Result<Instant, SkycheckError> {
        let tt = self.tdb_to_tt(jd_tdb);
        Ok(Instant {
            tdb: jd_tdb,
            ..self.instant_from_tt(tt)?
        })
    }

    /// Build an [`Instant`] from a UTC civil date and time.
    pub fn instant_from_calendar(
        &self,
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Instant, SkycheckError> {
        self.instant(calendar_to_jd_utc(year, month, day, hour, minute, second))
    }
}

/// UTC civil date and time → UTC Julian Date.
///
/// The day fraction is counted in 86400 SI seconds, as in the leap-second-free
/// `unix_seconds / 86400 + 2440587.5` convention the reference datasets use.
pub fn calendar_to_jd_utc(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
) -> JulianDate {
    let midnight = Epoch::from_gregorian_utc_at_midnight(year, month, day);
    let days = midnight.to_unix_days();
    UNIX_EPOCH_JD
        + days.round()
        + (hour as f64 * 3600.0 + minute as f64 * 60.0 + second as f64) / SECONDS_PER_DAY
}

/// Format a UTC Julian Date as the `YYYY-MM-DD HH:MM:SS+00:00` time key.
pub fn utc_time_key(jd_utc: JulianDate) -> String {
    let unix_seconds = ((jd_utc - UNIX_EPOCH_JD) * SECONDS_PER_DAY).round();
    let epoch = Epoch::from_unix_seconds(unix_seconds).round(Duration::from_seconds(1.0));
    let (y, m, d, hh, mm, ss, _) = epoch.to_gregorian_utc();
    format!("{y:04}-{m:02}-{d:02} {hh:02}:{mm:02}:{ss:02}+00:00")
}
