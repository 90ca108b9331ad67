//! JSON golden fixtures, one file per quantity family.
//!
//! Every file has the shape
//!
//! ```json
//! { "description": "...", "<metadata>": ..., "tests": [ { "<time-key>": 2451545.0, ... } ] }
//! ```
//!
//! Extra top-level fields (observer latitude, body id, ...) are kept in
//! [`Fixture::metadata`]. Event streams record the **TT** Julian Date of each transition.
use std::{fmt, io};

use camino::Utf8Path;
use nalgebra::Vector3;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    astrometry::astrometric,
    bodies::{Body, FixedStar, Target},
    constants::JulianDate,
    derived::{
        angles::{elongation, fraction_illuminated, phase_angle, separation},
        lunar_nodes::mean_lunar_nodes,
        refraction::{refraction, STANDARD_PRESSURE_MBAR, STANDARD_TEMPERATURE_C},
        sidereal::{era_deg, gmst_deg},
    },
    observers::{GeodeticLocation, Observer},
    ref_system::icrf_to_ecliptic,
    search::DiscreteEvent,
    skycheck::Skycheck,
    skycheck_errors::SkycheckError,
    time::{calendar_to_jd_utc, Instant},
};

/// A fixture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture<T> {
    pub description: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
    pub tests: Vec<T>,
}

impl<T> Fixture<T> {
    pub fn new(family: FixtureFamily, tests: Vec<T>) -> Self {
        Fixture {
            description: family.description().to_string(),
            metadata: Map::new(),
            tests,
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

impl<T: Serialize> Fixture<T> {
    pub fn write_json<W: io::Write>(&self, writer: W) -> Result<(), SkycheckError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn to_path(&self, path: &Utf8Path) -> Result<(), SkycheckError> {
        let file = std::fs::File::create(path)?;
        self.write_json(io::BufWriter::new(file))?;
        info!(%path, entries = self.tests.len(), "fixture written");
        Ok(())
    }
}

impl<T: DeserializeOwned> Fixture<T> {
    pub fn read_json<R: io::Read>(reader: R) -> Result<Self, SkycheckError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: &Utf8Path) -> Result<Self, SkycheckError> {
        let file = std::fs::File::open(path)?;
        Fixture::read_json(io::BufReader::new(file))
    }
}

/// Quantity families, one fixture file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureFamily {
    Timescale,
    Sidereal,
    Era,
    TdbTt,
    Spk,
    Ecliptic,
    Locations,
    LunarNodes,
    Phase,
    Separation,
    Elongation,
    Refraction,
    Seasons,
    MoonPhases,
    SunriseSunset,
    Twilight,
    Oppositions,
}

impl FixtureFamily {
    pub const ALL: [FixtureFamily; 17] = [
        FixtureFamily::Timescale,
        FixtureFamily::Sidereal,
        FixtureFamily::Era,
        FixtureFamily::TdbTt,
        FixtureFamily::Spk,
        FixtureFamily::Ecliptic,
        FixtureFamily::Locations,
        FixtureFamily::LunarNodes,
        FixtureFamily::Phase,
        FixtureFamily::Separation,
        FixtureFamily::Elongation,
        FixtureFamily::Refraction,
        FixtureFamily::Seasons,
        FixtureFamily::MoonPhases,
        FixtureFamily::SunriseSunset,
        FixtureFamily::Twilight,
        FixtureFamily::Oppositions,
    ];

    pub fn stem(&self) -> &'static str {
        match self {
            FixtureFamily::Timescale => "timescale",
            FixtureFamily::Sidereal => "sidereal",
            FixtureFamily::Era => "era",
            FixtureFamily::TdbTt => "tdbtt",
            FixtureFamily::Spk => "spk",
            FixtureFamily::Ecliptic => "ecliptic",
            FixtureFamily::Locations => "locations",
            FixtureFamily::LunarNodes => "lunarnodes",
            FixtureFamily::Phase => "phase",
            FixtureFamily::Separation => "separation",
            FixtureFamily::Elongation => "elongation",
            FixtureFamily::Refraction => "refraction",
            FixtureFamily::Seasons => "seasons",
            FixtureFamily::MoonPhases => "moon_phases",
            FixtureFamily::SunriseSunset => "sunrise_sunset",
            FixtureFamily::Twilight => "twilight",
            FixtureFamily::Oppositions => "oppositions",
        }
    }

    /// `golden_<stem>.json`.
    pub fn file_name(&self) -> String {
        format!("golden_{}.json", self.stem())
    }

    pub fn description(&self) -> &'static str {
        match self {
            FixtureFamily::Timescale => "UTC JD -> TT JD -> UT1 JD",
            FixtureFamily::Sidereal => "Greenwich Mean Sidereal Time, degrees",
            FixtureFamily::Era => "Earth Rotation Angle, degrees",
            FixtureFamily::TdbTt => "TDB - TT periodic offset, seconds",
            FixtureFamily::Spk => "Astrometric (light-time corrected) geocentric positions, km",
            FixtureFamily::Ecliptic => "Ecliptic lat/lon (J2000 ecliptic) of astrometric positions",
            FixtureFamily::Locations => "Ground location ecliptic lat/lon",
            FixtureFamily::LunarNodes => "Mean lunar node longitudes (Meeus formula)",
            FixtureFamily::Phase => "Phase angle and illuminated fraction",
            FixtureFamily::Separation => "Angular separation between body pairs",
            FixtureFamily::Elongation => "Moon elongation from the Sun in ecliptic longitude",
            FixtureFamily::Refraction => "Atmospheric refraction (Bennett)",
            FixtureFamily::Seasons => {
                "Equinox and solstice times. season: 0=spring, 1=summer, 2=autumn, 3=winter."
            }
            FixtureFamily::MoonPhases => {
                "Moon phase transition times. phase: 0=new, 1=first_quarter, 2=full, 3=last_quarter."
            }
            FixtureFamily::SunriseSunset => "Sunrise/sunset times. is_sunrise: 1=sunrise, 0=sunset.",
            FixtureFamily::Twilight => {
                "Twilight transition times. level: 0=night, 1=astronomical, 2=nautical, 3=civil, 4=day."
            }
            FixtureFamily::Oppositions => {
                "Opposition/conjunction times. value: 0=conjunction, 1=opposition."
            }
        }
    }
}

impl fmt::Display for FixtureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

// -------------------------------------------------------------------------------------
// Entries
// -------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimescaleEntry {
    pub utc_jd: f64,
    pub tt_jd: f64,
    pub ut1_jd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiderealEntry {
    pub ut1_jd: f64,
    pub gmst_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EraEntry {
    pub ut1_jd: f64,
    pub era_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdbTtEntry {
    pub tt_jd: f64,
    pub tdb_minus_tt_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpkEntry {
    pub tdb_jd: f64,
    pub body_id: i32,
    pub pos_km: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclipticEntry {
    pub tdb_jd: f64,
    pub body_name: String,
    pub body_id: i32,
    pub ecl_lat_deg: f64,
    pub ecl_lon_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub tdb_jd: f64,
    pub ut1_jd: f64,
    pub loc_name: String,
    pub lat: f64,
    pub lon: f64,
    pub ecl_lat_deg: f64,
    pub ecl_lon_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarNodeEntry {
    pub tdb_jd: f64,
    pub north_node_lon_deg: f64,
    pub south_node_lon_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub tdb_jd: f64,
    pub body_name: String,
    pub phase_angle_deg: f64,
    pub fraction_illuminated: f64,
    pub obs_to_target_km: [f64; 3],
    pub sun_to_target_km: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationEntry {
    pub tdb_jd: f64,
    pub body1: String,
    pub body2: String,
    pub separation_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElongationEntry {
    pub tdb_jd: f64,
    pub moon_ecl_lon_deg: f64,
    pub sun_ecl_lon_deg: f64,
    pub elongation_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefractionEntry {
    pub alt_deg: f64,
    pub temp_c: f64,
    pub pressure_mbar: f64,
    pub refraction_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonEntry {
    pub tt_jd: f64,
    pub season: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonPhaseEntry {
    pub tt_jd: f64,
    pub phase: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunriseEntry {
    pub tt_jd: f64,
    pub is_sunrise: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwilightEntry {
    pub tt_jd: f64,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OppositionEntry {
    pub tt_jd: f64,
    pub value: i32,
}

// -------------------------------------------------------------------------------------
// Generation
// -------------------------------------------------------------------------------------

/// Bodies whose phase is recorded.
pub const PHASE_BODIES: [Body; 6] = [
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
];

/// Body pairs whose separation is recorded.
pub const SEPARATION_PAIRS: [(Body, Body); 4] = [
    (Body::Sun, Body::Moon),
    (Body::Venus, Body::Mars),
    (Body::Jupiter, Body::Saturn),
    (Body::Mars, Body::Jupiter),
];

/// Observer of the sunrise/sunset and twilight streams (New York).
pub const EVENT_SITE: (f64, f64) = (40.7128, -74.0060);

/// UTC windows of the event streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventWindows {
    /// Seasons, moon phases, oppositions.
    pub long: (JulianDate, JulianDate),
    /// Sunrise and sunset.
    pub year: (JulianDate, JulianDate),
    /// Twilight.
    pub month: (JulianDate, JulianDate),
}

impl Default for EventWindows {
    fn default() -> Self {
        EventWindows {
            long: (
                calendar_to_jd_utc(2000, 1, 1, 0, 0, 0),
                calendar_to_jd_utc(2050, 12, 31, 0, 0, 0),
            ),
            year: (
                calendar_to_jd_utc(2024, 1, 1, 0, 0, 0),
                calendar_to_jd_utc(2024, 12, 31, 0, 0, 0),
            ),
            month: (
                calendar_to_jd_utc(2024, 1, 1, 0, 0, 0),
                calendar_to_jd_utc(2024, 2, 1, 0, 0, 0),
            ),
        }
    }
}

/// Produces the fixture families from a context.
#[derive(Debug, Clone, Copy)]
pub struct FixtureGenerator<'a> {
    ctx: &'a Skycheck,
}

impl<'a> FixtureGenerator<'a> {
    pub fn new(ctx: &'a Skycheck) -> Self {
        FixtureGenerator { ctx }
    }

    fn geocentric(&self, target: &dyn Target, instant: &Instant) -> Result<Vector3<f64>, SkycheckError> {
        Ok(astrometric(target, &Observer::geocenter(), self.ctx.ephem(), instant)?.position)
    }

    pub fn timescale(&self, instants: &[Instant]) -> Fixture<TimescaleEntry> {
        let tests = instants
            .iter()
            .map(|i| TimescaleEntry {
                utc_jd: i.utc(),
                tt_jd: i.tt(),
                ut1_jd: i.ut1(),
            })
            .collect();
        Fixture::new(FixtureFamily::Timescale, tests)
    }

    pub fn sidereal(&self, instants: &[Instant]) -> Fixture<SiderealEntry> {
        let tests = instants
            .iter()
            .map(|i| SiderealEntry {
                ut1_jd: i.ut1(),
                gmst_deg: gmst_deg(i),
            })
            .collect();
        Fixture::new(FixtureFamily::Sidereal, tests)
    }

    pub fn era(&self, instants: &[Instant]) -> Fixture<EraEntry> {
        let tests = instants
            .iter()
            .map(|i| EraEntry {
                ut1_jd: i.ut1(),
                era_deg: era_deg(i),
            })
            .collect();
        Fixture::new(FixtureFamily::Era, tests)
    }

    pub fn tdb_tt(&self, instants: &[Instant]) -> Fixture<TdbTtEntry> {
        let tests = instants
            .iter()
            .map(|i| TdbTtEntry {
                tt_jd: i.tt(),
                tdb_minus_tt_sec: i.tdb_minus_tt(),
            })
            .collect();
        Fixture::new(FixtureFamily::TdbTt, tests)
    }

    pub fn spk(&self, instants: &[Instant]) -> Result<Fixture<SpkEntry>, SkycheckError> {
        let mut tests = Vec::new();
        for instant in instants {
            for body in &self.ctx.config().bodies {
                let p = self.geocentric(body, instant)?;
                tests.push(SpkEntry {
                    tdb_jd: instant.tdb(),
                    body_id: body.id(),
                    pos_km: [p.x, p.y, p.z],
                });
            }
        }
        Ok(Fixture::new(FixtureFamily::Spk, tests))
    }

    pub fn ecliptic(&self, instants: &[Instant]) -> Result<Fixture<EclipticEntry>, SkycheckError> {
        let gc = FixedStar::galactic_center();
        let mut tests = Vec::new();
        for instant in instants {
            for body in &self.ctx.config().bodies {
                let (lat, lon) = icrf_to_ecliptic(&self.geocentric(body, instant)?);
                tests.push(EclipticEntry {
                    tdb_jd: instant.tdb(),
                    body_name: body.name().to_string(),
                    body_id: body.id(),
                    ecl_lat_deg: lat,
                    ecl_lon_deg: lon,
                });
            }
            let (lat, lon) = icrf_to_ecliptic(&gc.direction());
            tests.push(EclipticEntry {
                tdb_jd: instant.tdb(),
                body_name: gc.label().to_string(),
                body_id: 0,
                ecl_lat_deg: lat,
                ecl_lon_deg: lon,
            });
        }
        Ok(Fixture::new(FixtureFamily::Ecliptic, tests))
    }

    pub fn locations(&self, instants: &[Instant]) -> Fixture<LocationEntry> {
        let mut tests = Vec::new();
        for instant in instants {
            for site in &self.ctx.config().locations {
                let (lat, lon) = icrf_to_ecliptic(&site.direction(instant));
                tests.push(LocationEntry {
                    tdb_jd: instant.tdb(),
                    ut1_jd: instant.ut1(),
                    loc_name: site.label().to_string(),
                    lat: site.latitude(),
                    lon: site.longitude(),
                    ecl_lat_deg: lat,
                    ecl_lon_deg: lon,
                });
            }
        }
        Fixture::new(FixtureFamily::Locations, tests)
    }

    pub fn lunar_nodes(&self, instants: &[Instant]) -> Fixture<LunarNodeEntry> {
        let tests = instants
            .iter()
            .map(|i| {
                let (north, south) = mean_lunar_nodes(i.tt());
                LunarNodeEntry {
                    tdb_jd: i.tdb(),
                    north_node_lon_deg: north,
                    south_node_lon_deg: south,
                }
            })
            .collect();
        Fixture::new(FixtureFamily::LunarNodes, tests)
    }

    /// Geocentric phase of [`PHASE_BODIES`]; the Sun is taken at the light-emission epoch.
    pub fn phase(&self, instants: &[Instant]) -> Result<Fixture<PhaseEntry>, SkycheckError> {
        let ephem = self.ctx.ephem();
        let mut tests = Vec::new();
        for instant in instants {
            for body in PHASE_BODIES {
                let astro = astrometric(&body, &Observer::geocenter(), ephem, instant)?;
                let emitted = instant.tdb() - astro.light_time;
                let sun_to_target = body.barycentric_state(ephem, emitted)?.position
                    - Body::Sun.barycentric_state(ephem, emitted)?.position;
                let phase = phase_angle(&-sun_to_target, &-astro.position)?;
                let o = astro.position;
                tests.push(PhaseEntry {
                    tdb_jd: instant.tdb(),
                    body_name: body.name().to_string(),
                    phase_angle_deg: phase,
                    fraction_illuminated: fraction_illuminated(phase),
                    obs_to_target_km: [o.x, o.y, o.z],
                    sun_to_target_km: [sun_to_target.x, sun_to_target.y, sun_to_target.z],
                });
            }
        }
        Ok(Fixture::new(FixtureFamily::Phase, tests))
    }

    pub fn separation(&self, instants: &[Instant]) -> Result<Fixture<SeparationEntry>, SkycheckError> {
        let mut tests = Vec::new();
        for instant in instants {
            for (a, b) in SEPARATION_PAIRS {
                let sep = separation(&self.geocentric(&a, instant)?, &self.geocentric(&b, instant)?)?;
                tests.push(SeparationEntry {
                    tdb_jd: instant.tdb(),
                    body1: a.name().to_string(),
                    body2: b.name().to_string(),
                    separation_deg: sep,
                });
            }
        }
        Ok(Fixture::new(FixtureFamily::Separation, tests))
    }

    /// Moon − Sun apparent longitude on the ecliptic of date.
    pub fn elongation(&self, instants: &[Instant]) -> Result<Fixture<ElongationEntry>, SkycheckError> {
        let almanac = self.ctx.almanac();
        let mut tests = Vec::new();
        for instant in instants {
            let moon = almanac.ecliptic_longitude(Body::Moon, instant.tdb())?;
            let sun = almanac.ecliptic_longitude(Body::Sun, instant.tdb())?;
            tests.push(ElongationEntry {
                tdb_jd: instant.tdb(),
                moon_ecl_lon_deg: moon,
                sun_ecl_lon_deg: sun,
                elongation_deg: elongation(moon, sun),
            });
        }
        Ok(Fixture::new(FixtureFamily::Elongation, tests))
    }

    /// Altitudes −2° .. 90° by 1°, at standard conditions and two other atmospheres.
    pub fn refraction(&self) -> Fixture<RefractionEntry> {
        let conditions = [
            (STANDARD_TEMPERATURE_C, STANDARD_PRESSURE_MBAR),
            (-20.0, 1030.0),
            (30.0, 700.0),
        ];
        let mut tests = Vec::new();
        for (temp_c, pressure_mbar) in conditions {
            for alt in -2..=90 {
                let alt_deg = alt as f64;
                tests.push(RefractionEntry {
                    alt_deg,
                    temp_c,
                    pressure_mbar,
                    refraction_deg: refraction(alt_deg, temp_c, pressure_mbar),
                });
            }
        }
        Fixture::new(FixtureFamily::Refraction, tests)
    }

    fn tdb_window(&self, utc: (JulianDate, JulianDate)) -> Result<(JulianDate, JulianDate), SkycheckError> {
        Ok((self.ctx.instant(utc.0)?.tdb(), self.ctx.instant(utc.1)?.tdb()))
    }

    fn tt_of(&self, event: &DiscreteEvent) -> f64 {
        self.ctx.scales().tdb_to_tt(event.t)
    }

    pub fn seasons(&self, windows: &EventWindows) -> Result<Fixture<SeasonEntry>, SkycheckError> {
        let (start, end) = self.tdb_window(windows.long)?;
        let events = self.ctx.almanac().seasons(start, end)?;
        let tests = events
            .iter()
            .map(|e| SeasonEntry {
                tt_jd: self.tt_of(e),
                season: e.new_value,
            })
            .collect();
        Ok(Fixture::new(FixtureFamily::Seasons, tests))
    }

    pub fn moon_phases(&self, windows: &EventWindows) -> Result<Fixture<MoonPhaseEntry>, SkycheckError> {
        let (start, end) = self.tdb_window(windows.long)?;
        let events = self.ctx.almanac().moon_phases(start, end)?;
        let tests = events
            .iter()
            .map(|e| MoonPhaseEntry {
                tt_jd: self.tt_of(e),
                phase: e.new_value,
            })
            .collect();
        Ok(Fixture::new(FixtureFamily::MoonPhases, tests))
    }

    fn event_site(&self) -> Result<GeodeticLocation, SkycheckError> {
        GeodeticLocation::new("loc_nyc", EVENT_SITE.0, EVENT_SITE.1)
    }

    pub fn sunrise_sunset(&self, windows: &EventWindows) -> Result<Fixture<SunriseEntry>, SkycheckError> {
        let site = self.event_site()?;
        let (start, end) = self.tdb_window(windows.year)?;
        let events = self.ctx.almanac().sunrise_sunset(&site, start, end)?;
        let tests = events
            .iter()
            .map(|e| SunriseEntry {
                tt_jd: self.tt_of(e),
                is_sunrise: e.new_value,
            })
            .collect();
        Ok(Fixture::new(FixtureFamily::SunriseSunset, tests)
            .with_metadata("lat", site.latitude())
            .with_metadata("lon", site.longitude()))
    }

    pub fn twilight(&self, windows: &EventWindows) -> Result<Fixture<TwilightEntry>, SkycheckError> {
        let site = self.event_site()?;
        let (start, end) = self.tdb_window(windows.month)?;
        let events = self.ctx.almanac().twilight(&site, start, end)?;
        let tests = events
            .iter()
            .map(|e| TwilightEntry {
                tt_jd: self.tt_of(e),
                level: e.new_value,
            })
            .collect();
        Ok(Fixture::new(FixtureFamily::Twilight, tests)
            .with_metadata("lat", site.latitude())
            .with_metadata("lon", site.longitude()))
    }

    pub fn oppositions(
        &self,
        body: Body,
        windows: &EventWindows,
    ) -> Result<Fixture<OppositionEntry>, SkycheckError> {
        let (start, end) = self.tdb_window(windows.long)?;
        let events = self.ctx.almanac().oppositions_conjunctions(body, start, end)?;
        let tests = events
            .iter()
            .map(|e| OppositionEntry {
                tt_jd: self.tt_of(e),
                value: e.new_value,
            })
            .collect();
        Ok(Fixture::new(FixtureFamily::Oppositions, tests)
            .with_metadata("body", body.name())
            .with_metadata("body_id", body.id()))
    }
}
