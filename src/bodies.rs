//! # Bodies and targets
//!
//! The closed set of solar-system bodies the golden datasets are built for, plus fixed
//! directions (the galactic centre) that are observed the same way.
//!
//! ```text
//! label      NAIF id   kernel chain
//! sun          10      10 → 0
//! moon        301      301 → 3 → 0
//! mercury     199      199 → 1 → 0
//! venus       299      299 → 2 → 0
//! earth       399      399 → 3 → 0
//! mars          4      barycenter
//! jupiter       5      barycenter
//! saturn        6      barycenter
//! uranus        7      barycenter
//! neptune       8      barycenter
//! pluto         9      barycenter
//! ```
//!
//! Anything that can be observed implements [`Target`]: the astrometry routines only need a
//! label and a barycentric state at a TDB instant.
use std::{fmt, str::FromStr};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{JulianDate, AU},
    jpl_ephem::{
        naif::naif_ids::{MassCenter, PlanetaryBary},
        EphemerisSource, NaifIds,
    },
    ref_system::radec_to_icrf,
    skycheck_errors::SkycheckError,
    state_vector::StateVector,
};

/// Capability shared by every observable object.
pub trait Target: Send + Sync + fmt::Debug {
    /// Column prefix used in the CSV tables (`mars`, `gc`, ...).
    fn label(&self) -> &str;

    /// ICRF state relative to the Solar System Barycenter, km and km/day.
    fn barycentric_state(
        &self,
        ephem: &dyn EphemerisSource,
        jd_tdb: JulianDate,
    ) -> Result<StateVector, SkycheckError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    /// The bodies of the reference dataset, in column order.
    pub const GOLDEN: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    pub fn naif(&self) -> NaifIds {
        match self {
            Body::Sun => NaifIds::Sun,
            Body::Moon => NaifIds::MOON,
            Body::Mercury => NaifIds::MC(MassCenter::Mercury),
            Body::Venus => NaifIds::MC(MassCenter::Venus),
            Body::Earth => NaifIds::EARTH,
            Body::Mars => NaifIds::PB(PlanetaryBary::Mars),
            Body::Jupiter => NaifIds::PB(PlanetaryBary::Jupiter),
            Body::Saturn => NaifIds::PB(PlanetaryBary::Saturn),
            Body::Uranus => NaifIds::PB(PlanetaryBary::Uranus),
            Body::Neptune => NaifIds::PB(PlanetaryBary::Neptune),
            Body::Pluto => NaifIds::PB(PlanetaryBary::Pluto),
        }
    }

    pub fn id(&self) -> i32 {
        self.naif().to_id()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Earth => "earth",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
        }
    }

    /// Body whose kernel id is `id`, either its mass center or its barycenter.
    pub fn from_id(id: i32) -> Result<Self, SkycheckError> {
        [
            Body::Sun,
            Body::Moon,
            Body::Mercury,
            Body::Venus,
            Body::Earth,
            Body::Mars,
            Body::Jupiter,
            Body::Saturn,
            Body::Uranus,
            Body::Neptune,
            Body::Pluto,
        ]
        .into_iter()
        .find(|b| b.id() == id)
        .ok_or(SkycheckError::UnsupportedBody(id))
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = SkycheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sun" => Ok(Body::Sun),
            "moon" => Ok(Body::Moon),
            "mercury" => Ok(Body::Mercury),
            "venus" => Ok(Body::Venus),
            "earth" => Ok(Body::Earth),
            "mars" => Ok(Body::Mars),
            "jupiter" => Ok(Body::Jupiter),
            "saturn" => Ok(Body::Saturn),
            "uranus" => Ok(Body::Uranus),
            "neptune" => Ok(Body::Neptune),
            "pluto" => Ok(Body::Pluto),
            other => Err(SkycheckError::InvalidConfig(format!("unknown body '{other}'"))),
        }
    }
}

impl Target for Body {
    fn label(&self) -> &str {
        self.name()
    }

    fn barycentric_state(
        &self,
        ephem: &dyn EphemerisSource,
        jd_tdb: JulianDate,
    ) -> Result<StateVector, SkycheckError> {
        ephem.state(self.naif(), jd_tdb)
    }
}

/// Distance at which fixed directions are placed, ~1 Gpc in km.
const FIXED_STAR_DISTANCE: f64 = 2.062_648_062_470_964e14 * AU;

/// A direction fixed in the ICRF (no proper motion, no parallax).
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStar {
    label: String,
    ra_hours: f64,
    dec_deg: f64,
}

impl FixedStar {
    pub fn new(label: impl Into<String>, ra_hours: f64, dec_deg: f64) -> Self {
        FixedStar {
            label: label.into(),
            ra_hours,
            dec_deg,
        }
    }

    /// Sgr A* direction, 17h45m40.0409s −29°00′28.118″ (ICRS).
    pub fn galactic_center() -> Self {
        FixedStar::new(
            "gc",
            17.0 + 45.0 / 60.0 + 40.0409 / 3600.0,
            -(29.0 + 0.0 / 60.0 + 28.118 / 3600.0),
        )
    }

    pub fn ra_hours(&self) -> f64 {
        self.ra_hours
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec_deg
    }

    /// Unit ICRF vector towards the star.
    pub fn direction(&self) -> Vector3<f64> {
        radec_to_icrf(self.ra_hours, self.dec_deg)
    }
}

impl Target for FixedStar {
    fn label(&self) -> &str {
        &self.label
    }

    fn barycentric_state(
        &self,
        _ephem: &dyn EphemerisSource,
        _jd_tdb: JulianDate,
    ) -> Result<StateVector, SkycheckError> {
        Ok(StateVector::new(
            self.direction() * FIXED_STAR_DISTANCE,
            Vector3::zeros(),
        ))
    }
}
