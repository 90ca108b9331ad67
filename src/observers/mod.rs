//! # Observers & ground sites
//!
//! An [`Observer`] is the Earth's centre, optionally displaced by the ICRF offset of a
//! point on the WGS84 ellipsoid. The displacement is a plain vector sum:
//!
//! ```text
//! observer(t) = earth(t) + site_offset(t)
//! ```
//!
//! so the same ephemeris query serves the geocentric and the topocentric cases.
//!
//! ## Units
//!
//! - Latitudes/longitudes: **degrees**, geodetic, east-positive longitude.
//! - Offsets: **km** and **km/day** (Earth rotation `ω × r`).
//! - Heights: sites sit on the ellipsoid (zero elevation).
//!
//! ## See also
//! ------------
//! * [`crate::earth_orientation::geodetic_to_icrf_state`] – the rotation ITRF → ICRF used
//!   for the offset.
//! * [`locations::Location`] – the named sites of the reference datasets.
pub mod locations;

use nalgebra::Vector3;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{normalize_degrees, Degree, Kilometer},
    earth_orientation::{
        geodetic_to_icrf, geodetic_to_icrf_state, geodetic_to_itrf, geodetic_zenith,
        itrf_to_geodetic,
    },
    jpl_ephem::{EphemerisSource, NaifIds},
    skycheck_errors::SkycheckError,
    state_vector::StateVector,
    time::Instant,
};

pub use locations::{Location, Site};

/// A labelled point on the WGS84 ellipsoid.
///
/// Latitude and longitude are stored as `NotNan` so a site can be hashed and used as a
/// map key; a NaN coordinate is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocation", into = "RawLocation")]
pub struct GeodeticLocation {
    label: String,
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawLocation {
    label: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawLocation> for GeodeticLocation {
    type Error = SkycheckError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        GeodeticLocation::new(raw.label, raw.latitude, raw.longitude)
    }
}

impl From<GeodeticLocation> for RawLocation {
    fn from(loc: GeodeticLocation) -> Self {
        RawLocation {
            latitude: loc.latitude(),
            longitude: loc.longitude(),
            label: loc.label,
        }
    }
}

impl GeodeticLocation {
    /// Build a site from a geodetic latitude and longitude.
    ///
    /// Arguments
    /// -----------------
    /// * `label`: CSV column prefix, e.g. `loc_london`.
    /// * `latitude`: geodetic latitude in degrees, `[-90, 90]`.
    /// * `longitude`: east longitude in degrees, any range.
    ///
    /// Return
    /// ----------
    /// * The site, or [`SkycheckError::InvalidConfig`] for a NaN or out-of-range latitude.
    pub fn new(
        label: impl Into<String>,
        latitude: Degree,
        longitude: Degree,
    ) -> Result<Self, SkycheckError> {
        let label = label.into();
        if !(-90.0..=90.0).contains(&latitude) || !longitude.is_finite() {
            return Err(SkycheckError::InvalidConfig(format!(
                "location '{label}' has invalid coordinates ({latitude}, {longitude})"
            )));
        }
        Ok(GeodeticLocation {
            label,
            latitude: NotNan::new(latitude)
                .map_err(|_| SkycheckError::InvalidConfig("NaN latitude".into()))?,
            longitude: NotNan::new(longitude)
                .map_err(|_| SkycheckError::InvalidConfig("NaN longitude".into()))?,
        })
    }

    /// Recover the geodetic site under an ITRF position (km), dropping the height.
    pub fn from_itrf(label: impl Into<String>, itrf: &Vector3<f64>) -> Result<Self, SkycheckError> {
        let (lat, lon, _) = itrf_to_geodetic(itrf);
        let lon = if lon > 180.0 { lon - 360.0 } else { lon };
        GeodeticLocation::new(label, lat, lon)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    /// East longitude normalized into `[0, 360)`.
    pub fn longitude_east(&self) -> Degree {
        normalize_degrees(self.longitude())
    }

    /// Terrestrial position on the ellipsoid, km.
    pub fn itrf(&self) -> Vector3<f64> {
        geodetic_to_itrf(self.latitude(), self.longitude())
    }

    /// Geocentric distance of the site, km.
    pub fn geocentric_radius(&self) -> Kilometer {
        self.itrf().norm()
    }

    /// Unit ICRF vector from the geocentre towards the site.
    pub fn direction(&self, instant: &Instant) -> Vector3<f64> {
        geodetic_to_icrf(self.latitude(), self.longitude(), instant.ut1(), instant.tt())
    }

    /// Unit ICRF vector of the local vertical (ellipsoid normal).
    pub fn zenith(&self, instant: &Instant) -> Vector3<f64> {
        geodetic_zenith(self.latitude(), self.longitude(), instant.ut1(), instant.tt())
    }

    /// ICRF offset of the site from the geocentre, km and km/day.
    pub fn icrf_offset(&self, instant: &Instant) -> StateVector {
        let (position, velocity) =
            geodetic_to_icrf_state(self.latitude(), self.longitude(), instant.ut1(), instant.tt());
        StateVector::new(position, velocity)
    }
}

/// Where observations are made from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observer {
    site: Option<GeodeticLocation>,
}

impl Observer {
    /// The Earth's centre of mass.
    pub fn geocenter() -> Self {
        Observer { site: None }
    }

    /// A point on the Earth's surface.
    pub fn topocentric(site: GeodeticLocation) -> Self {
        Observer { site: Some(site) }
    }

    pub fn site(&self) -> Option<&GeodeticLocation> {
        self.site.as_ref()
    }

    pub fn label(&self) -> &str {
        self.site.as_ref().map_or("geocenter", |s| s.label())
    }

    /// Barycentric ICRF state of the observer, km and km/day.
    ///
    /// See also
    /// ------------
    /// * [`GeodeticLocation::icrf_offset`] – the topocentric term added to the Earth's state.
    pub fn state(
        &self,
        ephem: &dyn EphemerisSource,
        instant: &Instant,
    ) -> Result<StateVector, SkycheckError> {
        let earth = ephem.state(NaifIds::EARTH, instant.tdb())?;
        Ok(match &self.site {
            None => earth,
            Some(site) => earth + site.icrf_offset(instant),
        })
    }
}

impl From<GeodeticLocation> for Observer {
    fn from(site: GeodeticLocation) -> Self {
        Observer::topocentric(site)
    }
}
