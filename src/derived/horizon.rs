//! Horizon coordinates and hour angle of an ICRF vector for a ground observer.
//!
//! The vector is carried to the true equator and equinox of date (`N·P·B`), turned by
//! GAST about the pole into the terrestrial frame (no polar motion), then by the site
//! longitude and latitude into the local north / east / zenith triad.
use nalgebra::Vector3;

use crate::{
    constants::{normalize_degrees, Degree, Kilometer, DEGRAD},
    earth_orientation::gast,
    observers::GeodeticLocation,
    ref_system::{icrs_to_true_of_date, latlon_degrees},
    time::Instant,
};

use super::refraction::refraction;

/// Altitude, azimuth (north through east) and distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude: Degree,
    pub azimuth: Degree,
    pub distance: Kilometer,
}

fn terrestrial_of_date(position: &Vector3<f64>, instant: &Instant) -> Vector3<f64> {
    let tod = icrs_to_true_of_date(instant.tt()) * position;
    let (sg, cg) = gast(instant.ut1(), instant.tt()).to_radians().sin_cos();
    Vector3::new(cg * tod.x + sg * tod.y, -sg * tod.x + cg * tod.y, tod.z)
}

/// Horizon coordinates of a topocentric ICRF vector.
///
/// Arguments
/// -----------------
/// * `position`: observer → target, ICRF, km.
/// * `site`: geodetic location of the observer.
/// * `instant`: observation time (UT1 for the rotation, TT for precession/nutation).
pub fn altaz(position: &Vector3<f64>, site: &GeodeticLocation, instant: &Instant) -> Horizontal {
    let itrf = terrestrial_of_date(position, instant);
    let (sl, cl) = site.longitude().to_radians().sin_cos();
    let (sp, cp) = site.latitude().to_radians().sin_cos();

    let x1 = cl * itrf.x + sl * itrf.y;
    let y1 = -sl * itrf.x + cl * itrf.y;
    let z1 = itrf.z;

    let north = -sp * x1 + cp * z1;
    let east = y1;
    let up = cp * x1 + sp * z1;

    Horizontal {
        altitude: up.atan2(north.hypot(east)) * DEGRAD,
        azimuth: normalize_degrees(east.atan2(north) * DEGRAD),
        distance: itrf.norm(),
    }
}

/// [`altaz`] with the altitude raised by atmospheric refraction.
pub fn altaz_refracted(
    position: &Vector3<f64>,
    site: &GeodeticLocation,
    instant: &Instant,
    temperature_c: f64,
    pressure_mbar: f64,
) -> Horizontal {
    let mut h = altaz(position, site, instant);
    h.altitude += refraction(h.altitude, temperature_c, pressure_mbar);
    h
}

/// Local hour angle and true-of-date declination, degrees.
///
/// The hour angle is `GAST + longitude − RA` in `[0, 360)`; the zero vector maps to `(0, 0)`.
pub fn hour_angle_dec(
    position: &Vector3<f64>,
    longitude_deg: Degree,
    instant: &Instant,
) -> (Degree, Degree) {
    let tod = icrs_to_true_of_date(instant.tt()) * position;
    if tod.norm() == 0.0 {
        return (0.0, 0.0);
    }
    let (dec, ra) = latlon_degrees(&tod);
    let ha = normalize_degrees(gast(instant.ut1(), instant.tt()) + longitude_deg - ra);
    (ha, dec)
}
