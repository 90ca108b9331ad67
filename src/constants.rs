//! # Constants and type definitions for skycheck
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `skycheck` library, together with the small angle
//! normalisation helpers every calculator applies at its boundary.
//!
//! ## Overview
//!
//! - Time-scale constants (J2000 epoch, day and century lengths, TT − TAI)
//! - Unit conversions (degrees ↔ radians, arcseconds, hours)
//! - Speed of light and solar gravitational parameter
//! - WGS84 ellipsoid parameters
//! - Core type aliases used across the crate
//! - Angle normalisation (`[0, 360)` circles, `[-90, 90]` latitudes)
//!
//! Longitudes that leave this crate are always produced through [`normalize_degrees`], so
//! callers never see `-0.1°` or `360.0°`.

// -------------------------------------------------------------------------------------------------
// Time constants
// -------------------------------------------------------------------------------------------------

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00:00 TT)
pub const J2000_JD: f64 = 2_451_545.0;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Number of days in a Julian year
pub const DAYS_PER_YEAR: f64 = 365.25;

/// TT − TAI in seconds
pub const TT_MINUS_TAI: f64 = 32.184;

/// Julian Date of the Unix epoch (1970-01-01 00:00:00 UTC)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Radians → degrees
pub const DEGRAD: f64 = 180.0 / std::f64::consts::PI;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// 0.1 micro-arcseconds → radians (unit of the IAU 2000A nutation series)
pub const TENTH_UAS_TO_RAD: f64 = RADSEC / 1e7;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in m/s
pub const VLIGHT_M: f64 = 299_792_458.0;

/// Speed of light in km/day
pub const VLIGHT_KM_DAY: f64 = VLIGHT * SECONDS_PER_DAY;

/// Heliocentric gravitational constant GM☉ in m³/s² (IAU 2012)
pub const GM_SUN: f64 = 1.32712440017987e20;

/// WGS84 equatorial radius in kilometers
pub const WGS84_A: f64 = 6378.137;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257223563;

/// WGS84 first eccentricity squared
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;

/// Angle in arcseconds
pub type ArcSec = f64;

/// Angle in radians
pub type Radian = f64;

/// Distance in kilometers
pub type Kilometer = f64;

/// Julian Date (days)
pub type JulianDate = f64;

// -------------------------------------------------------------------------------------------------
// Angle normalisation
// -------------------------------------------------------------------------------------------------

/// Normalize an angle in degrees into `[0, 360)`.
///
/// `rem_euclid` can return exactly `360.0` for tiny negative inputs
/// (`-1e-15 mod 360` rounds up), so that case is folded back to `0.0`.
#[inline]
pub fn normalize_degrees(angle: Degree) -> Degree {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Clamp a latitude-like angle into `[-90, 90]` degrees.
#[inline]
pub fn clamp_latitude(angle: Degree) -> Degree {
    angle.clamp(-90.0, 90.0)
}

/// Julian centuries of TT since J2000.0.
#[inline]
pub fn centuries_since_j2000(jd: JulianDate) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}
