//! Atmospheric refraction, Bennett (1982) with a pressure/temperature scale.
//!
//! ```text
//! R = 0.016667° / tan(h + 7.31 / (h + 4.4))  ×  0.28·P / (T + 273)
//! ```
//!
//! `R` is zero below −1° and above 89.9° of altitude, so the formula never blows up
//! below the horizon.
use crate::constants::Degree;

/// Standard atmosphere used by the reference tables.
pub const STANDARD_TEMPERATURE_C: f64 = 10.0;
pub const STANDARD_PRESSURE_MBAR: f64 = 1010.0;

const REFRACT_ITERATIONS: usize = 20;
const REFRACT_TOLERANCE: Degree = 3e-5;

/// Refraction (degrees) to add to a true altitude.
///
/// Arguments
/// -----------------
/// * `alt_deg`: altitude in degrees.
/// * `temperature_c`: air temperature, °C.
/// * `pressure_mbar`: air pressure, mbar.
pub fn refraction(alt_deg: Degree, temperature_c: f64, pressure_mbar: f64) -> Degree {
    if !(-1.0..=89.9).contains(&alt_deg) {
        return 0.0;
    }
    let r = 0.016667 / (alt_deg + 7.31 / (alt_deg + 4.4)).to_radians().tan();
    r * (0.28 * pressure_mbar / (temperature_c + 273.0))
}

/// Apparent altitude of a body at true altitude `alt_deg`, by fixed-point iteration.
///
/// Return
/// ----------
/// * The refracted altitude, converged to 3e-5° or after 20 passes.
pub fn refract(alt_deg: Degree, temperature_c: f64, pressure_mbar: f64) -> Degree {
    let mut alt = alt_deg;
    for _ in 0..REFRACT_ITERATIONS {
        let prev = alt;
        alt = alt_deg + refraction(alt, temperature_c, pressure_mbar);
        if (alt - prev).abs() < REFRACT_TOLERANCE {
            break;
        }
    }
    alt
}
