//! Angles between directions: separation, phase, elongation, position angle.
use nalgebra::Vector3;

use crate::{
    constants::{normalize_degrees, Degree, DEGRAD},
    skycheck_errors::SkycheckError,
};

/// How far a cosine may overshoot `[-1, 1]` and still be treated as rounding.
pub const COSINE_OVERSHOOT: f64 = 1e-9;

/// Angular separation between two directions, degrees in `[0, 180]`.
///
/// `acos(a·b / |a||b|)` with the cosine clamped into `[-1, 1]` when it overshoots by less
/// than [`COSINE_OVERSHOOT`].
///
/// Return
/// ----------
/// * [`SkycheckError::DomainError`] for a zero-length or non-finite input, or a cosine
///   further than [`COSINE_OVERSHOOT`] outside `[-1, 1]`.
///
/// See also
/// ------------
/// * [`separation_kahan`] – well conditioned near 0° and 180°.
pub fn separation(a: &Vector3<f64>, b: &Vector3<f64>) -> Result<Degree, SkycheckError> {
    let norms = a.norm() * b.norm();
    if norms == 0.0 || !norms.is_finite() {
        return Err(SkycheckError::DomainError {
            context: "separation of a zero-length vector",
            value: norms,
        });
    }
    let cos = a.dot(b) / norms;
    if cos.is_nan() || cos.abs() > 1.0 + COSINE_OVERSHOOT {
        return Err(SkycheckError::DomainError {
            context: "separation cosine",
            value: cos,
        });
    }
    Ok(cos.clamp(-1.0, 1.0).acos() * DEGRAD)
}

/// Kahan's separation `2·atan2(|u − v|, |u + v|)` with `u = a|b|`, `v = b|a|`, degrees.
///
/// Returns `0` when either vector has zero length.
pub fn separation_kahan(a: &Vector3<f64>, b: &Vector3<f64>) -> Degree {
    let (la, lb) = (a.norm(), b.norm());
    if la == 0.0 || lb == 0.0 {
        return 0.0;
    }
    let u = a * lb;
    let v = b * la;
    2.0 * (u - v).norm().atan2((u + v).norm()) * DEGRAD
}

/// Sun–target–observer angle, degrees.
///
/// Arguments
/// -----------------
/// * `target_to_sun`: vector from the target to the Sun.
/// * `target_to_observer`: vector from the target to the observer.
pub fn phase_angle(
    target_to_sun: &Vector3<f64>,
    target_to_observer: &Vector3<f64>,
) -> Result<Degree, SkycheckError> {
    separation(target_to_sun, target_to_observer)
}

/// Illuminated fraction of the disk, `(1 + cos phase) / 2`.
pub fn fraction_illuminated(phase_deg: Degree) -> f64 {
    0.5 * (1.0 + phase_deg.to_radians().cos())
}

/// Ecliptic elongation `(target − reference) mod 360`, degrees.
pub fn elongation(target_lon: Degree, reference_lon: Degree) -> Degree {
    normalize_degrees(target_lon - reference_lon)
}

/// Position angle of object 2 relative to object 1, east of north, degrees in `[0, 360)`.
pub fn position_angle(ra1_hours: f64, dec1_deg: Degree, ra2_hours: f64, dec2_deg: Degree) -> Degree {
    let dec1 = dec1_deg.to_radians();
    let dec2 = dec2_deg.to_radians();
    let dra = ((ra2_hours - ra1_hours) * 15.0).to_radians();
    let pa = dra
        .sin()
        .atan2(dec1.cos() * dec2.tan() - dec1.sin() * dra.cos());
    normalize_degrees(pa * DEGRAD)
}
