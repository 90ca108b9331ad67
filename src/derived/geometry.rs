//! Line–sphere intersection and the Earth-shadow / Earth-occultation tests built on it.
use nalgebra::Vector3;

use crate::constants::Kilometer;

/// Mean Earth radius used for shadow and occultation tests, km.
pub const EARTH_MEAN_RADIUS: Kilometer = 6371.0;

/// Distances along the ray `0 → endpoint` where it enters and leaves a sphere.
///
/// Return
/// ----------
/// * `(near, far)`; both `NaN` when the ray misses the sphere or `endpoint` is zero.
///   Negative values lie behind the origin.
pub fn intersect_line_sphere(
    endpoint: &Vector3<f64>,
    center: &Vector3<f64>,
    radius: Kilometer,
) -> (f64, f64) {
    let len = endpoint.norm();
    if len == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let dir = endpoint / len;
    let minus_b = 2.0 * dir.dot(center);
    let c = center.norm_squared() - radius * radius;
    let disc = minus_b * minus_b - 4.0 * c;
    if disc < 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let root = disc.sqrt();
    ((minus_b - root) / 2.0, (minus_b + root) / 2.0)
}

/// Whether a point at `position` (geocentric, km) is outside the Earth's shadow.
pub fn is_sunlit(position: &Vector3<f64>, sun_position: &Vector3<f64>) -> bool {
    let to_sun = sun_position - position;
    let (near, far) = intersect_line_sphere(&to_sun, &-position, EARTH_MEAN_RADIUS);
    if near.is_nan() {
        return true;
    }
    let sun_dist = to_sun.norm();
    if sun_dist == 0.0 {
        return false;
    }
    far < 0.0 || near > sun_dist
}

/// Whether the Earth blocks the line of sight from `observer` to `target` (geocentric, km).
pub fn is_behind_earth(observer: &Vector3<f64>, target: &Vector3<f64>) -> bool {
    let to_target = target - observer;
    let (near, _) = intersect_line_sphere(&to_target, &-observer, EARTH_MEAN_RADIUS);
    if near.is_nan() {
        return false;
    }
    let dist = to_target.norm();
    dist != 0.0 && (0.0..=dist).contains(&near)
}
