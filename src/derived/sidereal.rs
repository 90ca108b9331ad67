//! Sidereal angles of an [`Instant`], degrees in `[0, 360)`.
use crate::{
    constants::Degree,
    earth_orientation::{earth_rotation_angle, gast, gmst},
    time::Instant,
};

/// Earth Rotation Angle.
pub fn era_deg(instant: &Instant) -> Degree {
    earth_rotation_angle(instant.ut1())
}

/// Greenwich Mean Sidereal Time, as an angle.
pub fn gmst_deg(instant: &Instant) -> Degree {
    gmst(instant.ut1(), instant.tt())
}

/// Greenwich Mean Sidereal Time in hours, `[0, 24)`.
pub fn gmst_hours(instant: &Instant) -> f64 {
    gmst_deg(instant) / 15.0
}

/// Greenwich Apparent Sidereal Time, as an angle.
pub fn gast_deg(instant: &Instant) -> Degree {
    gast(instant.ut1(), instant.tt())
}

/// Local apparent sidereal time for an east longitude, degrees.
pub fn last_deg(instant: &Instant, longitude: Degree) -> Degree {
    crate::constants::normalize_degrees(gast_deg(instant) + longitude)
}

#[cfg(test)]
mod sidereal_test {
    use super::*;
    use crate::time::TimeScales;

    #[test]
    fn test_idempotent_and_normalized() {
        let scales = TimeScales::default();
        for year in [1850, 1950, 2025, 2149] {
            let instant = scales.instant_from_calendar(year, 7, 4, 18, 30, 0).unwrap();
            let a = (era_deg(&instant), gmst_deg(&instant), gast_deg(&instant));
            let b = (era_deg(&instant), gmst_deg(&instant), gast_deg(&instant));
            assert_eq!(a, b);
            for v in [a.0, a.1, a.2, last_deg(&instant, -87.6)] {
                assert!((0.0..360.0).contains(&v));
            }
            assert!((0.0..24.0).contains(&gmst_hours(&instant)));
        }
    }
}
