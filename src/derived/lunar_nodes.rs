//! Mean lunar nodes (Meeus, *Astronomical Algorithms* eq. 47.7).
//!
//! This is the **mean** node: no nutation and no periodic perturbations. The true node
//! oscillates about it by up to ~1.7°.
use crate::constants::{centuries_since_j2000, normalize_degrees, Degree, JulianDate};

/// Mean longitude of the ascending node Ω, degrees, not normalized.
pub fn mean_node_polynomial(jd_tt: JulianDate) -> Degree {
    let t = centuries_since_j2000(jd_tt);
    125.04452 - 1934.136261 * t + 0.0020708 * t * t + t * t * t / 450000.0
}

/// `(north, south)` mean node longitudes, degrees in `[0, 360)`.
pub fn mean_lunar_nodes(jd_tt: JulianDate) -> (Degree, Degree) {
    let north = normalize_degrees(mean_node_polynomial(jd_tt));
    (north, normalize_degrees(north + 180.0))
}

#[cfg(test)]
mod lunar_nodes_test {
    use super::*;
    use crate::constants::J2000_JD;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_j2000_value() {
        let (north, south) = mean_lunar_nodes(J2000_JD);
        assert_eq!(north, 125.04452);
        assert_abs_diff_eq!(south, 305.04452, epsilon = 1e-12);
    }

    #[test]
    fn test_regression() {
        // one regression per ~18.6 years, about 19.34°/yr
        let mut jd = 2415020.5;
        while jd < 2488000.0 {
            let (a, _) = mean_lunar_nodes(jd);
            let (b, _) = mean_lunar_nodes(jd + 30.0);
            let step = normalize_degrees(b - a);
            assert!(step > 300.0, "node did not regress at {jd}: {a} -> {b}");
            jd += 97.3;
        }
        let per_year = mean_node_polynomial(J2000_JD) - mean_node_polynomial(J2000_JD + 365.25);
        assert_abs_diff_eq!(per_year, 19.3414, epsilon = 1e-3);
    }

    #[test]
    fn test_normalized() {
        for k in -2000..2000 {
            let (n, s) = mean_lunar_nodes(J2000_JD + k as f64 * 55.5);
            assert!((0.0..360.0).contains(&n));
            assert!((0.0..360.0).contains(&s));
        }
    }
}
