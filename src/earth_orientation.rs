//! # Earth orientation
//!
//! Angles that orient the Earth in the celestial frame:
//!
//! * IAU 2006 precession angles ζ_A, z_A, θ_A,
//! * mean obliquity of the ecliptic of date ε_M,
//! * IAU 2000A nutation (Δψ, Δε) truncated to its 30 largest luni-solar terms (~1″),
//! * Earth Rotation Angle, GMST (`ERA + IAU 2006 polynomial`) and GAST
//!   (`GMST + Δψ·cos ε_M`),
//! * geodetic (WGS84) site → ICRF position, geocentric direction and local vertical.
//!
//! Precession and nutation are evaluated in TT; the Earth Rotation Angle is a linear
//! function of UT1. Every angle returned in degrees is normalized into `[0, 360)`.
//!
//! ## See also
//! ------------
//! * [`crate::ref_system`] – the rotation matrices built from these angles.
use nalgebra::{Matrix3, Vector3};

use crate::constants::{
    centuries_since_j2000, normalize_degrees, Degree, JulianDate, Kilometer, Radian, DEGRAD,
    DPI, J2000_JD, RADSEC, TENTH_UAS_TO_RAD, WGS84_A, WGS84_E2,
};
use crate::ref_system::{
    frame_bias_matrix, nutation_matrix_from_angles, precession_matrix, rotmt, Axis,
};

/// Earth rotation rate, revolutions per UT1 day.
const EARTH_ROTATION_RATE: f64 = 1.002_737_811_911_354_48;

/// IAU 2006 precession angles `(ζ_A, z_A, θ_A)` in radians.
pub fn precession_angles(jd_tt: JulianDate) -> (Radian, Radian, Radian) {
    let t = centuries_since_j2000(jd_tt);
    let zeta =
        2.650545 + t * (2306.083227 + t * (0.2988499 + t * (0.01801828 - t * 0.000005971)));
    let z = -2.650545 + t * (2306.077181 + t * (1.0927348 + t * (0.01826837 - t * 0.000028596)));
    let theta = t * (2004.191903 + t * (-0.4294934 + t * (-0.04182264 - t * 0.000007089)));
    (zeta * RADSEC, z * RADSEC, theta * RADSEC)
}

/// Mean obliquity of the ecliptic of date (Lieske 1979), in radians.
pub fn mean_obliquity(jd_tt: JulianDate) -> Radian {
    let t = centuries_since_j2000(jd_tt);
    (84381.448 + t * (-46.8150 + t * (-0.00059 + t * 0.001813))) * RADSEC
}

/// Delaunay arguments `[l, l', F, D, Ω]` in radians (Simon et al. 1994).
pub fn fundamental_arguments(t: f64) -> [Radian; 5] {
    let l = 485868.249036 + t * (1717915923.2178 + t * (31.8792 + t * (0.051635 - t * 0.00024470)));
    let lp =
        1287104.79305 + t * (129596581.0481 + t * (-0.5532 + t * (0.000136 + t * 0.00001149)));
    let f =
        335779.526232 + t * (1739527262.8478 + t * (-12.7512 + t * (-0.001037 + t * 0.00000417)));
    let d = 1072260.70369 + t * (1602961601.2090 + t * (-6.3706 + t * (0.006593 - t * 0.00003169)));
    let om = 450160.398036 + t * (-6962890.5431 + t * (7.4722 + t * (0.007702 - t * 0.00005939)));
    [l, lp, f, d, om].map(|a| (a * RADSEC) % DPI)
}

/// One row of the luni-solar nutation series.
///
/// Multipliers of `(l, l', F, D, Ω)`, then in 0.1 µas:
/// `Δψ += (s + ṡ·T)·sin(arg) + c'·cos(arg)`, `Δε += (c + ċ·T)·cos(arg) + s'·sin(arg)`.
struct NutationTerm {
    args: [i8; 5],
    s: f64,
    sdot: f64,
    cp: f64,
    c: f64,
    cdot: f64,
    sp: f64,
}

const fn term(args: [i8; 5], coeffs: [f64; 6]) -> NutationTerm {
    NutationTerm {
        args,
        s: coeffs[0],
        sdot: coeffs[1],
        cp: coeffs[2],
        c: coeffs[3],
        cdot: coeffs[4],
        sp: coeffs[5],
    }
}

/// The 30 largest IAU 2000A luni-solar terms (IERS Conventions 2003, table 5.3a).
#[rustfmt::skip]
const NUTATION_TERMS: [NutationTerm; 30] = [
    term([ 0,  0,  0,  0, 1], [-172064161.0, -174666.0,  33386.0, 92052331.0,  9086.0,  15377.0]),
    term([ 0,  0,  2, -2, 2], [ -13170906.0,   -1675.0, -13696.0,  5730336.0, -3015.0,  -4587.0]),
    term([ 0,  0,  2,  0, 2], [  -2276413.0,    -234.0,   2796.0,   978459.0,  -485.0,   1374.0]),
    term([ 0,  0,  0,  0, 2], [   2074554.0,     207.0,   -698.0,  -897492.0,   470.0,   -291.0]),
    term([ 0,  1,  0,  0, 0], [   1475877.0,   -3633.0,  11817.0,    73871.0,  -184.0,  -1924.0]),
    term([ 1,  0,  0,  0, 0], [    711159.0,      73.0,   -872.0,    -6750.0,     0.0,    358.0]),
    term([ 0,  1,  2, -2, 2], [   -516821.0,    1226.0,   -524.0,   224386.0,  -677.0,   -174.0]),
    term([ 0,  0,  2,  0, 1], [   -387298.0,    -367.0,    380.0,   200728.0,    18.0,    318.0]),
    term([ 1,  0,  2,  0, 2], [   -301461.0,     -36.0,    816.0,   129025.0,   -63.0,    367.0]),
    term([ 0, -1,  2, -2, 2], [    215829.0,    -494.0,    111.0,   -95929.0,   299.0,    132.0]),
    term([-1,  0,  0,  2, 0], [    156994.0,      10.0,   -168.0,    -1235.0,     0.0,     82.0]),
    term([ 0,  0,  2, -2, 1], [    128227.0,     137.0,    181.0,   -68982.0,    -9.0,     39.0]),
    term([-1,  0,  2,  0, 2], [    123457.0,      11.0,     19.0,   -53311.0,    32.0,     -4.0]),
    term([ 0,  0,  0,  2, 0], [     63384.0,      11.0,   -150.0,    -1220.0,     0.0,     29.0]),
    term([ 1,  0,  0,  0, 1], [     63110.0,      63.0,     27.0,   -33228.0,     0.0,     -9.0]),
    term([-1,  0,  2,  2, 2], [    -59641.0,     -11.0,    149.0,    25543.0,   -11.0,     66.0]),
    term([-1,  0,  0,  0, 1], [    -57976.0,     -63.0,   -189.0,    31429.0,     0.0,    -75.0]),
    term([ 1,  0,  2,  0, 1], [    -51613.0,     -42.0,    129.0,    26366.0,     0.0,     78.0]),
    term([-2,  0,  0,  2, 0], [    -47722.0,       0.0,    -18.0,      477.0,     0.0,    -25.0]),
    term([-2,  0,  2,  0, 1], [     45893.0,      50.0,     31.0,   -24236.0,   -10.0,     20.0]),
    term([ 0,  0,  2,  2, 2], [    -38571.0,      -1.0,    158.0,    16452.0,   -11.0,     68.0]),
    term([ 0, -2,  2, -2, 2], [     32481.0,       0.0,      0.0,   -13870.0,     0.0,      0.0]),
    term([ 2,  0,  2,  0, 2], [    -31046.0,      -1.0,    131.0,    13238.0,   -11.0,     59.0]),
    term([ 2,  0,  0,  0, 0], [     29243.0,       0.0,    -74.0,     -609.0,     0.0,     13.0]),
    term([ 1,  0,  2, -2, 2], [     28593.0,       0.0,     -1.0,   -12338.0,    10.0,     -3.0]),
    term([ 0,  0,  2,  0, 0], [     25887.0,       0.0,    -66.0,     -550.0,     0.0,     11.0]),
    term([ 0,  0, -2,  2, 0], [     21783.0,       0.0,     13.0,     -167.0,     0.0,     13.0]),
    term([-1,  0,  2,  0, 1], [     20441.0,      21.0,     10.0,   -10758.0,     0.0,     -3.0]),
    term([ 0,  2,  0,  0, 0], [     16707.0,     -85.0,    -10.0,      168.0,    -1.0,     10.0]),
    term([ 0,  2,  2, -2, 2], [    -15794.0,      72.0,    -16.0,     6850.0,   -42.0,     -5.0]),
];

/// Nutation in longitude and obliquity `(Δψ, Δε)`, in radians.
pub fn nutation_angles(jd_tt: JulianDate) -> (Radian, Radian) {
    let t = centuries_since_j2000(jd_tt);
    let fa = fundamental_arguments(t);

    let (dpsi, deps) = NUTATION_TERMS.iter().fold((0.0, 0.0), |(dpsi, deps), nt| {
        let arg: f64 = nt
            .args
            .iter()
            .zip(fa.iter())
            .map(|(&n, a)| n as f64 * a)
            .sum();
        let (s, c) = arg.sin_cos();
        (
            dpsi + (nt.s + nt.sdot * t) * s + nt.cp * c,
            deps + (nt.c + nt.cdot * t) * c + nt.sp * s,
        )
    });
    (dpsi * TENTH_UAS_TO_RAD, deps * TENTH_UAS_TO_RAD)
}

/// Equation of the equinoxes `Δψ·cos ε_M`, in degrees.
pub fn equation_of_equinoxes(jd_tt: JulianDate) -> Degree {
    let (dpsi, _) = nutation_angles(jd_tt);
    dpsi * mean_obliquity(jd_tt).cos() * DEGRAD
}

/// Earth Rotation Angle (IAU 2000), in degrees.
///
/// `ERA = 360° × frac(0.7790572732640 + 1.00273781191135448 × (UT1 − 2451545.0))`,
/// evaluated as `frac(0.779… + 0.00273…·Du) + frac(UT1)` to keep the day fraction exact.
pub fn earth_rotation_angle(jd_ut1: JulianDate) -> Degree {
    let du = jd_ut1 - J2000_JD;
    let th = 0.779_057_273_264_0 + (EARTH_ROTATION_RATE - 1.0) * du;
    let turns = (th.rem_euclid(1.0) + jd_ut1.rem_euclid(1.0)).rem_euclid(1.0);
    normalize_degrees(turns * 360.0)
}

/// Greenwich Mean Sidereal Time, in degrees.
///
/// `GMST = ERA(UT1) + (0.014506 + 4612.156534·T + 1.3915817·T² − 0.00000044·T³
/// − 0.000029956·T⁴ − 0.0000000368·T⁵)″`, `T` in TT centuries since J2000 (IERS 2010 eq. 5.32).
pub fn gmst(jd_ut1: JulianDate, jd_tt: JulianDate) -> Degree {
    let t = centuries_since_j2000(jd_tt);
    let poly = 0.014506
        + t * (4612.156534
            + t * (1.3915817 + t * (-0.00000044 + t * (-0.000029956 + t * -0.0000000368))));
    normalize_degrees(earth_rotation_angle(jd_ut1) + poly / 3600.0)
}

/// Greenwich Apparent Sidereal Time, in degrees.
pub fn gast(jd_ut1: JulianDate, jd_tt: JulianDate) -> Degree {
    normalize_degrees(gmst(jd_ut1, jd_tt) + equation_of_equinoxes(jd_tt))
}

/// Terrestrial (ITRF) position of a point on the WGS84 ellipsoid at zero height, in km.
pub fn geodetic_to_itrf(lat_deg: Degree, lon_deg: Degree) -> Vector3<f64> {
    let (slat, clat) = lat_deg.to_radians().sin_cos();
    let (slon, clon) = lon_deg.to_radians().sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * slat * slat).sqrt();
    Vector3::new(n * clat * clon, n * clat * slon, n * (1.0 - WGS84_E2) * slat)
}

/// Inverse of [`geodetic_to_itrf`] with height: Bowring's method, three refinements.
///
/// Return
/// ----------
/// * `(latitude°, longitude° in [0, 360), height km)`.
pub fn itrf_to_geodetic(itrf: &Vector3<f64>) -> (Degree, Degree, Kilometer) {
    let (x, y, z) = (itrf.x, itrf.y, itrf.z);
    let lon = normalize_degrees(y.atan2(x) * DEGRAD);
    let p = x.hypot(y);
    let b = WGS84_A * (1.0 - crate::constants::WGS84_F);

    if p == 0.0 {
        let lat = if z >= 0.0 { 90.0 } else { -90.0 };
        return (lat, lon, z.abs() - b);
    }

    let (st, ct) = (z * WGS84_A).atan2(p * b).sin_cos();
    let ep2 = WGS84_E2 / (1.0 - crate::constants::WGS84_F).powi(2);
    let mut lat = (z + ep2 * b * st.powi(3)).atan2(p - WGS84_E2 * WGS84_A * ct.powi(3));
    for _ in 0..3 {
        let s = lat.sin();
        let n = WGS84_A / (1.0 - WGS84_E2 * s * s).sqrt();
        lat = (z + WGS84_E2 * n * s).atan2(p);
    }

    let (s, c) = lat.sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * s * s).sqrt();
    let height = if c.abs() > 1e-10 {
        p / c - n
    } else {
        z.abs() / s.abs() - n * (1.0 - WGS84_E2)
    };
    (lat * DEGRAD, lon, height)
}

/// Rotation ITRF → ICRF at an instant: `Bᵀ · Pᵀ · Nᵀ · R3(GAST)`.
pub fn itrf_to_icrf_matrix(jd_ut1: JulianDate, jd_tt: JulianDate) -> Matrix3<f64> {
    let (dpsi, deps) = nutation_angles(jd_tt);
    let eps = mean_obliquity(jd_tt);
    let eqeq = dpsi * eps.cos() * DEGRAD;
    let gast = normalize_degrees(gmst(jd_ut1, jd_tt) + eqeq);

    let n = nutation_matrix_from_angles(dpsi, deps, eps);
    let celestial = n * precession_matrix(jd_tt) * frame_bias_matrix();
    celestial.transpose() * rotmt(gast.to_radians(), Axis::Z)
}

/// Unit ICRF vector along the ellipsoid normal (local vertical) of a geodetic site.
pub fn geodetic_zenith(
    lat_deg: Degree,
    lon_deg: Degree,
    jd_ut1: JulianDate,
    jd_tt: JulianDate,
) -> Vector3<f64> {
    let (slat, clat) = lat_deg.to_radians().sin_cos();
    let (slon, clon) = lon_deg.to_radians().sin_cos();
    itrf_to_icrf_matrix(jd_ut1, jd_tt) * Vector3::new(clat * clon, clat * slon, slat)
}

/// ICRF position (km) and velocity (km/day) of a ground site relative to the geocentre.
///
/// The velocity is the Earth-rotation term `ω × r` taken about the true pole of date.
pub fn geodetic_to_icrf_state(
    lat_deg: Degree,
    lon_deg: Degree,
    jd_ut1: JulianDate,
    jd_tt: JulianDate,
) -> (Vector3<f64>, Vector3<f64>) {
    let itrf = geodetic_to_itrf(lat_deg, lon_deg);
    let m = itrf_to_icrf_matrix(jd_ut1, jd_tt);
    let omega = Vector3::new(0.0, 0.0, DPI * EARTH_ROTATION_RATE);
    (m * itrf, m * omega.cross(&itrf))
}

/// Unit ICRF vector from the geocentre towards a geodetic site.
///
/// This is the geocentric direction of the site; it departs from the local vertical by
/// the angle between geodetic and geocentric latitude (up to ~0.19°).
pub fn geodetic_to_icrf(
    lat_deg: Degree,
    lon_deg: Degree,
    jd_ut1: JulianDate,
    jd_tt: JulianDate,
) -> Vector3<f64> {
    itrf_to_icrf_matrix(jd_ut1, jd_tt) * geodetic_to_itrf(lat_deg, lon_deg).normalize()
}

#[cfg(test)]
mod test_earth_orientation {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_era_at_j2000() {
        assert_abs_diff_eq!(earth_rotation_angle(J2000_JD), 280.46061837504, epsilon = 1e-9);
    }

    #[test]
    fn test_gmst_at_j2000() {
        let expected = 280.46061837504 + 0.014506 / 3600.0;
        assert_abs_diff_eq!(gmst(J2000_JD, J2000_JD), expected, epsilon = 1e-6);
        // classic IAU 1982 value at the same epoch
        assert_abs_diff_eq!(gmst(J2000_JD, J2000_JD), 280.46061837, epsilon = 1e-4);
    }

    #[test]
    fn test_era_rate() {
        let a = earth_rotation_angle(2460000.5);
        let b = earth_rotation_angle(2460001.5);
        let advance = normalize_degrees(b - a);
        // one UT1 day turns the Earth by 360·0.00273781191135448° past a full turn
        assert_abs_diff_eq!(advance, 0.985612288, epsilon = 1e-6);
        assert!((0.0..360.0).contains(&a));
    }

    #[test]
    fn test_mean_obliquity() {
        assert_abs_diff_eq!(mean_obliquity(J2000_JD) * DEGRAD, 23.439291111, epsilon = 1e-9);
        assert!(mean_obliquity(J2000_JD + 36525.0) < mean_obliquity(J2000_JD));
    }

    #[test]
    fn test_nutation_magnitude() {
        // 2000-01-01: Δψ ≈ −13.9″, Δε ≈ −5.8″ (IAU 2000A)
        let (dpsi, deps) = nutation_angles(J2000_JD);
        assert_abs_diff_eq!(dpsi / RADSEC, -13.93, epsilon = 0.5);
        assert_abs_diff_eq!(deps / RADSEC, -5.77, epsilon = 0.5);

        let mut jd = 2415020.5;
        while jd < 2488070.5 {
            let (dpsi, deps) = nutation_angles(jd);
            assert!(dpsi.abs() / RADSEC < 20.0);
            assert!(deps.abs() / RADSEC < 11.0);
            jd += 97.0;
        }
    }

    #[test]
    fn test_equation_of_equinoxes_bounded() {
        let eqeq = equation_of_equinoxes(2460676.5) * 3600.0;
        assert!(eqeq.abs() < 18.0);
        let gast = gast(2460676.5, 2460676.5 + 69.0 / 86400.0);
        assert!((0.0..360.0).contains(&gast));
    }

    #[test]
    fn test_geodetic_round_trip() {
        for (lat, lon) in [(41.8674558, 272.3516076), (-33.9, 18.4), (0.0, 0.0), (89.0, 10.0)] {
            let itrf = geodetic_to_itrf(lat, lon);
            let (lat2, lon2, h) = itrf_to_geodetic(&itrf);
            assert_abs_diff_eq!(lat2, lat, epsilon = 1e-9);
            assert_abs_diff_eq!(lon2, lon, epsilon = 1e-9);
            assert_abs_diff_eq!(h, 0.0, epsilon = 1e-6);
        }
        let (lat, _, h) = itrf_to_geodetic(&Vector3::new(0.0, 0.0, 6400.0));
        assert_eq!(lat, 90.0);
        assert!(h > 0.0);
    }

    #[test]
    fn test_zenith_of_north_pole_is_celestial_pole() {
        let jd = 2460676.5;
        let zenith = geodetic_to_icrf(90.0, 0.0, jd, jd);
        assert_abs_diff_eq!(zenith, geodetic_zenith(90.0, 0.0, jd, jd), epsilon = 1e-12);
        assert_abs_diff_eq!(zenith.norm(), 1.0, epsilon = 1e-12);
        // precession moves the pole by ~0.35° after 25 years
        assert!(zenith.z > 0.9999);
    }

    #[test]
    fn test_site_velocity_is_rotation() {
        let jd = 2460676.5;
        let (pos, vel) = geodetic_to_icrf_state(0.0, 0.0, jd, jd);
        assert_abs_diff_eq!(pos.norm(), WGS84_A, epsilon = 1e-9);
        // equatorial speed ≈ 0.465 km/s
        assert_abs_diff_eq!(vel.norm() / 86400.0, 0.4651, epsilon = 1e-3);
        assert_abs_diff_eq!(pos.dot(&vel), 0.0, epsilon = 1e-6);
    }
}
