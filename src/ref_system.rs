//! # Reference frames
//!
//! Rotation matrices between the celestial frames used by the crate:
//!
//! ```text
//!        B               P(t)                 N(t)               R3(GAST)
//! ICRS ─────► J2000 mean ─────► mean of date ─────► true of date ─────────► ITRF (terrestrial)
//!   │
//!   ├──► ecliptic J2000   (rotation about X by the J2000 mean obliquity)
//!   └──► galactic         (IAU 1958 System II)
//! ```
//!
//! * **Frame bias** `B`: IERS 2003 ICRS offsets (ξ₀, η₀, dα₀), second order.
//! * **Precession** `P`: IAU 2006 angles ζ_A, z_A, θ_A, `P = R3(−z_A)·R2(θ_A)·R3(−ζ_A)`.
//! * **Nutation** `N`: `R1(−ε_T)·R3(−Δψ)·R1(ε_M)` from the 30 largest IAU 2000A luni-solar terms.
//!
//! Every matrix is *applied to the vector*: `v_date = P · v_J2000`, and the inverse
//! transformation is the transpose.
//!
//! ## See also
//! ------------
//! * [`crate::earth_orientation`] – the angles (Δψ, Δε, ε, GAST) these matrices are built from.
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{clamp_latitude, normalize_degrees, Degree, JulianDate, DEGRAD, RADSEC};
use crate::earth_orientation::{mean_obliquity, nutation_angles, precession_angles};

/// Principal axis of an elementary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Right-handed rotation matrix of angle `alpha` (radians) about a principal axis.
///
/// The matrix is an **active** rotation: `x' = R · x` turns the vector counter-clockwise
/// when looking down the axis towards the origin. The passive (change of basis) rotation
/// of the same angle is `rotmt(-alpha, axis)`.
pub fn rotmt(alpha: f64, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };
    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// sin / cos of the J2000 mean obliquity, 84381.448″.
pub const OBLIQUITY_J2000_SIN: f64 = 0.397_777_155_931_913_7;
pub const OBLIQUITY_J2000_COS: f64 = 0.917_482_062_069_181_8;

/// ICRF → galactic System II rotation.
#[rustfmt::skip]
pub const GALACTIC_MATRIX: [[f64; 3]; 3] = [
    [-0.054875539395742523, -0.87343710472759606, -0.48383499177002515],
    [ 0.49410945362774389,  -0.44482959429757496,  0.74698224869989183],
    [-0.86766613568337381,  -0.19807638961301985,  0.45598379452141991],
];

/// Frame bias matrix `B`, ICRS → dynamical mean equator and equinox of J2000.
pub fn frame_bias_matrix() -> Matrix3<f64> {
    let xi0 = -0.0166170 * RADSEC;
    let eta0 = -0.0068192 * RADSEC;
    let da0 = -0.01460 * RADSEC;

    let yx = -da0;
    let zx = xi0;
    let xy = da0;
    let zy = eta0;
    let xz = -xi0;
    let yz = -eta0;

    let xx = 1.0 - 0.5 * (yx * yx + zx * zx);
    let yy = 1.0 - 0.5 * (yx * yx + zy * zy);
    let zz = 1.0 - 0.5 * (zy * zy + zx * zx);

    Matrix3::new(xx, xy, xz, yx, yy, yz, zx, zy, zz)
}

/// IAU 2006 precession matrix `P`, J2000 mean → mean equator and equinox of date.
///
/// Arguments
/// -----------------
/// * `jd_tt`: TT Julian Date of the target equinox.
pub fn precession_matrix(jd_tt: JulianDate) -> Matrix3<f64> {
    let (zeta, z, theta) = precession_angles(jd_tt);
    let (sz, cz) = z.sin_cos();
    let (sze, cze) = zeta.sin_cos();
    let (st, ct) = theta.sin_cos();

    Matrix3::new(
        cz * ct * cze - sz * sze,
        -cz * ct * sze - sz * cze,
        -cz * st,
        sz * ct * cze + cz * sze,
        -sz * ct * sze + cz * cze,
        -sz * st,
        st * cze,
        -st * sze,
        ct,
    )
}

/// Nutation matrix `N`, mean of date → true of date.
///
/// Built from Δψ, Δε (radians) and the mean obliquity ε_M (radians).
pub fn nutation_matrix_from_angles(dpsi: f64, deps: f64, eps_mean: f64) -> Matrix3<f64> {
    let eps_true = eps_mean + deps;
    let (sp, cp) = dpsi.sin_cos();
    let (sm, cm) = eps_mean.sin_cos();
    let (st, ct) = eps_true.sin_cos();

    Matrix3::new(
        cp,
        -sp * cm,
        -sp * sm,
        sp * ct,
        cp * cm * ct + sm * st,
        cp * sm * ct - cm * st,
        sp * st,
        cp * cm * st - sm * ct,
        cp * sm * st + cm * ct,
    )
}

/// Nutation matrix `N` at a TT Julian Date.
pub fn nutation_matrix(jd_tt: JulianDate) -> Matrix3<f64> {
    let (dpsi, deps) = nutation_angles(jd_tt);
    nutation_matrix_from_angles(dpsi, deps, mean_obliquity(jd_tt))
}

/// Combined `N · P · B`, ICRS → true equator and equinox of date.
pub fn icrs_to_true_of_date(jd_tt: JulianDate) -> Matrix3<f64> {
    nutation_matrix(jd_tt) * precession_matrix(jd_tt) * frame_bias_matrix()
}

/// Spherical latitude / longitude (degrees) of a Cartesian vector.
///
/// The longitude is normalized into `[0, 360)` and the latitude clamped into `[-90, 90]`.
/// The zero vector maps to `(0, 0)`.
pub fn latlon_degrees(v: &Vector3<f64>) -> (Degree, Degree) {
    let r = v.norm();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let lat = clamp_latitude((v.z / r).clamp(-1.0, 1.0).asin() * DEGRAD);
    let lon = normalize_degrees(v.y.atan2(v.x) * DEGRAD);
    (lat, lon)
}

/// ICRF vector → J2000 ecliptic Cartesian vector.
pub fn icrf_to_ecliptic_vector(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        v.x,
        OBLIQUITY_J2000_COS * v.y + OBLIQUITY_J2000_SIN * v.z,
        -OBLIQUITY_J2000_SIN * v.y + OBLIQUITY_J2000_COS * v.z,
    )
}

/// Ecliptic (J2000 mean ecliptic and equinox) latitude and longitude, in degrees.
pub fn icrf_to_ecliptic(v: &Vector3<f64>) -> (Degree, Degree) {
    latlon_degrees(&icrf_to_ecliptic_vector(v))
}

/// Ecliptic latitude and longitude on the true ecliptic and equinox of date, in degrees.
///
/// The vector is carried to the true equator of date (`N·P·B`) and turned about X by the
/// true obliquity `ε_M + Δε`.
pub fn icrf_to_ecliptic_of_date(v: &Vector3<f64>, jd_tt: JulianDate) -> (Degree, Degree) {
    let (dpsi, deps) = nutation_angles(jd_tt);
    let eps = mean_obliquity(jd_tt);
    let npb = nutation_matrix_from_angles(dpsi, deps, eps)
        * precession_matrix(jd_tt)
        * frame_bias_matrix();
    latlon_degrees(&(rotmt(-(eps + deps), Axis::X) * npb * v))
}

/// Galactic latitude and longitude, in degrees.
pub fn icrf_to_galactic(v: &Vector3<f64>) -> (Degree, Degree) {
    let g = Matrix3::from_row_slice(&GALACTIC_MATRIX.concat()) * v;
    latlon_degrees(&g)
}

/// Right ascension (hours, `[0, 24)`) and declination (degrees) of an equatorial vector.
pub fn radec(v: &Vector3<f64>) -> (f64, Degree) {
    let (dec, ra_deg) = latlon_degrees(v);
    (ra_deg / 15.0, dec)
}

/// Unit ICRF vector of a J2000 right ascension (hours) and declination (degrees).
pub fn radec_to_icrf(ra_hours: f64, dec_deg: Degree) -> Vector3<f64> {
    let ra = (ra_hours * 15.0).to_radians();
    let dec = dec_deg.to_radians();
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// True-of-date right ascension (hours) and declination (degrees) of an ICRF vector.
pub fn true_of_date_radec(v: &Vector3<f64>, jd_tt: JulianDate) -> (f64, Degree) {
    radec(&(icrs_to_true_of_date(jd_tt) * v))
}
