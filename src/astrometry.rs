//! # Light-time & apparent positions
//!
//! Positions of a [`Target`] as seen by an [`Observer`] at an [`Instant`]:
//!
//! * **astrometric**: the target is evaluated at the retarded time `t − τ`, where the
//!   light-time τ solves `τ = |target(t − τ) − observer(t)| / c` by fixed-point iteration
//!   (at most 10 passes, stop when `|Δτ| < 1e-12 day`);
//! * **apparent**: astrometric, then bent by the gravity of the Sun, Jupiter and Saturn
//!   (each deflector taken at the epoch the ray passes closest to it), then displaced by
//!   the special-relativistic aberration of the observer's barycentric velocity.
//!
//! All vectors are ICRF, km. Ecliptic coordinates are taken on the J2000 mean ecliptic.
use nalgebra::Vector3;

use crate::{
    bodies::{Body, Target},
    constants::{Degree, JulianDate, GM_SUN, VLIGHT_KM_DAY, VLIGHT_M},
    jpl_ephem::EphemerisSource,
    observers::Observer,
    ref_system::icrf_to_ecliptic,
    skycheck_errors::SkycheckError,
    time::Instant,
};

const MAX_LIGHT_TIME_ITERATIONS: usize = 10;
const LIGHT_TIME_TOLERANCE: f64 = 1e-12;

/// Gravitational deflectors as `(body, Sun mass / body mass)`.
pub const DEFLECTORS: [(Body, f64); 3] = [
    (Body::Sun, 1.0),
    (Body::Jupiter, 1047.3486),
    (Body::Saturn, 3497.898),
];

/// Observer → target vector corrected for light-time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Astrometric {
    /// ICRF position, km.
    pub position: Vector3<f64>,
    /// One-way light-time, days.
    pub light_time: f64,
    /// Barycentric observer position at the observation time, km.
    pub observer_position: Vector3<f64>,
    /// Barycentric observer velocity, km/day.
    pub observer_velocity: Vector3<f64>,
}

impl Astrometric {
    pub fn distance(&self) -> f64 {
        self.position.norm()
    }

    /// Ecliptic latitude and longitude, degrees.
    pub fn ecliptic_latlon(&self) -> (Degree, Degree) {
        icrf_to_ecliptic(&self.position)
    }
}

/// Solve the light-time equation for a fixed observer position.
///
/// Arguments
/// -----------------
/// * `target`: the observed object.
/// * `ephem`: ephemeris used to evaluate `target` at the retarded epochs.
/// * `observer_pos`: barycentric observer position at `jd_tdb`, km.
/// * `jd_tdb`: observation epoch, TDB.
///
/// Return
/// ----------
/// * `(observer → target vector, light-time in days)`.
pub fn light_time_solve(
    target: &dyn Target,
    ephem: &dyn EphemerisSource,
    observer_pos: &Vector3<f64>,
    jd_tdb: JulianDate,
) -> Result<(Vector3<f64>, f64), SkycheckError> {
    let mut position = target.barycentric_state(ephem, jd_tdb)?.position - observer_pos;
    let mut light_time = 0.0;

    for _ in 0..MAX_LIGHT_TIME_ITERATIONS {
        let next = position.norm() / VLIGHT_KM_DAY;
        if (next - light_time).abs() < LIGHT_TIME_TOLERANCE {
            break;
        }
        light_time = next;
        position = target.barycentric_state(ephem, jd_tdb - light_time)?.position - observer_pos;
    }
    Ok((position, light_time))
}

/// Light-time corrected position of `target` seen by `observer`.
pub fn astrometric(
    target: &dyn Target,
    observer: &Observer,
    ephem: &dyn EphemerisSource,
    instant: &Instant,
) -> Result<Astrometric, SkycheckError> {
    let obs = observer.state(ephem, instant)?;
    let (position, light_time) = light_time_solve(target, ephem, &obs.position, instant.tdb())?;
    Ok(Astrometric {
        position,
        light_time,
        observer_position: obs.position,
        observer_velocity: obs.velocity_or_zero(),
    })
}

/// Light deflection of `position` by a body at `pe` from the observer.
///
/// Arguments
/// -----------------
/// * `position`: observer → target, km.
/// * `pe`: deflector → observer, km.
/// * `rmass`: Sun mass over deflector mass.
///
/// Return
/// ----------
/// * The correction to add to `position`, km. Zero for degenerate geometry or when the
///   target lies exactly behind/in front of the deflector.
pub fn deflection(position: &Vector3<f64>, pe: &Vector3<f64>, rmass: f64) -> Vector3<f64> {
    let pq = position + pe;
    let (pmag, qmag, emag) = (position.norm(), pq.norm(), pe.norm());
    if pmag == 0.0 || qmag == 0.0 || emag == 0.0 {
        return Vector3::zeros();
    }

    let phat = position / pmag;
    let qhat = pq / qmag;
    let ehat = pe / emag;

    let pdotq = phat.dot(&qhat);
    let qdote = qhat.dot(&ehat);
    let edotp = ehat.dot(&phat);
    if edotp.abs() > 0.99999999999 {
        return Vector3::zeros();
    }

    let fac1 = 2.0 * GM_SUN / (VLIGHT_M * VLIGHT_M * emag * 1000.0 * rmass);
    let fac2 = 1.0 + qdote;
    (ehat * pdotq - qhat * edotp) * (fac1 / fac2 * pmag)
}

/// Relativistic aberration of `position` for an observer moving at `velocity` (km/day).
pub fn aberration(position: &Vector3<f64>, velocity: &Vector3<f64>, light_time: f64) -> Vector3<f64> {
    let p1mag = light_time * VLIGHT_KM_DAY;
    let vemag = velocity.norm();
    if p1mag == 0.0 || vemag == 0.0 {
        return *position;
    }

    let beta = vemag / VLIGHT_KM_DAY;
    let cosd = position.dot(velocity) / (p1mag * vemag);
    let gammai = (1.0 - beta * beta).sqrt();
    let p = beta * cosd;
    let q = (1.0 + p / (1.0 + gammai)) * light_time;
    let r = 1.0 + p;
    (position * gammai + velocity * q) / r
}

/// Apparent position: astrometric + light deflection + aberration.
pub fn apparent(
    target: &dyn Target,
    observer: &Observer,
    ephem: &dyn EphemerisSource,
    instant: &Instant,
) -> Result<Astrometric, SkycheckError> {
    let astro = astrometric(target, observer, ephem, instant)?;
    let jd_tdb = instant.tdb();
    let mut position = astro.position;
    let pmag = position.norm();

    for (body, rmass) in DEFLECTORS {
        if body.label() == target.label() {
            continue;
        }
        let gpv = body.barycentric_state(ephem, jd_tdb)?.position - astro.observer_position;
        let dlt = if pmag > 0.0 {
            position.dot(&gpv) / (VLIGHT_KM_DAY * pmag)
        } else {
            0.0
        };
        // closest approach of the ray, never earlier than emission
        let t_close = jd_tdb - dlt.max(0.0).min(astro.light_time);
        let pe = astro.observer_position - body.barycentric_state(ephem, t_close)?.position;
        position += deflection(&position, &pe, rmass);
    }

    Ok(Astrometric {
        position: aberration(&position, &astro.observer_velocity, astro.light_time),
        ..astro
    })
}
