#![allow(dead_code)]

use std::{f64::consts::PI, sync::Arc};

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use skycheck::{
    config::SkycheckConfig,
    constants::{JulianDate, AU, J2000_JD, SECONDS_PER_DAY},
    jpl_ephem::{
        naif::naif_ids::{MassCenter, PlanetaryBary},
        EphemerisSource, NaifIds,
    },
    ref_system::{OBLIQUITY_J2000_COS, OBLIQUITY_J2000_SIN},
    state_vector::StateVector,
    Skycheck, SkycheckError,
};

/// Earth/Moon mass ratio.
const EARTH_MOON_RATIO: f64 = 81.300_56;

/// A circular orbit in the J2000 ecliptic plane.
#[derive(Debug, Clone, Copy)]
pub struct CircularOrbit {
    pub radius_km: f64,
    pub period_days: f64,
    /// Ecliptic longitude at J2000, degrees.
    pub longitude_j2000: f64,
}

impl CircularOrbit {
    const fn au(radius_au: f64, period_days: f64, longitude_j2000: f64) -> Self {
        CircularOrbit {
            radius_km: radius_au * AU,
            period_days,
            longitude_j2000,
        }
    }

    /// ICRF state (km, km/day) relative to the orbit centre.
    pub fn state(&self, jd_tdb: JulianDate) -> StateVector {
        let n = 2.0 * PI / self.period_days;
        let angle = self.longitude_j2000.to_radians() + n * (jd_tdb - J2000_JD);
        let (s, c) = angle.sin_cos();
        let position = Vector3::new(c, s, 0.0) * self.radius_km;
        let velocity = Vector3::new(-s, c, 0.0) * self.radius_km * n;
        StateVector::new(ecliptic_to_icrf(&position), ecliptic_to_icrf(&velocity))
    }
}

/// Rotate a J2000 ecliptic vector into the ICRF.
pub fn ecliptic_to_icrf(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        v.x,
        v.y * OBLIQUITY_J2000_COS - v.z * OBLIQUITY_J2000_SIN,
        v.y * OBLIQUITY_J2000_SIN + v.z * OBLIQUITY_J2000_COS,
    )
}

pub const EMB_ORBIT: CircularOrbit = CircularOrbit::au(1.0, 365.256_363, 100.464);
pub const MOON_ORBIT: CircularOrbit = CircularOrbit {
    radius_km: 384_400.0,
    period_days: 27.321_661,
    longitude_j2000: 218.316,
};

fn planet_orbit(pb: PlanetaryBary) -> CircularOrbit {
    match pb {
        PlanetaryBary::Mercury => CircularOrbit::au(0.387_098, 87.969_1, 252.251),
        PlanetaryBary::Venus => CircularOrbit::au(0.723_332, 224.701, 181.980),
        PlanetaryBary::EarthMoon => EMB_ORBIT,
        PlanetaryBary::Mars => CircularOrbit::au(1.523_679, 686.980, 355.433),
        PlanetaryBary::Jupiter => CircularOrbit::au(5.204_4, 4_332.59, 34.351),
        PlanetaryBary::Saturn => CircularOrbit::au(9.582_6, 10_759.22, 50.077),
        PlanetaryBary::Uranus => CircularOrbit::au(19.218_4, 30_688.5, 314.055),
        PlanetaryBary::Neptune => CircularOrbit::au(30.110, 60_182.0, 304.349),
        PlanetaryBary::Pluto => CircularOrbit::au(39.482, 90_560.0, 238.929),
    }
}

/// Solar system of circular, coplanar orbits around a Sun fixed at the barycentre.
///
/// Good enough to exercise every code path with realistic geometry (one season per
/// quarter year, a synodic month of ~29.5 days, ...), and exact, so kernels built from it
/// can be checked against it.
#[derive(Debug, Clone)]
pub struct AnalyticEphemeris {
    coverage: (JulianDate, JulianDate),
    missing: Vec<NaifIds>,
}

impl AnalyticEphemeris {
    /// 1900-01-01 .. 2100-01-01.
    pub fn new() -> Self {
        AnalyticEphemeris::with_coverage(2_415_020.5, 2_488_069.5)
    }

    pub fn with_coverage(start: JulianDate, end: JulianDate) -> Self {
        AnalyticEphemeris {
            coverage: (start, end),
            missing: Vec::new(),
        }
    }

    /// Pretend `body` has no segment.
    pub fn without(mut self, body: NaifIds) -> Self {
        self.missing.push(body);
        self
    }

    fn moon_wrt_emb(&self, jd_tdb: JulianDate) -> StateVector {
        MOON_ORBIT.state(jd_tdb)
    }

    /// Exact state of `body`, ignoring coverage.
    pub fn exact(&self, body: NaifIds, jd_tdb: JulianDate) -> StateVector {
        let emb = EMB_ORBIT.state(jd_tdb);
        let moon = self.moon_wrt_emb(jd_tdb);
        match body {
            NaifIds::SolarSystemBarycenter | NaifIds::Sun => StateVector::zeros(),
            NaifIds::PB(pb) => planet_orbit(pb).state(jd_tdb),
            NaifIds::MC(MassCenter::Mercury) => planet_orbit(PlanetaryBary::Mercury).state(jd_tdb),
            NaifIds::MC(MassCenter::Venus) => planet_orbit(PlanetaryBary::Venus).state(jd_tdb),
            NaifIds::MC(MassCenter::Earth) => emb - moon / (1.0 + EARTH_MOON_RATIO),
            NaifIds::MC(MassCenter::Moon) => {
                emb + moon / ((1.0 + EARTH_MOON_RATIO) / EARTH_MOON_RATIO)
            }
        }
    }
}

impl EphemerisSource for AnalyticEphemeris {
    fn state(&self, body: NaifIds, jd_tdb: JulianDate) -> Result<StateVector, SkycheckError> {
        if self.missing.contains(&body) {
            return Err(SkycheckError::UnsupportedBody(body.to_id()));
        }
        self.check_coverage(jd_tdb)?;
        Ok(self.exact(body, jd_tdb))
    }

    fn coverage(&self) -> (JulianDate, JulianDate) {
        self.coverage
    }

    fn supports(&self, body: NaifIds) -> bool {
        !self.missing.contains(&body)
    }
}

/// A context over the analytic ephemeris.
pub fn analytic_context(config: SkycheckConfig) -> Skycheck {
    Skycheck::new(Arc::new(AnalyticEphemeris::new()), config)
}

// -------------------------------------------------------------------------------------
// Synthetic SPK kernels
// -------------------------------------------------------------------------------------

const RECORD_BYTES: usize = 1024;
const DATA_RECORD: usize = 4;

/// One Type 2 segment to synthesize.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub target: i32,
    pub center: i32,
    pub start_jd: JulianDate,
    pub end_jd: JulianDate,
    pub record_days: f64,
    pub n_coeffs: usize,
}

impl SegmentSpec {
    pub fn new(target: i32, center: i32, start_jd: JulianDate, end_jd: JulianDate) -> Self {
        SegmentSpec {
            target,
            center,
            start_jd,
            end_jd,
            record_days: 8.0,
            n_coeffs: 13,
        }
    }
}

/// Chebyshev coefficients of `f` on `[-1, 1]` from its values at the `n` Chebyshev nodes.
fn chebyshev_fit(f: impl Fn(f64) -> f64, n: usize) -> Vec<f64> {
    let nodes: Vec<f64> = (0..n)
        .map(|k| (PI * (k as f64 + 0.5) / n as f64).cos())
        .collect();
    let values: Vec<f64> = nodes.iter().map(|&x| f(x)).collect();
    (0..n)
        .map(|j| {
            let sum: f64 = (0..n)
                .map(|k| values[k] * (PI * j as f64 * (k as f64 + 0.5) / n as f64).cos())
                .sum();
            let c = 2.0 * sum / n as f64;
            if j == 0 {
                c / 2.0
            } else {
                c
            }
        })
        .collect()
}

fn segment_words(ephem: &AnalyticEphemeris, spec: &SegmentSpec) -> Vec<f64> {
    let target = NaifIds::from_id(spec.target).expect("known target");
    let center = NaifIds::from_id(spec.center).expect("known center");
    let init = (spec.start_jd - J2000_JD) * SECONDS_PER_DAY;
    let intlen = spec.record_days * SECONDS_PER_DAY;
    let n_records = ((spec.end_jd - spec.start_jd) / spec.record_days).ceil() as usize;
    let rsize = 2 + 3 * spec.n_coeffs;

    let mut words = Vec::with_capacity(n_records * rsize + 4);
    for r in 0..n_records {
        let mid = init + (r as f64 + 0.5) * intlen;
        let radius = 0.5 * intlen;
        words.push(mid);
        words.push(radius);
        for axis in 0..3 {
            let coeffs = chebyshev_fit(
                |x| {
                    let jd = J2000_JD + (mid + x * radius) / SECONDS_PER_DAY;
                    let rel = ephem.exact(target, jd) - ephem.exact(center, jd);
                    rel.position[axis]
                },
                spec.n_coeffs,
            );
            words.extend(coeffs);
        }
    }
    words.extend([init, intlen, rsize as f64, n_records as f64]);
    words
}

/// Bytes of a little-endian DAF/SPK kernel holding `segments`, fitted on `ephem`.
///
/// Layout: file record, one summary record, one name record, then the segment words.
pub fn spk_bytes(ephem: &AnalyticEphemeris, segments: &[SegmentSpec]) -> Vec<u8> {
    assert!(segments.len() <= 25, "one summary record holds 25 SPK summaries");

    let mut data: Vec<f64> = Vec::new();
    let mut summaries = Vec::new();
    for spec in segments {
        let words = segment_words(ephem, spec);
        let initial = (DATA_RECORD - 1) * RECORD_BYTES / 8 + data.len() + 1;
        let final_addr = initial + words.len() - 1;
        let n_records = words[words.len() - 1];
        let init = words[words.len() - 4];
        let intlen = words[words.len() - 3];
        summaries.push((
            init,
            init + n_records * intlen,
            [
                spec.target,
                spec.center,
                1,
                2,
                initial as i32,
                final_addr as i32,
            ],
        ));
        data.extend(words);
    }
    let free = (DATA_RECORD - 1) * RECORD_BYTES / 8 + data.len() + 1;

    let mut file = vec![0u8; (DATA_RECORD - 1) * RECORD_BYTES];
    file[0..8].copy_from_slice(b"DAF/SPK ");
    file[8..12].copy_from_slice(&2i32.to_le_bytes());
    file[12..16].copy_from_slice(&6i32.to_le_bytes());
    file[16..76].copy_from_slice(&[b' '; 60]);
    file[16..30].copy_from_slice(b"SKYCHECK TESTS");
    file[76..80].copy_from_slice(&2i32.to_le_bytes());
    file[80..84].copy_from_slice(&2i32.to_le_bytes());
    file[84..88].copy_from_slice(&(free as i32).to_le_bytes());
    file[88..96].copy_from_slice(b"LTL-IEEE");

    let mut offset = RECORD_BYTES;
    for control in [0.0f64, 0.0, summaries.len() as f64] {
        file[offset..offset + 8].copy_from_slice(&control.to_le_bytes());
        offset += 8;
    }
    for (start, end, ints) in &summaries {
        file[offset..offset + 8].copy_from_slice(&start.to_le_bytes());
        file[offset + 8..offset + 16].copy_from_slice(&end.to_le_bytes());
        offset += 16;
        for v in ints {
            file[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
            offset += 4;
        }
    }
    file[2 * RECORD_BYTES..3 * RECORD_BYTES].fill(b' ');

    for w in data {
        file.extend_from_slice(&w.to_le_bytes());
    }
    let padding = (RECORD_BYTES - file.len() % RECORD_BYTES) % RECORD_BYTES;
    file.extend(std::iter::repeat(0u8).take(padding));
    file
}

/// The segments of a DE-like kernel: planets around the barycentre, Earth and Moon
/// around the Earth-Moon barycentre, Mercury and Venus around their barycentres.
pub fn de_like_segments(start_jd: JulianDate, end_jd: JulianDate) -> Vec<SegmentSpec> {
    let mut segments: Vec<SegmentSpec> = (1..=9)
        .map(|pb| SegmentSpec::new(pb, 0, start_jd, end_jd))
        .collect();
    segments.push(SegmentSpec::new(10, 0, start_jd, end_jd));
    segments.push(SegmentSpec::new(199, 1, start_jd, end_jd));
    segments.push(SegmentSpec::new(299, 2, start_jd, end_jd));
    segments.push(SegmentSpec::new(301, 3, start_jd, end_jd));
    segments.push(SegmentSpec::new(399, 3, start_jd, end_jd));
    segments
}

pub fn assert_state_close(actual: &StateVector, expected: &StateVector, km: f64, km_per_day: f64) {
    for k in 0..3 {
        assert_abs_diff_eq!(actual.position[k], expected.position[k], epsilon = km);
    }
    if let (Some(a), Some(e)) = (actual.velocity, expected.velocity) {
        for k in 0..3 {
            assert_abs_diff_eq!(a[k], e[k], epsilon = km_per_day);
        }
    }
}
