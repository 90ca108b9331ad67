//! Chebyshev record evaluation for SPK Type 2 and Type 3 segments.
//!
//! A record is a run of `rsize` DP words:
//!
//! ```text
//! Type 2: mid, radius, X[n], Y[n], Z[n]
//! Type 3: mid, radius, X[n], Y[n], Z[n], VX[n], VY[n], VZ[n]
//! ```
//!
//! The normalized time is `t = (et - mid) / radius`, clamped to `[-1, 1]`. Position is the
//! Chebyshev sum of the position coefficients (km). Velocity (km/s) is either the sum of the
//! Type 3 velocity coefficients or the derivative of the position series scaled by
//! `1 / radius` for Type 2.
use nalgebra::Vector3;

use super::naif_ids::naif_type::SpkDataType;

/// Borrowed view over one record of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisRecord<'a> {
    /// Midpoint of the record span (TDB seconds past J2000).
    pub mid: f64,
    /// Half-width of the record span (seconds).
    pub radius: f64,
    coeffs: &'a [f64],
    n_coeffs: usize,
    data_type: SpkDataType,
}

impl<'a> EphemerisRecord<'a> {
    /// Wrap the `rsize` words of one record.
    ///
    /// Returns `None` when `words` is too short for `n_coeffs` coefficients.
    pub fn new(words: &'a [f64], n_coeffs: usize, data_type: SpkDataType) -> Option<Self> {
        let components = match data_type {
            SpkDataType::ChebyshevPositionOnly => 3,
            SpkDataType::ChebyshevPositionVelocity => 6,
        };
        if n_coeffs == 0 || words.len() < 2 + components * n_coeffs {
            return None;
        }
        Some(EphemerisRecord {
            mid: words[0],
            radius: words[1],
            coeffs: &words[2..2 + components * n_coeffs],
            n_coeffs,
            data_type,
        })
    }

    fn component(&self, k: usize) -> &'a [f64] {
        &self.coeffs[k * self.n_coeffs..(k + 1) * self.n_coeffs]
    }

    /// Interpolate position (km) and velocity (km/s) at `et_seconds`.
    pub fn interpolate(&self, et_seconds: f64) -> (Vector3<f64>, Vector3<f64>) {
        let t = ((et_seconds - self.mid) / self.radius).clamp(-1.0, 1.0);

        let position = Vector3::new(
            chebyshev_sum(self.component(0), t),
            chebyshev_sum(self.component(1), t),
            chebyshev_sum(self.component(2), t),
        );

        let velocity = match self.data_type {
            SpkDataType::ChebyshevPositionVelocity => Vector3::new(
                chebyshev_sum(self.component(3), t),
                chebyshev_sum(self.component(4), t),
                chebyshev_sum(self.component(5), t),
            ),
            SpkDataType::ChebyshevPositionOnly => {
                Vector3::new(
                    chebyshev_derivative(self.component(0), t),
                    chebyshev_derivative(self.component(1), t),
                    chebyshev_derivative(self.component(2), t),
                ) / self.radius
            }
        };

        (position, velocity)
    }
}

/// `Σ c_k T_k(t)` by Clenshaw's recurrence.
pub fn chebyshev_sum(coeffs: &[f64], t: f64) -> f64 {
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    for &c in coeffs.iter().skip(1).rev() {
        let b0 = 2.0 * t * b1 - b2 + c;
        b2 = b1;
        b1 = b0;
    }
    match coeffs.first() {
        Some(&c0) => t * b1 - b2 + c0,
        None => 0.0,
    }
}

/// `Σ c_k T'_k(t)`.
///
/// `T'_0 = 0`, `T'_1 = 1`, `T'_n = 2 t T'_{n-1} + 2 T_{n-1} - T'_{n-2}`.
pub fn chebyshev_derivative(coeffs: &[f64], t: f64) -> f64 {
    if coeffs.len() < 2 {
        return 0.0;
    }
    let (mut p_prev, mut p) = (1.0, t);
    let (mut d_prev, mut d) = (0.0, 1.0);
    let mut sum = coeffs[1];
    for &c in &coeffs[2..] {
        let p_next = 2.0 * t * p - p_prev;
        let d_next = 2.0 * t * d + 2.0 * p - d_prev;
        sum += c * d_next;
        (p_prev, p) = (p, p_next);
        (d_prev, d) = (d, d_next);
    }
    sum
}

#[cfg(test)]
mod test_ephemeris_record {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_chebyshev_sum_matches_closed_form() {
        // T0 + 2 T1 + 3 T2 = 1 + 2t + 3(2t² - 1)
        let coeffs = [1.0, 2.0, 3.0];
        for t in [-1.0, -0.3, 0.0, 0.7, 1.0] {
            let expected = 1.0 + 2.0 * t + 3.0 * (2.0 * t * t - 1.0);
            assert_relative_eq!(chebyshev_sum(&coeffs, t), expected, epsilon = 1e-14);
        }
        assert_eq!(chebyshev_sum(&[], 0.5), 0.0);
        assert_eq!(chebyshev_sum(&[4.0], 0.5), 4.0);
    }

    #[test]
    fn test_chebyshev_derivative_matches_closed_form() {
        // d/dt [T1 + T2 + T3] = 1 + 4t + (12t² - 3)
        let coeffs = [7.0, 1.0, 1.0, 1.0];
        for t in [-0.9, 0.0, 0.4] {
            let expected = 1.0 + 4.0 * t + 12.0 * t * t - 3.0;
            assert_relative_eq!(chebyshev_derivative(&coeffs, t), expected, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_type2_record_interpolation() {
        // x = 100 + 10 t, y = 5 t², z = -3
        let words = [
            1000.0, 50.0, // mid, radius
            100.0, 10.0, 0.0, // X
            2.5, 0.0, 2.5, // Y: 2.5 T0 + 2.5 T2 = 5 t²
            -3.0, 0.0, 0.0, // Z
        ];
        let record = EphemerisRecord::new(&words, 3, SpkDataType::ChebyshevPositionOnly).unwrap();
        let (pos, vel) = record.interpolate(1025.0);
        assert_relative_eq!(pos.x, 105.0, epsilon = 1e-12);
        assert_relative_eq!(pos.y, 1.25, epsilon = 1e-12);
        assert_relative_eq!(pos.z, -3.0, epsilon = 1e-12);
        assert_relative_eq!(vel.x, 10.0 / 50.0, epsilon = 1e-14);
        assert_relative_eq!(vel.y, 5.0 / 50.0, epsilon = 1e-14);
        assert_relative_eq!(vel.z, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_type3_record_uses_velocity_coefficients() {
        let words = [
            0.0, 10.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.5, 0.0, 0.25, 0.0, 0.125, 0.0,
        ];
        let record =
            EphemerisRecord::new(&words, 2, SpkDataType::ChebyshevPositionVelocity).unwrap();
        let (pos, vel) = record.interpolate(3.0);
        assert_eq!(pos, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(vel, Vector3::new(0.5, 0.25, 0.125));
        assert!(EphemerisRecord::new(&words[..10], 2, SpkDataType::ChebyshevPositionVelocity)
            .is_none());
    }
}
