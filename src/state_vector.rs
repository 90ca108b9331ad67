//! Cartesian state vectors returned by the ephemeris service.
//!
//! Overview
//! -----------------
//! `StateVector` is the unit of exchange between the kernel reader, the observers and the
//! astrometry routines. It always carries a **position** and may carry a **velocity**.
//!
//! Units
//! -----------------
//! * `position`: kilometers (km), ICRF axes.
//! * `velocity`: kilometers per day (km/day).
//!
//! Arithmetic semantics
//! -----------------
//! Addition/subtraction are component-wise. The velocity propagates **only when present on
//! both operands**; otherwise it is dropped, so a position-only offset never produces a
//! half-defined state. Composition commutes with time: the state of `A + B` at `t` is
//! `A(t) + B(t)`, which is how observers are built (`earth + topocentric offset`).
use std::ops::{Add, Div, Neg, Sub};

use nalgebra::Vector3;

use crate::constants::{Kilometer, AU, SECONDS_PER_DAY};

/// Position and optional velocity of a body or observer, in km and km/day.
///
/// See also
/// -----------------
/// * [`crate::jpl_ephem::EphemerisSource::state`] – barycentric states from a kernel.
/// * [`crate::observers::Observer::state`] – observer states built by composition.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Option<Vector3<f64>>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector {
            position,
            velocity: Some(velocity),
        }
    }

    pub fn from_position(position: Vector3<f64>) -> Self {
        StateVector {
            position,
            velocity: None,
        }
    }

    pub fn zeros() -> Self {
        StateVector::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Distance from the origin of the frame, in km.
    pub fn distance(&self) -> Kilometer {
        self.position.norm()
    }

    /// Velocity or the zero vector when the state is position-only.
    pub fn velocity_or_zero(&self) -> Vector3<f64> {
        self.velocity.unwrap_or_else(Vector3::zeros)
    }

    /// Velocity converted to km/s.
    pub fn velocity_km_s(&self) -> Option<Vector3<f64>> {
        self.velocity.map(|v| v / SECONDS_PER_DAY)
    }

    /// Same state expressed in AU and AU/day.
    #[must_use = "`.to_au()` returns a new StateVector; assign or use it"]
    pub fn to_au(&self) -> Self {
        *self / AU
    }
}

impl Add for StateVector {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        StateVector {
            position: self.position + other.position,
            velocity: match (self.velocity, other.velocity) {
                (Some(v1), Some(v2)) => Some(v1 + v2),
                _ => None,
            },
        }
    }
}

impl Sub for StateVector {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self + (-other)
    }
}

impl Neg for StateVector {
    type Output = Self;

    fn neg(self) -> Self::Output {
        StateVector {
            position: -self.position,
            velocity: self.velocity.map(|v| -v),
        }
    }
}

impl Div<f64> for StateVector {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        StateVector {
            position: self.position / rhs,
            velocity: self.velocity.map(|v| v / rhs),
        }
    }
}
