use std::{convert::TryFrom, fmt};

use crate::skycheck_errors::SkycheckError;

/// SPK segment data types understood by the kernel reader.
///
/// Only the two Chebyshev representations used by the DE planetary kernels are supported;
/// every other type code is rejected at load time with [`SkycheckError::UnsupportedSpkType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SpkDataType {
    /// Type 2: position coefficients, velocity from the derivative of the series.
    ChebyshevPositionOnly = 2,
    /// Type 3: separate position and velocity coefficients.
    ChebyshevPositionVelocity = 3,
}

impl SpkDataType {
    pub fn from_i32(value: i32) -> Result<Self, SkycheckError> {
        SpkDataType::try_from(value)
    }

    /// Number of Chebyshev coefficients per component for a record of `rsize` words.
    pub fn n_coeffs(self, rsize: usize) -> usize {
        match self {
            SpkDataType::ChebyshevPositionOnly => rsize.saturating_sub(2) / 3,
            SpkDataType::ChebyshevPositionVelocity => rsize.saturating_sub(2) / 6,
        }
    }
}

impl From<SpkDataType> for i32 {
    fn from(data_type: SpkDataType) -> Self {
        data_type as i32
    }
}

impl TryFrom<i32> for SpkDataType {
    type Error = SkycheckError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(SpkDataType::ChebyshevPositionOnly),
            3 => Ok(SpkDataType::ChebyshevPositionVelocity),
            _ => Err(SkycheckError::UnsupportedSpkType(value)),
        }
    }
}

impl fmt::Display for SpkDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpkDataType::ChebyshevPositionOnly => "Chebyshev Position Only",
            SpkDataType::ChebyshevPositionVelocity => "Chebyshev Position Velocity",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod test_spk_type {
    use super::*;

    #[test]
    fn test_from() {
        assert_eq!(
            SpkDataType::from_i32(2),
            Ok(SpkDataType::ChebyshevPositionOnly)
        );
        assert_eq!(
            SpkDataType::from_i32(3),
            Ok(SpkDataType::ChebyshevPositionVelocity)
        );
        assert_eq!(
            SpkDataType::from_i32(21),
            Err(SkycheckError::UnsupportedSpkType(21))
        );
    }

    #[test]
    fn test_coefficient_count() {
        // DE440 Earth-Moon barycenter: 13 coefficients per axis
        assert_eq!(SpkDataType::ChebyshevPositionOnly.n_coeffs(41), 13);
        assert_eq!(SpkDataType::ChebyshevPositionVelocity.n_coeffs(80), 13);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(
            SpkDataType::ChebyshevPositionOnly.to_string(),
            "Chebyshev Position Only"
        );
        let type_id: i32 = SpkDataType::ChebyshevPositionVelocity.into();
        assert_eq!(type_id, 3);
    }
}
