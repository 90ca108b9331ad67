//! Typed NAIF integer codes for the bodies a planetary/lunar kernel carries.
//!
//! Overview
//! -----------------
//! A DE-series kernel stores every body relative to a parent:
//!
//! ```text
//! 199 Mercury ─► 1 Mercury bary ─┐
//! 299 Venus   ─► 2 Venus bary   ─┤
//! 399 Earth ─┐                   │
//! 301 Moon  ─┴► 3 Earth-Moon bary├─► 0 Solar System Barycenter
//!  10 Sun ───────────────────────┤
//!   4..9 planetary barycenters ──┘
//! ```
//!
//! [`NaifIds`] is the closed set of these codes; unknown integers are rejected with
//! [`SkycheckError::UnsupportedBody`].
pub mod naif_type;

use std::fmt;

use crate::skycheck_errors::SkycheckError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlanetaryBary {
    Mercury = 1,
    Venus = 2,
    EarthMoon = 3,
    Mars = 4,
    Jupiter = 5,
    Saturn = 6,
    Uranus = 7,
    Neptune = 8,
    Pluto = 9,
}

impl PlanetaryBary {
    const ALL: [PlanetaryBary; 9] = [
        PlanetaryBary::Mercury,
        PlanetaryBary::Venus,
        PlanetaryBary::EarthMoon,
        PlanetaryBary::Mars,
        PlanetaryBary::Jupiter,
        PlanetaryBary::Saturn,
        PlanetaryBary::Uranus,
        PlanetaryBary::Neptune,
        PlanetaryBary::Pluto,
    ];

    fn name(&self) -> &'static str {
        match self {
            PlanetaryBary::Mercury => "Mercury Barycenter",
            PlanetaryBary::Venus => "Venus Barycenter",
            PlanetaryBary::EarthMoon => "Earth-Moon Barycenter",
            PlanetaryBary::Mars => "Mars Barycenter",
            PlanetaryBary::Jupiter => "Jupiter Barycenter",
            PlanetaryBary::Saturn => "Saturn Barycenter",
            PlanetaryBary::Uranus => "Uranus Barycenter",
            PlanetaryBary::Neptune => "Neptune Barycenter",
            PlanetaryBary::Pluto => "Pluto Barycenter",
        }
    }
}

/// Mass centers of the bodies that have their own segment in DE kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MassCenter {
    Mercury = 199,
    Venus = 299,
    Earth = 399,
    Moon = 301,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NaifIds {
    SolarSystemBarycenter,
    Sun,
    PB(PlanetaryBary),
    MC(MassCenter),
}

impl NaifIds {
    pub const SSB: NaifIds = NaifIds::SolarSystemBarycenter;
    pub const EARTH: NaifIds = NaifIds::MC(MassCenter::Earth);
    pub const MOON: NaifIds = NaifIds::MC(MassCenter::Moon);
    pub const EARTH_MOON_BARY: NaifIds = NaifIds::PB(PlanetaryBary::EarthMoon);

    pub fn from_id(id: i32) -> Result<Self, SkycheckError> {
        match id {
            0 => Ok(NaifIds::SolarSystemBarycenter),
            10 => Ok(NaifIds::Sun),
            1..=9 => PlanetaryBary::ALL
                .get((id - 1) as usize)
                .map(|pb| NaifIds::PB(*pb))
                .ok_or(SkycheckError::UnsupportedBody(id)),
            199 => Ok(NaifIds::MC(MassCenter::Mercury)),
            299 => Ok(NaifIds::MC(MassCenter::Venus)),
            399 => Ok(NaifIds::MC(MassCenter::Earth)),
            301 => Ok(NaifIds::MC(MassCenter::Moon)),
            _ => Err(SkycheckError::UnsupportedBody(id)),
        }
    }

    pub fn to_id(&self) -> i32 {
        match self {
            NaifIds::SolarSystemBarycenter => 0,
            NaifIds::Sun => 10,
            NaifIds::PB(pb) => *pb as i32,
            NaifIds::MC(mc) => *mc as i32,
        }
    }
}

impl From<NaifIds> for i32 {
    fn from(naif_id: NaifIds) -> Self {
        naif_id.to_id()
    }
}

impl TryFrom<i32> for NaifIds {
    type Error = SkycheckError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        NaifIds::from_id(id)
    }
}

impl fmt::Display for NaifIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaifIds::SolarSystemBarycenter => write!(f, "Solar System Barycenter"),
            NaifIds::Sun => write!(f, "Sun"),
            NaifIds::PB(pb) => write!(f, "{}", pb.name()),
            NaifIds::MC(MassCenter::Mercury) => write!(f, "Mercury"),
            NaifIds::MC(MassCenter::Venus) => write!(f, "Venus"),
            NaifIds::MC(MassCenter::Earth) => write!(f, "Earth"),
            NaifIds::MC(MassCenter::Moon) => write!(f, "Moon"),
        }
    }
}

#[cfg(test)]
mod test_naif_id {
    use super::*;

    #[test]
    fn test_naif_ids() {
        assert_eq!(NaifIds::from_id(0).unwrap(), NaifIds::SSB);
        assert_eq!(NaifIds::from_id(10).unwrap(), NaifIds::Sun);
        assert_eq!(
            NaifIds::from_id(5).unwrap(),
            NaifIds::PB(PlanetaryBary::Jupiter)
        );
        assert_eq!(NaifIds::from_id(301).unwrap(), NaifIds::MOON);
        assert_eq!(NaifIds::from_id(399).unwrap(), NaifIds::EARTH);
        assert_eq!(
            NaifIds::from_id(401),
            Err(SkycheckError::UnsupportedBody(401))
        );
        assert!(NaifIds::from_id(11).is_err());
        assert!(NaifIds::from_id(-3).is_err());
    }

    #[test]
    fn test_id_round_trip() {
        for id in [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 199, 299, 301, 399] {
            let naif = NaifIds::try_from(id).unwrap();
            assert_eq!(i32::from(naif), id);
        }
    }

    #[test]
    fn test_naif_ids_to_string() {
        assert_eq!(NaifIds::SSB.to_string(), "Solar System Barycenter");
        assert_eq!(NaifIds::EARTH_MOON_BARY.to_string(), "Earth-Moon Barycenter");
        assert_eq!(NaifIds::MOON.to_string(), "Moon");
    }
}
