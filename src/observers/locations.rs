//! Named ground sites and the capability trait that lets configuration add more.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::GeodeticLocation;
use crate::{constants::Degree, skycheck_errors::SkycheckError};

/// Anything that resolves to a labelled geodetic site.
pub trait Site {
    fn label(&self) -> &str;
    fn latitude(&self) -> Degree;
    fn longitude(&self) -> Degree;

    fn geodetic(&self) -> Result<GeodeticLocation, SkycheckError> {
        GeodeticLocation::new(self.label(), self.latitude(), self.longitude())
    }
}

/// The six sites of the reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    NullIsland,
    Chicago,
    London,
    Cushing,
    NewYork,
    Mumbai,
}

impl Location {
    pub const ALL: [Location; 6] = [
        Location::NullIsland,
        Location::Chicago,
        Location::London,
        Location::Cushing,
        Location::NewYork,
        Location::Mumbai,
    ];

    // (label, latitude, longitude)
    fn row(&self) -> (&'static str, Degree, Degree) {
        match self {
            Location::NullIsland => ("loc_ni", 0.0, 0.0),
            Location::Chicago => ("loc_chicago", 41.8674558, -87.6483924),
            Location::London => ("loc_london", 51.5150534, -0.1016089),
            Location::Cushing => ("loc_cushing", 35.9859634, -96.7954485),
            Location::NewYork => ("loc_ny", 40.714469, -74.0194683),
            Location::Mumbai => ("loc_mumbai", 19.0602766, 72.8577106),
        }
    }
}

impl Site for Location {
    fn label(&self) -> &str {
        self.row().0
    }

    fn latitude(&self) -> Degree {
        self.row().1
    }

    fn longitude(&self) -> Degree {
        self.row().2
    }
}

impl Site for GeodeticLocation {
    fn label(&self) -> &str {
        GeodeticLocation::label(self)
    }

    fn latitude(&self) -> Degree {
        GeodeticLocation::latitude(self)
    }

    fn longitude(&self) -> Degree {
        GeodeticLocation::longitude(self)
    }

    fn geodetic(&self) -> Result<GeodeticLocation, SkycheckError> {
        Ok(self.clone())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Location {
    type Err = SkycheckError;

    /// Accepts the column label (`loc_london`) or the bare site name (`london`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase();
        Location::ALL
            .into_iter()
            .find(|loc| loc.label() == key || loc.label().trim_start_matches("loc_") == key)
            .ok_or_else(|| SkycheckError::InvalidConfig(format!("unknown location '{s}'")))
    }
}

#[cfg(test)]
mod locations_test {
    use super::*;

    #[test]
    fn test_labels_and_lookup() {
        let labels: Vec<&str> = Location::ALL.iter().map(|l| l.label()).collect();
        assert_eq!(
            labels,
            ["loc_ni", "loc_chicago", "loc_london", "loc_cushing", "loc_ny", "loc_mumbai"]
        );
        assert_eq!("loc_ny".parse::<Location>().unwrap(), Location::NewYork);
        assert_eq!("Mumbai".parse::<Location>().unwrap(), Location::Mumbai);
        assert!("paris".parse::<Location>().is_err());
    }

    #[test]
    fn test_site_to_geodetic() {
        let london = Location::London.geodetic().unwrap();
        assert_eq!(london.label(), "loc_london");
        assert_eq!(london.latitude(), 51.5150534);
        assert_eq!(london.geodetic().unwrap(), london);
    }
}
