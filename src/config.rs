//! TOML configuration.
//!
//! Every section is optional; a missing section takes the reference-dataset defaults.
//!
//! ```toml
//! bodies = ["sun", "moon", "mars"]
//! galactic_center = true
//! positions = false
//!
//! [grid]
//! reference = "2025-01-01"
//! years_range = 200
//! step_days = 30.0
//! earliest = "1850-01-01"
//! latest = "2149-12-31"
//!
//! [time]
//! table_policy = "clamp"
//!
//! [[locations]]
//! label = "loc_paris"
//! latitude = 48.8566
//! longitude = 2.3522
//!
//! [tolerances.planets]
//! bound = 1e-6
//! statistic = "max"
//! ```
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    bodies::Body,
    golden::GridConfig,
    harness::Tolerances,
    observers::{GeodeticLocation, Location, Site},
    skycheck_errors::SkycheckError,
    time::TablePolicy,
};

/// `[time]` section.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    pub table_policy: TablePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkycheckConfig {
    pub grid: GridConfig,
    pub time: TimeConfig,
    /// Bodies of the wide table, in column order.
    pub bodies: Vec<Body>,
    /// Emit the `gc_*` columns.
    pub galactic_center: bool,
    /// Emit `<body>_{x,y,z}_km` columns next to the ecliptic ones.
    pub positions: bool,
    pub locations: Vec<GeodeticLocation>,
    pub tolerances: Tolerances,
}

impl Default for SkycheckConfig {
    fn default() -> Self {
        SkycheckConfig {
            grid: GridConfig::default(),
            time: TimeConfig::default(),
            bodies: Body::GOLDEN.to_vec(),
            galactic_center: true,
            positions: false,
            locations: Location::ALL
                .iter()
                .filter_map(|loc| loc.geodetic().ok())
                .collect(),
            tolerances: Tolerances::default(),
        }
    }
}

impl SkycheckConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, SkycheckError> {
        let config: SkycheckConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Utf8Path) -> Result<Self, SkycheckError> {
        let src = std::fs::read_to_string(path)?;
        debug!(%path, "configuration loaded");
        SkycheckConfig::from_toml_str(&src)
    }

    fn validate(&self) -> Result<(), SkycheckError> {
        if !(self.grid.step_days > 0.0) {
            return Err(SkycheckError::InvalidStep(self.grid.step_days));
        }
        if self.grid.chunk_size == 0 {
            return Err(SkycheckError::InvalidConfig("grid.chunk_size must be positive".into()));
        }
        if self.grid.earliest > self.grid.latest {
            return Err(SkycheckError::InvalidConfig(format!(
                "grid.earliest {} is after grid.latest {}",
                self.grid.earliest, self.grid.latest
            )));
        }
        let mut labels: Vec<&str> = self.locations.iter().map(|l| l.label()).collect();
        labels.sort_unstable();
        if let Some(dup) = labels.windows(2).find(|w| w[0] == w[1]) {
            return Err(SkycheckError::InvalidConfig(format!(
                "location '{}' is listed twice",
                dup[0]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod config_test {
    use super::*;
    use crate::harness::{Category, Statistic};

    #[test]
    fn test_default_matches_reference_dataset() {
        let config = SkycheckConfig::default();
        assert_eq!(config.bodies.len(), 10);
        assert_eq!(config.locations.len(), 6);
        assert_eq!(config.locations[1].label(), "loc_chicago");
        assert!(config.galactic_center);
        assert_eq!(config.grid.step_days, 30.0);
        assert_eq!(config.time.table_policy, TablePolicy::Clamp);
        assert_eq!(
            config.tolerances.get(Category::Positions).map(|t| t.bound),
            Some(1.0)
        );
    }

    #[test]
    fn test_partial_toml() {
        let src = r#"
            bodies = ["sun", "mars"]

            [grid]
            step_days = 10.0
            reference = "2000-01-01"

            [time]
            table_policy = "strict"

            [[locations]]
            label = "loc_paris"
            latitude = 48.8566
            longitude = 2.3522

            [tolerances.planets]
            bound = 1e-3
            statistic = "median"
        "#;
        let config = SkycheckConfig::from_toml_str(src).unwrap();
        assert_eq!(config.bodies, vec![Body::Sun, Body::Mars]);
        assert_eq!(config.grid.step_days, 10.0);
        assert_eq!(config.grid.years_range, 200);
        assert_eq!(config.time.table_policy, TablePolicy::Strict);
        assert_eq!(config.locations.len(), 1);
        let planets = config.tolerances.get(Category::Planets).unwrap();
        assert_eq!(planets.bound, 1e-3);
        assert_eq!(planets.statistic, Statistic::Median);
        assert!(config.tolerances.get(Category::Locations).is_none());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            SkycheckConfig::from_toml_str("[grid]\nstep_days = 0.0\n"),
            Err(SkycheckError::InvalidStep(_))
        ));
        assert!(matches!(
            SkycheckConfig::from_toml_str("unknown_key = 1\n"),
            Err(SkycheckError::TomlError(_))
        ));
        let dup = r#"
            [[locations]]
            label = "x"
            latitude = 0.0
            longitude = 0.0
            [[locations]]
            label = "x"
            latitude = 1.0
            longitude = 1.0
        "#;
        assert!(matches!(
            SkycheckConfig::from_toml_str(dup),
            Err(SkycheckError::InvalidConfig(_))
        ));
    }
}
