//! The unit of exchange between the builder and the harness.
use serde::{Deserialize, Serialize};

/// Physical unit of a quantity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Degree,
    Kilometer,
    Second,
    Day,
    Fraction,
}

/// Quantities of the wide table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    EclipticLatitude,
    EclipticLongitude,
    PositionX,
    PositionY,
    PositionZ,
    NorthNodeLongitude,
    SouthNodeLongitude,
}

impl Quantity {
    pub fn unit(&self) -> Unit {
        match self {
            Quantity::PositionX | Quantity::PositionY | Quantity::PositionZ => Unit::Kilometer,
            _ => Unit::Degree,
        }
    }

    /// Column name for a labelled (`mars_lat_deg`) or unlabelled (`north_node_lon_deg`) value.
    pub fn column(&self, label: Option<&str>) -> String {
        let suffix = match self {
            Quantity::EclipticLatitude => "lat_deg",
            Quantity::EclipticLongitude => "lon_deg",
            Quantity::PositionX => "x_km",
            Quantity::PositionY => "y_km",
            Quantity::PositionZ => "z_km",
            Quantity::NorthNodeLongitude => "north_node_lon_deg",
            Quantity::SouthNodeLongitude => "south_node_lon_deg",
        };
        match label {
            Some(label) => format!("{label}_{suffix}"),
            None => suffix.to_string(),
        }
    }
}

/// One value keyed by (instant, optional label, quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityRecord {
    /// Position of the instant in the time grid.
    pub index: usize,
    /// `YYYY-MM-DD HH:MM:SS+00:00`.
    pub time_key: String,
    pub label: Option<String>,
    pub quantity: Quantity,
    pub value: f64,
}

impl QuantityRecord {
    pub fn new(
        index: usize,
        time_key: &str,
        label: Option<&str>,
        quantity: Quantity,
        value: f64,
    ) -> Self {
        QuantityRecord {
            index,
            time_key: time_key.to_string(),
            label: label.map(str::to_string),
            quantity,
            value,
        }
    }

    pub fn unit(&self) -> Unit {
        self.quantity.unit()
    }

    pub fn column(&self) -> String {
        self.quantity.column(self.label.as_deref())
    }
}

#[cfg(test)]
mod record_test {
    use super::*;

    #[test]
    fn test_columns() {
        let rec = QuantityRecord::new(0, "t", Some("mars"), Quantity::EclipticLatitude, 1.0);
        assert_eq!(rec.column(), "mars_lat_deg");
        assert_eq!(rec.unit(), Unit::Degree);
        assert_eq!(
            Quantity::SouthNodeLongitude.column(None),
            "south_node_lon_deg"
        );
        assert_eq!(Quantity::PositionZ.column(Some("venus")), "venus_z_km");
        assert_eq!(Quantity::PositionZ.unit(), Unit::Kilometer);
    }
}
