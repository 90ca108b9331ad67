//! Semantic grouping of quantity columns.
//!
//! A column is named `<label>_<quantity>`. The quantity suffix is stripped and the
//! remaining label decides the category:
//!
//! | label | category |
//! |---|---|
//! | a [`Body`] name | `Planets` (or `Positions` for `_km` columns) |
//! | `gc` | `Galactic Center` |
//! | `fastiss`, `issanti`, `polesat` | `Satellites` |
//! | a [`Location`] label | `Locations` |
//! | `north_node_lon_deg`, `south_node_lon_deg` | `Lunar Nodes` |
//! | anything else | `Other` |
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    bodies::Body,
    observers::{Location, Site},
};

const QUANTITY_SUFFIXES: [&str; 7] = [
    "_sub_lat_deg",
    "_sub_lon_deg",
    "_lat_deg",
    "_lon_deg",
    "_x_km",
    "_y_km",
    "_z_km",
];

const SATELLITES: [&str; 3] = ["fastiss", "issanti", "polesat"];

const NODE_COLUMNS: [&str; 2] = ["north_node_lon_deg", "south_node_lon_deg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Planets,
    GalacticCenter,
    LunarNodes,
    Locations,
    Satellites,
    Positions,
    Other,
}

impl Category {
    /// Roll-up order of the report.
    pub const REPORTED: [Category; 6] = [
        Category::Planets,
        Category::GalacticCenter,
        Category::LunarNodes,
        Category::Locations,
        Category::Satellites,
        Category::Positions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Planets => "Planets",
            Category::GalacticCenter => "Galactic Center",
            Category::LunarNodes => "Lunar Nodes",
            Category::Locations => "Locations",
            Category::Satellites => "Satellites",
            Category::Positions => "Positions",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strip the first matching quantity suffix from a column name.
pub fn column_label(column: &str) -> &str {
    QUANTITY_SUFFIXES
        .iter()
        .find_map(|suffix| column.strip_suffix(suffix))
        .unwrap_or(column)
}

/// Category of a quantity column.
pub fn categorize(column: &str) -> Category {
    let label = column_label(column);
    if Body::GOLDEN.iter().any(|b| b.name() == label) {
        return if column.ends_with("_km") {
            Category::Positions
        } else {
            Category::Planets
        };
    }
    if label == "gc" {
        return Category::GalacticCenter;
    }
    if SATELLITES.contains(&label) {
        return Category::Satellites;
    }
    if Location::ALL.iter().any(|l| l.label() == label) {
        return Category::Locations;
    }
    if NODE_COLUMNS.contains(&column) {
        return Category::LunarNodes;
    }
    Category::Other
}
