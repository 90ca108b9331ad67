//! # Derived quantities
//!
//! Stateless calculators turning positions and instants into the quantities of the golden
//! datasets. Every angle leaves this module normalized: `[0, 360)` around a circle,
//! `[-90, 90]` for latitudes.
//!
//! | quantity | function |
//! |---|---|
//! | Earth Rotation Angle, GMST, GAST | [`sidereal`] |
//! | separation, phase angle, illuminated fraction, elongation, position angle | [`angles`] |
//! | mean lunar nodes | [`lunar_nodes`] |
//! | refraction and its inverse | [`refraction`] |
//! | altitude/azimuth, hour angle | [`horizon`] |
//! | line–sphere intersection, shadow and occultation tests | [`geometry`] |
pub mod angles;
pub mod geometry;
pub mod horizon;
pub mod lunar_nodes;
pub mod refraction;
pub mod sidereal;

pub use angles::{
    elongation, fraction_illuminated, phase_angle, position_angle, separation, separation_kahan,
};
pub use geometry::{intersect_line_sphere, is_behind_earth, is_sunlit};
pub use horizon::{altaz, altaz_refracted, hour_angle_dec, Horizontal};
pub use lunar_nodes::mean_lunar_nodes;
pub use refraction::{refract, refraction};
