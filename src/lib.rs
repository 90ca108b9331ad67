pub mod almanac;
pub mod astrometry;
pub mod bodies;
pub mod config;
pub mod constants;
pub mod derived;
pub mod earth_orientation;
pub mod golden;
pub mod harness;
pub mod jpl_ephem;
pub mod logging;
pub mod observers;
#[cfg(feature = "progress")]
mod progress_bar;
pub mod ref_system;
pub mod search;
pub mod skycheck;
pub mod skycheck_errors;
pub mod state_vector;
pub mod time;

pub use skycheck::Skycheck;
pub use skycheck_errors::SkycheckError;
