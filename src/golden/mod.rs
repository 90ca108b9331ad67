//! # Golden datasets
//!
//! Reference values produced by this engine and compared against other implementations.
//!
//! * [`grid`] – the UTC sampling grid (`REF ± years_range`, clamped, uniform step).
//! * [`record`] – one computed value tagged with its time key, label and unit.
//! * [`table`] – the wide CSV table (`Time` + one column per quantity) shared with the
//!   comparison harness.
//! * [`builder`] – parallel, cancellable sampling of a [`crate::skycheck::Skycheck`]
//!   context over a grid.
//! * [`fixtures`] – per-family JSON fixtures (`golden_<family>.json`).
pub mod builder;
pub mod fixtures;
pub mod grid;
pub mod record;
pub mod table;

pub use builder::{CancellationToken, Dataset, DatasetBuilder};
pub use fixtures::{EventWindows, Fixture, FixtureFamily, FixtureGenerator};
pub use grid::{CalendarDate, GridConfig, TimeGrid};
pub use record::{Quantity, QuantityRecord, Unit};
pub use table::{format_float, WideTable, TIME_COLUMN};
