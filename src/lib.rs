//! Exploratory analysis of a streaming-platform catalog dataset.
//!
//! Three independent stages over one in-memory table: [`clean`] loads and
//! normalizes the raw CSV, [`analysis`]/[`insights`] reduce the cleaned
//! table to descriptive aggregates, and [`viz`]/[`geo`] render chart
//! artifacts. Control flow is strictly linear; the aggregators and
//! renderers never feed each other.

pub mod analysis;
pub mod clean;
pub mod data;
pub mod error;
pub mod geo;
pub mod insights;
pub mod style;
pub mod viz;

pub use error::{LensError, Result};
