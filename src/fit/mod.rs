//! Power-law fitting.
//!
//! Responsibilities:
//!
//! - fit `ln(price)` against `ln(day)` and evaluate the fitted line
//! - derive channel boundaries at fixed log-space offsets
//! - generate day grids for projection

pub mod grid;
pub mod power_law;

pub use grid::*;
pub use power_law::*;
