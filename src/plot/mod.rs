//! Chart rendering: an ASCII plot for the terminal and an SVG chart file.

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::PowerLawChart;
