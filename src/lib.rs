//! `btc-power-law` library crate.
//!
//! The binary (`pl`) is a thin wrapper around this library so that:
//!
//! - the fit and projection math is testable without network or rendering
//! - price providers are interchangeable behind one trait
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
