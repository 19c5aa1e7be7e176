//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`SourceKind`, `GridSpacing`, `DayOrigin`)
//! - the day axis and cleaned observation points (`DayAxis`, `PricePoint`)
//! - fit outputs (`FitResult`, `Channel`, `ChannelCurves`, `CurveFile`, etc.)

pub mod types;

pub use types::*;
