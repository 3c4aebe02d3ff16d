//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - metric and pair enums (`MetricName`, `PairKind`, `DuplicatePolicy`)
//! - long-format and joined records (`MetricRecord`, `JointRecord`)
//! - filters and trajectories (`DateRange`, `RegionFilter`, `Trajectory`)
//! - region colors (`ColorToken`, `ColorAssignment`)

pub mod color;
pub mod types;

pub use color::*;
pub use types::*;
