//! Reshaping wide sheets into long records and joining sale/rent series.
//!
//! - wide region×date sheet → `MetricSeries` (`normalize`)
//! - sale series ⋈ rent series → `JointTable` (`join`)

pub mod join;
pub mod normalize;

pub use join::*;
pub use normalize::*;
