//! Terminal reports for path runs and datasets.
//!
//! Formatting lives here so the pipeline stays free of presentation and
//! output changes are localized.

pub mod format;

pub use format::*;
