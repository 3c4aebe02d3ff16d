//! Filtering, ordering and landmark derivation for region paths.

pub mod builder;

pub use builder::*;
