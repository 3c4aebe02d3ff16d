//! Input/output helpers.
//!
//! - CSV sheet loading (`sheet`)
//! - load-once cache of normalized sheets (`cache`)
//! - JSON/CSV exports (`export`)

pub mod cache;
pub mod export;
pub mod sheet;

pub use cache::*;
pub use export::*;
pub use sheet::*;
