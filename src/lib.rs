//! `rent-sale-paths` library crate.
//!
//! The binary (`rsp`) is a thin wrapper around this library so that:
//!
//! - the reshape/join/trajectory core is testable without spawning processes
//! - the render boundary (`render::PathDescriptor`) can feed any chart front-end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod render;
pub mod report;
pub mod reshape;
pub mod telemetry;
pub mod trajectory;
pub mod tui;
