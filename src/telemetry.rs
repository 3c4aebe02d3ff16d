//! Tracing setup for the `rsp` binary.
//!
//! Library code only emits events; the binary installs the subscriber once at
//! startup. Output goes to stderr so it never mixes with printed reports, and
//! stays quiet (`warn`) unless `RUST_LOG` asks for more.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the default subscriber.
///
/// Returns `false` if a global subscriber was already set (e.g. by a test
/// harness), in which case nothing changes.
#[must_use]
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
