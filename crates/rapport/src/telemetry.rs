//! Logging setup for binaries built on Rapport.
//!
//! Library crates only emit `tracing` events; installing a subscriber is
//! the application's call. [`init`] is the usual choice: it honours
//! `RUST_LOG` and falls back to a default directive.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Installs a formatted stdout subscriber filtered by `RUST_LOG`, or
/// [`DEFAULT_DIRECTIVE`] when that's unset.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    init_with_default(DEFAULT_DIRECTIVE)
}

/// Like [`init`] with a different fallback directive, e.g.
/// `"rapport_session=debug,info"`.
pub fn init_with_default(directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(fallback = directive, "subscriber installed");
    }
    installed
}
