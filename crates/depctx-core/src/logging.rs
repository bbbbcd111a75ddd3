//! Logging bootstrap for hosting code
//!
//! Library code only emits `tracing` events. Applications that have no
//! subscriber of their own can call [`init`].

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset: context resolution at `info`,
/// everything else at `warn`.
pub const DEFAULT_DIRECTIVE: &str = "warn,depctx_core=info,depctx_engine=info";

/// `RUST_LOG` when set and valid, [`DEFAULT_DIRECTIVE`] otherwise.
pub fn filter() -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))
}

/// Install a compact stdout subscriber filtered by [`filter`].
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter()?)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!(directive = DEFAULT_DIRECTIVE, "Logging initialized");
    Ok(())
}
