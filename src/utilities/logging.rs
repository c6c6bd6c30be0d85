// Diagnostics
// tracing subscriber setup; stdout stays reserved for the action log mirror

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` is used.
pub fn init(default_filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
