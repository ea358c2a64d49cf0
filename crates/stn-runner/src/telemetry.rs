//! Tracing subscriber setup for the runner.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,stn_world=info";

/// Install the global subscriber: `RUST_LOG` if set, otherwise
/// [`DEFAULT_FILTER`], raised to `debug` for the simulation crates when
/// `verbose` is set
pub fn init_telemetry(verbose: bool) -> Result<()> {
    let fallback = if verbose {
        "info,stn_world=debug,stn_genome=debug,stn_runner=debug"
    } else {
        DEFAULT_FILTER
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;

    Ok(())
}
