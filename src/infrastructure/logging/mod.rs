// Logging module - Logging infrastructure
use crate::domain::error::{LensError, LensResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging system
///
/// `RUST_LOG` wins over `level`; `verbose` forces debug output for this
/// crate.
pub fn init_logging(level: &str, verbose: bool) -> LensResult<()> {
    let default_directive = if verbose {
        "lensctl=debug,warn".to_string()
    } else {
        format!("lensctl={},warn", level)
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default_directive))
        .map_err(|e| LensError::Config {
            message: format!("Invalid log level '{}': {}", level, e),
        })?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| LensError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("LensCtl logging system initialized");
    Ok(())
}
