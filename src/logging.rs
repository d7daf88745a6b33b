// 📝 Logging setup for the binaries
// Library code only emits `tracing` events; binaries decide where they go

use anyhow::{anyhow, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when RUST_LOG is unset
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber. RUST_LOG wins over `verbosity`.
pub fn init_logger(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    Ok(())
}
