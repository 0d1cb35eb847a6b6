//! Process-wide tracing setup.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used as the
/// filter directive. Calling this more than once is harmless, later calls
/// keep the subscriber already installed.
///
/// The default level comes from the loaded platform configuration:
///
/// ```no_run
/// use marea_infrastructure::telemetry;
/// use marea_shared::config::ConfigLoader;
///
/// # fn main() -> marea_shared::config::Result<()> {
/// let config = ConfigLoader::new(None).load()?;
/// telemetry::init_tracing(&config.logging.level);
/// # Ok(())
/// # }
/// ```
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
