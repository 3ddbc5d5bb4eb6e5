use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DOCCROP_LOG";

/// Installs the fmt subscriber; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
