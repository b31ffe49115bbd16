use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "cinefeed=info";

/// Installs the global tracing subscriber
///
/// Honors `RUST_LOG` when set. Calling it again after a subscriber is installed
/// is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
    {
        tracing::debug!("Tracing initialized");
    }
}
