use tracing_subscriber::EnvFilter;

use crate::config;

/// Install the global fmt subscriber. The filter comes from `RUST_LOG`, else
/// [`config::default_log_filter`].
///
/// Returns false when a subscriber was already installed; the existing one stays.
pub fn init_tracing() -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} v{} logging initialised", config::APP_NAME, config::APP_VERSION);
    }
    installed
}
