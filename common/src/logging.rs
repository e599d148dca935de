//! Opt-in diagnostic logging for the binaries.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `debug`.
pub const LOG_ENV: &str = "VENV_BOOTSTRAP_LOG";

/// Installs a stderr subscriber filtered by [`LOG_ENV`].
///
/// Logging is off unless the variable is set, so regular output stays
/// unchanged. Records emitted through the `log` facade are forwarded to the
/// subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        // A subscriber is already installed; keep it.
    }
}
