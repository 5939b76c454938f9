use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `GITSHIM_LOG=debug`
pub const LOG_ENV: &str = "GITSHIM_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber
///
/// Quiet by default so the delegate's streams are relayed untouched.
/// Logging never changes a verdict.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
