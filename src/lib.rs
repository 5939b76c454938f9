pub mod audit;
pub mod config;
pub mod delegate;
pub mod error;
pub mod invocation;
pub mod logging;
pub mod security;

use std::io::Write;

use tracing::{debug, warn};

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError};
pub use delegate::{DelegateExecutor, Dispatcher};
pub use error::{AppError, AppResult, DelegateError, UsageError};
pub use invocation::{Invocation, Normalized, Normalizer};
pub use security::{DangerousOp, PolicyEngine, Verdict};

use audit::AuditLogger;

/// Normalize, classify and dispatch one invocation
///
/// Returns the process exit code: the delegate's own code, 0 for help, or 1
/// for a rejection. `load_config` runs only once the arguments are known to
/// name a command, so `--help` works even with a broken config file.
pub fn run<I, S, F>(raw_args: I, load_config: F) -> AppResult<i32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnOnce() -> Result<Config, ConfigError>,
{
    let scanned = match Normalizer::scan(raw_args)? {
        Normalized::Help => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(invocation::USAGE.as_bytes())?;
            stdout.flush()?;
            return Ok(0);
        }
        Normalized::Invocation(invocation) => invocation,
    };

    let config = load_config()?;
    let invocation = Normalizer::new(&config.delegate.name).resolve(scanned)?;

    let verdict = PolicyEngine::new().classify(&invocation.args);
    debug!(?verdict, "classified");

    let mut dispatcher = Dispatcher::new(
        DelegateExecutor::new(&config.delegate.path),
        &config.delegate.name,
        config.slow_threshold(),
    );

    match config.audit_log_path() {
        Ok(Some(path)) => match AuditLogger::with_path(&path) {
            Ok(audit) => dispatcher = dispatcher.with_audit(audit),
            Err(e) => warn!(path = %path.display(), error = %e, "audit log unavailable"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "audit log unavailable"),
    }

    Ok(dispatcher.dispatch(&verdict, &invocation)?)
}
