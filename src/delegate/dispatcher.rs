use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audit::AuditLogger;
use crate::delegate::executor::{CommandOutput, DelegateExecutor};
use crate::error::Result;
use crate::invocation::Invocation;
use crate::security::Verdict;

/// Exit code for rejections; the delegate never runs
pub const REJECTED_EXIT_CODE: i32 = 1;

/// Turns a verdict into at most one delegate run and an exit code
#[derive(Debug)]
pub struct Dispatcher {
    executor: DelegateExecutor,
    delegate_name: String,
    slow_threshold: Duration,
    audit: Option<AuditLogger>,
}

impl Dispatcher {
    pub fn new<S: Into<String>>(
        executor: DelegateExecutor,
        delegate_name: S,
        slow_threshold: Duration,
    ) -> Self {
        Self {
            executor,
            delegate_name: delegate_name.into(),
            slow_threshold,
            audit: None,
        }
    }

    /// Record every verdict in an audit log
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Dispatch to the process's own stdout and stderr
    pub fn dispatch(&self, verdict: &Verdict, invocation: &Invocation) -> Result<i32> {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        self.dispatch_to(verdict, invocation, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Dispatch, relaying the delegate's streams to `out` and `err`
    ///
    /// Standard output is written in full before standard error.
    pub fn dispatch_to<O: Write, E: Write>(
        &self,
        verdict: &Verdict,
        invocation: &Invocation,
        out: &mut O,
        err: &mut E,
    ) -> Result<i32> {
        let args = match verdict {
            Verdict::Rejected { op, reason } => {
                info!(%op, args = ?invocation.args, "rejected");
                self.audit_rejection(invocation, reason);
                writeln!(err, "gitshim: blocked: {}", reason)?;
                err.flush()?;
                return Ok(REJECTED_EXIT_CODE);
            }
            Verdict::Rewritten { args } => {
                info!(from = ?invocation.args, to = ?args, "rewritten");
                args
            }
            Verdict::PassThrough { args } => args,
        };

        let output = self
            .executor
            .execute(args, &invocation.env, invocation.directory.as_deref())?;

        match self.relay(&output, out, err) {
            Ok(()) => {}
            // The reader went away (`git log | head -1`); the delegate's code still stands
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("caller closed its end of the pipe");
            }
            Err(e) => return Err(e.into()),
        }

        self.audit_command(args, invocation.directory.as_deref(), output.exit_code);

        Ok(output.exit_code)
    }

    /// Standard output in full, then standard error, then the slow-run note
    fn relay<O: Write, E: Write>(
        &self,
        output: &CommandOutput,
        out: &mut O,
        err: &mut E,
    ) -> io::Result<()> {
        out.write_all(&output.stdout)?;
        out.flush()?;
        err.write_all(&output.stderr)?;

        if output.elapsed >= self.slow_threshold {
            writeln!(
                err,
                "gitshim: note: {} took {:.1}s",
                self.delegate_name,
                output.elapsed.as_secs_f64()
            )?;
        }
        err.flush()
    }

    fn audit_rejection(&self, invocation: &Invocation, reason: &str) {
        if let Some(audit) = &self.audit {
            let command = self.command_line(&invocation.args);
            let cwd = working_dir(invocation.directory.as_deref());
            if let Err(e) = audit.log_rejection(&command, &cwd, reason) {
                warn!(error = %e, "failed to write audit log");
            }
        }
    }

    fn audit_command(&self, args: &[String], directory: Option<&Path>, exit_code: i32) {
        if let Some(audit) = &self.audit {
            let command = self.command_line(args);
            if let Err(e) = audit.log_command(&command, &working_dir(directory), exit_code) {
                warn!(error = %e, "failed to write audit log");
            }
        }
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.delegate_name.clone();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Directory the delegate runs in, for the audit trail
fn working_dir(directory: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_default();
    match directory {
        Some(dir) => cwd.join(dir),
        None => cwd,
    }
}
