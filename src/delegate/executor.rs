use crate::error::{DelegateError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of running the delegate once
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
    pub elapsed: Duration,
}

/// Runs the real, unintercepted binary
#[derive(Debug, Clone)]
pub struct DelegateExecutor {
    path: PathBuf,
}

impl DelegateExecutor {
    /// Create an executor for the delegate at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Run the delegate to completion and capture both output streams
    ///
    /// `env` is layered over the inherited environment. `directory` defaults
    /// to the current directory. Stdin is inherited.
    pub fn execute(
        &self,
        args: &[String],
        env: &[(String, String)],
        directory: Option<&Path>,
    ) -> Result<CommandOutput> {
        let mut command = Command::new(&self.path);
        command
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit());

        if let Some(dir) = directory {
            check_directory(dir)?;
            command.current_dir(dir);
        }

        debug!(delegate = %self.path.display(), ?args, ?directory, "spawning delegate");

        let started = Instant::now();
        let output = command.output().map_err(|source| DelegateError::LaunchFailed {
            path: self.path.clone(),
            source,
        })?;

        Ok(self.process_output(output, started.elapsed()))
    }

    /// Process command output into CommandOutput struct
    fn process_output(&self, output: Output, elapsed: Duration) -> CommandOutput {
        let exit_code = exit_code(output.status);
        debug!(exit_code, elapsed_ms = elapsed.as_millis() as u64, "delegate finished");

        CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code,
            elapsed,
        }
    }

    /// Get the delegate path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `dir` must exist and be a directory
fn check_directory(dir: &Path) -> Result<()> {
    let metadata = fs::metadata(dir).map_err(|source| DelegateError::WorkingDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Err(DelegateError::WorkingDirectory {
            path: dir.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotADirectory),
        });
    }

    Ok(())
}

/// The delegate's own exit code; `128 + signal` when it was killed
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
