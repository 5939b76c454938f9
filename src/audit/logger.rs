use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only record of what the shim forwarded or refused
#[derive(Debug)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create an AuditLogger writing to `path`
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        // Ensure directory exists
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Log a forwarded command and the delegate's exit code
    pub fn log_command(&self, command: &str, cwd: &Path, exit_code: i32) -> std::io::Result<()> {
        self.append(&format!(
            "[{}] [{}] [{}] [exit:{}] {}\n",
            Utc::now().to_rfc3339(),
            current_user(),
            cwd.display(),
            exit_code,
            command
        ))
    }

    /// Log a command the policy refused
    pub fn log_rejection(&self, command: &str, cwd: &Path, reason: &str) -> std::io::Result<()> {
        self.append(&format!(
            "[{}] [{}] [{}] [BLOCKED] {} reason=\"{}\"\n",
            Utc::now().to_rfc3339(),
            current_user(),
            cwd.display(),
            command,
            reason
        ))
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(entry.as_bytes())?;
        file.flush()
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // history.log -> history.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

fn current_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}
