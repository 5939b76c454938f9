#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stands in for the real git: echoes its argv, cwd and one env var to
/// stdout, a fixed line to stderr, then exits with `$FAKE_EXIT` or kills
/// itself with `$FAKE_SIGNAL`
const FAKE_DELEGATE: &str = r#"#!/bin/sh
for arg in "$@"; do
    printf 'arg:%s\n' "$arg"
done
printf 'cwd:%s\n' "$(pwd -P)"
printf 'env:SHIM_TEST_VAR=%s\n' "$SHIM_TEST_VAR"
printf 'fake-stderr\n' >&2
if [ -n "$FAKE_SLEEP" ]; then
    sleep "$FAKE_SLEEP"
fi
if [ -n "$FAKE_SIGNAL" ]; then
    kill -"$FAKE_SIGNAL" $$
fi
exit "${FAKE_EXIT:-0}"
"#;

/// A scratch `$HOME` whose config points the shim at a fake delegate
pub struct ShimHome {
    pub dir: TempDir,
    pub delegate: PathBuf,
}

impl ShimHome {
    pub fn new() -> Self {
        Self::with_config("")
    }

    /// `extra` is appended to the generated config file
    pub fn with_config(extra: &str) -> Self {
        let dir = TempDir::new().unwrap();

        let delegate = dir.path().join("git.real");
        fs::write(&delegate, FAKE_DELEGATE).expect("Failed to write fake delegate");
        fs::set_permissions(&delegate, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark fake delegate executable");

        let config = format!(
            "[delegate]\npath = \"{}\"\nname = \"git\"\n{}",
            delegate.display(),
            extra
        );
        write_config(dir.path(), &config);

        Self { dir, delegate }
    }

    /// A home whose config names a delegate that does not exist
    pub fn with_missing_delegate() -> Self {
        let dir = TempDir::new().unwrap();
        let delegate = dir.path().join("missing").join("git.real");
        let config = format!("[delegate]\npath = \"{}\"\n", delegate.display());
        write_config(dir.path(), &config);
        Self { dir, delegate }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn audit_log(&self) -> PathBuf {
        self.dir.path().join(".config").join("gitshim").join("history.log")
    }
}

pub fn write_config(home: &Path, contents: &str) {
    let config_dir = home.join(".config").join("gitshim");
    fs::create_dir_all(&config_dir).expect("Failed to create config dir");
    fs::write(config_dir.join("config.toml"), contents).expect("Failed to write config");
}

/// `arg:` lines the fake delegate printed, in order
pub fn forwarded_args(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.strip_prefix("arg:"))
        .map(str::to_string)
        .collect()
}
