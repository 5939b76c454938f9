pub mod normalizer;

use std::path::PathBuf;

pub use normalizer::Normalizer;

/// Usage text printed for `--help`
pub const USAGE: &str = "\
usage: gitshim [options] [KEY=VALUE ...] [--] <command> [args...]

Runs the real git with a fixed safety policy applied. Destructive
operations are refused, editor prompts are suppressed, and everything
else is forwarded unchanged.

Options (only before the command):
  -h, --help               Show this help and exit
  -C <path>, -C<path>      Run the delegate in <path>
  --directory <path>       Same as -C
  --cwd <path>, --cwd=<path>
                           Same as -C
  --                       Stop option parsing; the rest is the command

KEY=VALUE tokens before the command are set in the delegate's environment.

Blocked: reset, restore, rebase, filter-repo, filter-branch,
         branch -d/-D/--delete, push --force/--force-with-lease,
         clean -fd, checkout -f <branch>, checkout -- <path> without -f
Rewritten: commit, pull, merge and cherry-pick always get --no-edit;
           checkout -f -- <path> drops the -f
";

/// One normalized call: the command vector plus its context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Operation first, then its arguments
    pub args: Vec<String>,
    /// Environment overrides in first-seen order; override wins on collision
    pub env: Vec<(String, String)>,
    /// Working directory for the delegate
    pub directory: Option<PathBuf>,
}

impl Invocation {
    /// Record an override, replacing an earlier value for the same name
    pub fn set_env(&mut self, name: &str, value: &str) {
        match self.env.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.env.push((name.to_string(), value.to_string())),
        }
    }

    /// Chain a directory option onto the previous one
    pub fn push_directory(&mut self, path: PathBuf) {
        self.directory = Some(match self.directory.take() {
            Some(base) => base.join(path),
            None => path,
        });
    }
}

/// Result of normalizing the raw arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Help,
    Invocation(Invocation),
}
