use std::path::PathBuf;

use tracing::debug;

use crate::error::UsageError;
use crate::invocation::{Invocation, Normalized};

/// Splits raw arguments into environment overrides, shim options and the
/// command vector
#[derive(Debug, Clone)]
pub struct Normalizer {
    delegate_name: String,
}

impl Normalizer {
    /// `delegate_name` is the redundant leading token to drop (usually `git`)
    pub fn new<S: Into<String>>(delegate_name: S) -> Self {
        Self {
            delegate_name: delegate_name.into(),
        }
    }

    pub fn normalize<I, S>(&self, tokens: I) -> Result<Normalized, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match Self::scan(tokens)? {
            Normalized::Help => Ok(Normalized::Help),
            Normalized::Invocation(invocation) => {
                self.resolve(invocation).map(Normalized::Invocation)
            }
        }
    }

    /// The prefix pass on its own
    ///
    /// Needs no delegate name, so `--help` is answered before any
    /// configuration is read. A leading delegate name is still in `args`;
    /// pass the result through [`Normalizer::resolve`].
    pub fn scan<I, S>(tokens: I) -> Result<Normalized, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::<String>::into);
        let mut invocation = Invocation::default();

        // Prefix: assignments and shim options, until the command starts
        while let Some(token) = tokens.next() {
            if token == "--" {
                break;
            }

            if token == "--help" || token == "-h" {
                return Ok(Normalized::Help);
            }

            if token == "--timeout" || token.starts_with("--timeout=") {
                return Err(UsageError::UnsupportedOption("--timeout".to_string()));
            }

            if let Some(path) = directory_option(&token, &mut tokens)? {
                invocation.push_directory(path);
                continue;
            }

            if let Some((name, value)) = split_assignment(&token) {
                invocation.set_env(name, value);
                continue;
            }

            invocation.args.push(token);
            break;
        }

        // Everything after the boundary is literal
        invocation.args.extend(tokens);

        if invocation.args.is_empty() {
            return Err(UsageError::MissingCommand);
        }

        Ok(Normalized::Invocation(invocation))
    }

    /// Drop one redundant leading delegate name from a scanned invocation
    pub fn resolve(&self, mut invocation: Invocation) -> Result<Invocation, UsageError> {
        if invocation
            .args
            .first()
            .is_some_and(|first| *first == self.delegate_name)
        {
            invocation.args.remove(0);
        }

        if invocation.args.is_empty() {
            return Err(UsageError::MissingCommand);
        }

        debug!(
            args = ?invocation.args,
            env = ?invocation.env,
            directory = ?invocation.directory,
            "normalized invocation"
        );

        Ok(invocation)
    }
}

/// Recognize `-C`, `--directory` and `--cwd` in their separate and
/// attached forms, consuming the value token when separate
fn directory_option(
    token: &str,
    rest: &mut impl Iterator<Item = String>,
) -> Result<Option<PathBuf>, UsageError> {
    let value = match token {
        "-C" | "--directory" | "--cwd" => rest
            .next()
            .ok_or_else(|| UsageError::MissingOptionValue(token.to_string()))?,
        _ => {
            let attached = token
                .strip_prefix("--cwd=")
                .or_else(|| token.strip_prefix("--directory="))
                .or_else(|| token.strip_prefix("-C"));
            match attached {
                Some(value) => value.to_string(),
                None => return Ok(None),
            }
        }
    };

    if value.is_empty() {
        let option = token.split('=').next().unwrap_or(token);
        let option = if option.starts_with("-C") { "-C" } else { option };
        return Err(UsageError::EmptyOptionValue(option.to_string()));
    }

    Ok(Some(PathBuf::from(value)))
}

/// `KEY=VALUE` with a non-empty key, split on the first `=`
fn split_assignment(token: &str) -> Option<(&str, &str)> {
    if token.starts_with('-') {
        return None;
    }
    token.split_once('=').filter(|(name, _)| !name.is_empty())
}
