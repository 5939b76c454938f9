use std::collections::HashMap;
use std::fmt;

use crate::security::RULES;

/// Separator between options and pathspecs
const END_OF_OPTIONS: &str = "--";

/// Operations the policy refuses to forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DangerousOp {
    DeleteBranch,
    ForcePush,
    ForceClean,
    ForceCheckout,
    FileRevert,
    Reset,
    Restore,
    Rebase,
    FilterRepo,
    FilterBranch,
}

impl DangerousOp {
    /// Human-readable reason naming the violated rule
    pub fn reason(&self) -> &'static str {
        match self {
            DangerousOp::DeleteBranch => {
                "branch deletion (-d/-D/--delete) is blocked: the branch may hold unmerged work"
            }
            DangerousOp::ForcePush => {
                "push --force/--force-with-lease is blocked: it overwrites history on the remote"
            }
            DangerousOp::ForceClean => {
                "clean -fd is blocked: it permanently deletes untracked files and directories"
            }
            DangerousOp::ForceCheckout => {
                "forced checkout of a branch or commit is blocked: it silently discards uncommitted work"
            }
            DangerousOp::FileRevert => {
                "checkout -- <path> is blocked: it discards file changes; add -f to confirm the revert"
            }
            DangerousOp::Reset => "reset is blocked: it can move HEAD and discard commits or staged work",
            DangerousOp::Restore => "restore is blocked: it discards changes to working tree files",
            DangerousOp::Rebase => "rebase is blocked: it rewrites commit history",
            DangerousOp::FilterRepo => "filter-repo is blocked: it rewrites the whole repository history",
            DangerousOp::FilterBranch => {
                "filter-branch is blocked: it rewrites the whole repository history"
            }
        }
    }
}

impl fmt::Display for DangerousOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DangerousOp::DeleteBranch => "delete-branch",
            DangerousOp::ForcePush => "force-push",
            DangerousOp::ForceClean => "force-clean",
            DangerousOp::ForceCheckout => "force-checkout",
            DangerousOp::FileRevert => "file-revert",
            DangerousOp::Reset => "reset",
            DangerousOp::Restore => "restore",
            DangerousOp::Rebase => "rebase",
            DangerousOp::FilterRepo => "filter-repo",
            DangerousOp::FilterBranch => "filter-branch",
        };
        f.write_str(name)
    }
}

/// Outcome of classifying one command vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Terminal; the delegate is never invoked
    Rejected { op: DangerousOp, reason: String },
    Rewritten { args: Vec<String> },
    PassThrough { args: Vec<String> },
}

impl Verdict {
    fn rejected(op: DangerousOp) -> Self {
        Verdict::Rejected {
            op,
            reason: op.reason().to_string(),
        }
    }

    fn pass_through(op: &str, rest: &[String]) -> Self {
        let mut args = Vec::with_capacity(rest.len() + 1);
        args.push(op.to_string());
        args.extend_from_slice(rest);
        Verdict::PassThrough { args }
    }

    /// Argument vector to forward, or `None` for a rejection
    pub fn args(&self) -> Option<&[String]> {
        match self {
            Verdict::Rejected { .. } => None,
            Verdict::Rewritten { args } | Verdict::PassThrough { args } => Some(args.as_slice()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Verdict::Rejected { .. })
    }
}

/// Condition over the remaining args of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Any of these exact tokens appears as an option
    AnyFlag(&'static [&'static str]),
    /// Both a force flag and a directory flag, clustered (`-fd`, `-xdf`) or separate
    ForceDirectories,
}

impl Predicate {
    pub fn matches(&self, rest: &[String]) -> bool {
        let (options, _) = split_options(rest);

        match self {
            Predicate::AnyFlag(flags) => options.iter().any(|t| flags.contains(&t.as_str())),
            Predicate::ForceDirectories => {
                let mut force = false;
                let mut directories = false;

                let mut tokens = options.iter();
                while let Some(token) = tokens.next() {
                    if token == "--force" {
                        force = true;
                    } else if token == "--exclude" {
                        tokens.next();
                    } else if let Some((flags, pattern)) = short_flag_cluster(token) {
                        force |= flags.contains('f');
                        directories |= flags.contains('d');
                        // `-e` with nothing attached takes the next token
                        if pattern == Some("") {
                            tokens.next();
                        }
                    }
                }

                force && directories
            }
        }
    }
}

/// Safer equivalent substituted for the caller's arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Prepend `--no-edit` exactly once, dropping `--edit`
    NoEdit,
}

impl Rewrite {
    pub fn apply(&self, op: &str, rest: &[String]) -> Vec<String> {
        match self {
            Rewrite::NoEdit => {
                let (options, tail) = split_options(rest);

                let mut args = Vec::with_capacity(rest.len() + 2);
                args.push(op.to_string());
                args.push("--no-edit".to_string());
                args.extend(
                    options
                        .iter()
                        .filter(|t| *t != "--edit" && *t != "--no-edit")
                        .cloned(),
                );
                args.extend_from_slice(tail);
                args
            }
        }
    }
}

/// Policy attached to a single operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    PassThrough,
    RejectAlways(DangerousOp),
    RejectIf(Predicate, DangerousOp),
    RewriteWith(Rewrite),
    /// Force is required for file reverts and forbidden for branch switches
    ForceGated,
}

impl Rule {
    pub fn apply(&self, op: &str, rest: &[String]) -> Verdict {
        match self {
            Rule::PassThrough => Verdict::pass_through(op, rest),
            Rule::RejectAlways(danger) => Verdict::rejected(*danger),
            Rule::RejectIf(predicate, danger) => {
                if predicate.matches(rest) {
                    Verdict::rejected(*danger)
                } else {
                    Verdict::pass_through(op, rest)
                }
            }
            Rule::RewriteWith(rewrite) => Verdict::Rewritten {
                args: rewrite.apply(op, rest),
            },
            Rule::ForceGated => Self::force_gated(op, rest),
        }
    }

    fn force_gated(op: &str, rest: &[String]) -> Verdict {
        let (options, tail) = split_options(rest);
        let is_file_operation = !tail.is_empty();
        let is_force = options.iter().any(|t| is_force_flag(t));

        match (is_file_operation, is_force) {
            (true, true) => {
                let mut args = Vec::with_capacity(rest.len());
                args.push(op.to_string());
                args.extend(options.iter().filter(|t| !is_force_flag(t)).cloned());
                args.extend_from_slice(tail);
                Verdict::Rewritten { args }
            }
            (true, false) => Verdict::rejected(DangerousOp::FileRevert),
            (false, true) => Verdict::rejected(DangerousOp::ForceCheckout),
            (false, false) => Verdict::pass_through(op, rest),
        }
    }
}

/// Table-driven classifier; a pure function of its input
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: HashMap<&'static str, Rule>,
}

impl PolicyEngine {
    /// Create an engine over the built-in rule table
    pub fn new() -> Self {
        Self::with_rules(RULES)
    }

    pub fn with_rules(rules: &[(&'static str, Rule)]) -> Self {
        Self {
            rules: rules.iter().copied().collect(),
        }
    }

    /// Rule for an operation; `None` means pass-through
    pub fn rule_for(&self, op: &str) -> Option<Rule> {
        self.rules.get(op).copied()
    }

    /// Classify a normalized command vector (operation first)
    pub fn classify(&self, args: &[String]) -> Verdict {
        let Some((op, rest)) = args.split_first() else {
            return Verdict::PassThrough { args: Vec::new() };
        };

        match self.rule_for(op) {
            Some(rule) => rule.apply(op, rest),
            None => Verdict::pass_through(op, rest),
        }
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Split at the first `--`; the second half keeps the separator
fn split_options(rest: &[String]) -> (&[String], &[String]) {
    match rest.iter().position(|t| t == END_OF_OPTIONS) {
        Some(index) => rest.split_at(index),
        None => (rest, &[]),
    }
}

fn is_force_flag(token: &str) -> bool {
    token == "-f" || token == "--force"
}

/// Letters of a short-option cluster such as `-fdx`, stopping at `e`
///
/// `e` takes a value, so everything after it is the exclude pattern rather
/// than more flags: `-fedist` is `-f -e dist`.
fn short_flag_cluster(token: &str) -> Option<(&str, Option<&str>)> {
    let cluster = token
        .strip_prefix('-')
        .filter(|s| !s.is_empty() && !s.starts_with('-'))?;

    let (flags, pattern) = match cluster.split_once('e') {
        Some((flags, pattern)) => (flags, Some(pattern)),
        None => (cluster, None),
    };

    flags
        .chars()
        .all(|c| c.is_ascii_alphabetic())
        .then_some((flags, pattern))
}
