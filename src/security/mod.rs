pub mod policy;

pub use policy::{DangerousOp, PolicyEngine, Predicate, Rewrite, Rule, Verdict};

/// Fixed safety policy, keyed by the operation token
///
/// Operations absent from this table pass through unchanged. Changing an
/// entry changes what unattended callers are able to do; review accordingly.
pub const RULES: &[(&str, Rule)] = &[
    // May open an editor and block forever without a terminal
    ("commit", Rule::RewriteWith(Rewrite::NoEdit)),
    ("pull", Rule::RewriteWith(Rewrite::NoEdit)),
    ("merge", Rule::RewriteWith(Rewrite::NoEdit)),
    ("cherry-pick", Rule::RewriteWith(Rewrite::NoEdit)),
    // Destructive only with specific flags
    (
        "branch",
        Rule::RejectIf(
            Predicate::AnyFlag(&["-d", "-D", "--delete"]),
            DangerousOp::DeleteBranch,
        ),
    ),
    (
        "push",
        Rule::RejectIf(
            Predicate::AnyFlag(&["--force", "--force-with-lease"]),
            DangerousOp::ForcePush,
        ),
    ),
    (
        "clean",
        Rule::RejectIf(Predicate::ForceDirectories, DangerousOp::ForceClean),
    ),
    ("checkout", Rule::ForceGated),
    // History rewrites and working tree discards
    ("reset", Rule::RejectAlways(DangerousOp::Reset)),
    ("restore", Rule::RejectAlways(DangerousOp::Restore)),
    ("rebase", Rule::RejectAlways(DangerousOp::Rebase)),
    ("filter-repo", Rule::RejectAlways(DangerousOp::FilterRepo)),
    ("filter-branch", Rule::RejectAlways(DangerousOp::FilterBranch)),
];
