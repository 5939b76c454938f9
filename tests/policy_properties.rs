// Normalizer and policy engine together, without spawning anything

use gitshim::security::{RULES, Rule};
use gitshim::{DangerousOp, Invocation, Normalized, Normalizer, PolicyEngine, Verdict};

fn normalize(tokens: &[&str]) -> Invocation {
    match Normalizer::new("git").normalize(tokens.iter().copied()) {
        Ok(Normalized::Invocation(invocation)) => invocation,
        other => panic!("expected an invocation for {:?}, got {:?}", tokens, other),
    }
}

fn classify(tokens: &[&str]) -> Verdict {
    PolicyEngine::new().classify(&normalize(tokens).args)
}

#[test]
fn test_no_edit_always_present_exactly_once() {
    let cases: &[&[&str]] = &[
        &["commit"],
        &["commit", "--edit"],
        &["commit", "--no-edit", "--edit", "--no-edit"],
        &["pull", "origin", "main"],
        &["merge", "--edit", "--edit", "topic"],
        &["cherry-pick", "abc123"],
        &["git", "merge", "topic"],
    ];

    for tokens in cases {
        let verdict = classify(tokens);
        let args = verdict.args().expect("no-edit operations are never rejected");
        assert!(matches!(verdict, Verdict::Rewritten { .. }));
        assert_eq!(args[1], "--no-edit", "flag should follow the operation: {:?}", args);
        assert_eq!(
            args.iter().filter(|t| *t == "--no-edit").count(),
            1,
            "--no-edit duplicated in {:?}",
            args
        );
        assert!(!args.iter().any(|t| t == "--edit"), "--edit kept in {:?}", args);
    }
}

#[test]
fn test_checkout_state_machine() {
    assert!(matches!(
        classify(&["checkout", "--", "file.txt"]),
        Verdict::Rejected {
            op: DangerousOp::FileRevert,
            ..
        }
    ));
    assert_eq!(
        classify(&["checkout", "-f", "--", "file.txt"]),
        Verdict::Rewritten {
            args: vec!["checkout".into(), "--".into(), "file.txt".into()]
        }
    );
    assert_eq!(
        classify(&["checkout", "main"]),
        Verdict::PassThrough {
            args: vec!["checkout".into(), "main".into()]
        }
    );
    assert!(matches!(
        classify(&["checkout", "-f", "main"]),
        Verdict::Rejected {
            op: DangerousOp::ForceCheckout,
            ..
        }
    ));
}

#[test]
fn test_branch_delete() {
    assert!(classify(&["branch", "-D", "old-branch"]).is_rejected());
    assert_eq!(
        classify(&["branch", "old-branch"]),
        Verdict::PassThrough {
            args: vec!["branch".into(), "old-branch".into()]
        }
    );
}

#[test]
fn test_reset_blocked_regardless_of_args() {
    for tokens in [&["reset", "--hard"][..], &["reset"][..], &["reset", "--soft"][..]] {
        assert!(matches!(
            classify(tokens),
            Verdict::Rejected {
                op: DangerousOp::Reset,
                ..
            }
        ));
    }
}

#[test]
fn test_push() {
    assert!(classify(&["push", "--force", "origin", "main"]).is_rejected());
    assert_eq!(
        classify(&["push", "origin", "main"]),
        Verdict::PassThrough {
            args: vec!["push".into(), "origin".into(), "main".into()]
        }
    );
}

#[test]
fn test_clean_flag_spellings_are_equivalent() {
    for tokens in [&["clean", "-fd"][..], &["clean", "-f", "-d"][..], &["clean", "-df"][..]] {
        assert!(matches!(
            classify(tokens),
            Verdict::Rejected {
                op: DangerousOp::ForceClean,
                ..
            }
        ));
    }
}

#[test]
fn test_env_prefix_does_not_reach_policy() {
    let invocation = normalize(&["FOO=bar", "status"]);
    assert_eq!(invocation.args, vec!["status"]);
    assert_eq!(invocation.env, vec![("FOO".to_string(), "bar".to_string())]);

    let invocation = normalize(&["status", "FOO=bar"]);
    assert_eq!(invocation.args, vec!["status", "FOO=bar"]);
    assert!(invocation.env.is_empty());
}

#[test]
fn test_env_prefix_cannot_hide_operation() {
    assert!(classify(&["GIT_DIR=.git", "reset", "--hard"]).is_rejected());
    assert!(classify(&["-C", "/repo", "git", "rebase", "main"]).is_rejected());
}

#[test]
fn test_unknown_operation_passes_unchanged() {
    assert_eq!(
        classify(&["foo", "--bar"]),
        Verdict::PassThrough {
            args: vec!["foo".into(), "--bar".into()]
        }
    );
}

#[test]
fn test_classification_is_idempotent() {
    let engine = PolicyEngine::new();
    for (op, _) in RULES {
        let args = vec![op.to_string(), "-f".to_string(), "--".to_string(), "x".to_string()];
        assert_eq!(engine.classify(&args), engine.classify(&args), "{}", op);
    }
}

#[test]
fn test_rule_table_has_no_duplicates() {
    let mut ops: Vec<&str> = RULES.iter().map(|(op, _)| *op).collect();
    let total = ops.len();
    ops.sort_unstable();
    ops.dedup();
    assert_eq!(ops.len(), total);
}

#[test]
fn test_always_rejected_operations() {
    let engine = PolicyEngine::new();
    for op in ["reset", "restore", "rebase", "filter-repo", "filter-branch"] {
        assert!(
            matches!(engine.rule_for(op), Some(Rule::RejectAlways(_))),
            "{} should be blocked unconditionally",
            op
        );
    }
}

#[test]
fn test_every_rejection_has_a_reason() {
    let engine = PolicyEngine::new();
    for (op, _) in RULES {
        if let Verdict::Rejected { reason, .. } =
            engine.classify(&[op.to_string(), "-fd".to_string(), "--force".to_string()])
        {
            assert!(reason.contains("blocked"), "{}: {}", op, reason);
        }
    }
}
