use std::path::Path;

use pretty_assertions::assert_eq;
use slslint_core::{Config, Error, Expression, Range, RuleConfig, Severity};
use slslint_tfcompat::builder::{resource, snapshot};
use slslint_tfcompat::{Snapshot, SnapshotRunner};

fn fixture() -> Snapshot {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/orders.yaml");
    Snapshot::from_path(&path).unwrap()
}

fn at(start: (usize, usize), end: (usize, usize)) -> Range {
    Range::new("main.tf", start, end)
}

fn check(snapshot: Snapshot, config: &Config) -> Vec<(String, String, Range)> {
    let mut runner = SnapshotRunner::new(snapshot);
    slslint_aws::ruleset().check(&mut runner, config).unwrap();
    runner
        .into_issues()
        .into_iter()
        .map(|i| (i.rule, i.message, i.range))
        .collect()
}

fn found(rule: &str, message: &str, range: Range) -> (String, String, Range) {
    (rule.to_string(), message.to_string(), range)
}

#[test]
fn default_rules() {
    let principals = "different \"principal\" values for the same function_name.";
    assert_eq!(
        check(fixture(), &Config::default()),
        vec![
            found(
                "aws_lambda_function_eol_runtime",
                "\"python2.7\" is an end-of-life runtime.",
                at((3, 13), (3, 24))
            ),
            found(
                "aws_lambda_function_tracing_rule",
                "\"tracing_config.mode\" should be set to Active.",
                at((7, 12), (7, 25))
            ),
            found("aws_lambda_permission_multiple_principals", principals, at((17, 19), (17, 41))),
            found("aws_lambda_permission_multiple_principals", principals, at((12, 19), (12, 38))),
        ]
    );
}

#[test]
fn opt_in_rule() {
    let mut config = Config::default();
    config
        .rules
        .insert("aws_sqs_queue_redrive_policy".into(), RuleConfig { enabled: true });
    let issues = check(fixture(), &config);
    assert_eq!(issues.len(), 5);
    assert_eq!(
        issues.last(),
        Some(&found(
            "aws_sqs_queue_redrive_policy",
            "\"redrive_policy\" is not present.",
            at((20, 1), (20, 30))
        ))
    );
}

#[test]
fn only_selected_rules_run() {
    let config = Config {
        only: vec![
            "aws_cloudwatch_log_group_lambda_retention".into(),
            "aws_lambda_event_invoke_config_async_on_failure".into(),
        ],
        ..Config::default()
    };
    let missing_config = "missing \"aws_lambda_function_event_invoke_config\" resource for function_name.";
    assert_eq!(
        check(fixture(), &config),
        vec![
            found(
                "aws_cloudwatch_log_group_lambda_retention",
                "\"aws_lambda_function\" is missing a log group with retention_in_days.",
                at((1, 1), (1, 38))
            ),
            found("aws_lambda_event_invoke_config_async_on_failure", missing_config, at((11, 19), (11, 58))),
            found("aws_lambda_event_invoke_config_async_on_failure", missing_config, at((16, 19), (16, 58))),
        ]
    );
}

#[test]
fn disabled_by_default() {
    let config = Config { disabled_by_default: true, ..Config::default() };
    assert!(check(fixture(), &config).is_empty());
}

#[test]
fn unknown_rule_is_rejected() {
    let config = Config { only: vec!["aws_lambda_function_cold_start".into()], ..Config::default() };
    let mut runner = SnapshotRunner::new(fixture());
    let err = slslint_aws::ruleset().check(&mut runner, &config).unwrap_err();
    assert!(matches!(err, Error::UnknownRule(ref name) if name == "aws_lambda_function_cold_start"));
    assert!(runner.issues().is_empty());
}

#[test]
fn evaluation_failure_names_the_rule() {
    let snap = snapshot([resource("aws_lambda_function", "this")
        .attr("runtime", Expression::traversal("var.runtime", at((3, 13), (3, 24))))]);
    let mut runner = SnapshotRunner::new(snap);
    let err = slslint_aws::ruleset().check(&mut runner, &Config::default()).unwrap_err();
    match err {
        Error::Rule { rule, source } => {
            assert_eq!(rule, "aws_lambda_function_eol_runtime");
            assert!(matches!(*source, Error::UnknownValue { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Rules ahead of the failing one still reported.
    assert_eq!(runner.issues().len(), 2);
    assert!(runner.issues().iter().all(|i| i.severity == Severity::Error));
}
