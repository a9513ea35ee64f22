//! Serverless best-practice rules for AWS Terraform resources.

pub mod api_gateway;
pub mod appsync;
mod checks;
pub mod cloudwatch;
pub mod eventbridge;
pub mod iam;
pub mod lambda;
pub mod sfn;
pub mod sns;
pub mod sqs;

use slslint_core::{Rule, RuleSet};

pub const RULESET_NAME: &str = "aws-serverless";

/// Every rule, in registration order.
pub fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(api_gateway::MethodSettingsThrottling::new()),
        Box::new(api_gateway::StageLogging::rest()),
        Box::new(api_gateway::StageLogging::http()),
        Box::new(api_gateway::StageStructuredLogging::rest()),
        Box::new(api_gateway::StageStructuredLogging::http()),
        Box::new(api_gateway::StageTracing::new()),
        Box::new(api_gateway::StageV2Throttling::new()),
        Box::new(appsync::GraphqlApiTracing::new()),
        Box::new(eventbridge::EventTargetNoDlq::new()),
        Box::new(cloudwatch::LogGroupLambdaRetention::new()),
        Box::new(iam::RoleLambdaNoStar::new()),
        Box::new(lambda::EventInvokeConfigAsyncOnFailure::new()),
        Box::new(lambda::EventSourceMappingFailureDestination::new()),
        Box::new(lambda::FunctionDefaultMemory::new()),
        Box::new(lambda::FunctionDefaultTimeout::new()),
        Box::new(lambda::FunctionEolRuntime::new()),
        Box::new(lambda::FunctionTracing::new()),
        Box::new(lambda::PermissionMultiplePrincipals::new()),
        Box::new(sfn::StateMachineTracing::new()),
        Box::new(sns::SubscriptionRedrivePolicy::new()),
        Box::new(sqs::QueueRedrivePolicy::new()),
    ]
}

pub fn ruleset() -> RuleSet {
    RuleSet::new(RULESET_NAME, env!("CARGO_PKG_VERSION"), rules())
}

#[cfg(test)]
pub(crate) mod testing {
    use slslint_core::{Issue, Range, Rule};
    use slslint_tfcompat::{Snapshot, SnapshotRunner};

    pub fn r(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Range {
        Range::new("resource.tf", (start_line, start_col), (end_line, end_col))
    }

    pub fn run(rule: &dyn Rule, snapshot: Snapshot) -> Vec<Issue> {
        let mut runner = SnapshotRunner::new(snapshot);
        if let Err(e) = rule.check(&mut runner) {
            panic!("unexpected error from {}: {}", rule.name(), e);
        }
        runner.into_issues()
    }

    /// Emitted issues reduced to what the tests compare.
    pub fn found(rule: &dyn Rule, snapshot: Snapshot) -> Vec<(String, Range)> {
        run(rule, snapshot).into_iter().map(|i| (i.message, i.range)).collect()
    }

    pub fn issue(message: &str, range: Range) -> (String, Range) {
        (message.to_string(), range)
    }
}
