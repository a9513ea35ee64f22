use slslint_core::{Result, Rule, Runner, Severity};

use crate::checks;

/// EventBridge targets must route failed deliveries to a dead-letter queue.
pub struct EventTargetNoDlq {
    resource_type: &'static str,
    block_name: &'static str,
    attribute_name: &'static str,
}

impl EventTargetNoDlq {
    pub fn new() -> Self {
        Self {
            resource_type: "aws_cloudwatch_event_target",
            block_name: "dead_letter_config",
            attribute_name: "arn",
        }
    }
}

impl Rule for EventTargetNoDlq {
    fn name(&self) -> &'static str {
        "aws_cloudwatch_event_target_no_dlq"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/eventbridge/rule_without_dlq/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_path(self, runner, self.resource_type, &[self.block_name], self.attribute_name)
    }
}
