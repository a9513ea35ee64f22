use slslint_core::{BodySchema, Result, Rule, Runner, Severity};
use tracing::debug;

use crate::checks;

/// Queues must redrive failed messages to a dead-letter queue.
pub struct QueueRedrivePolicy {
    resource_type: &'static str,
    attribute_name: &'static str,
}

impl QueueRedrivePolicy {
    pub fn new() -> Self {
        Self { resource_type: "aws_sqs_queue", attribute_name: "redrive_policy" }
    }
}

impl Rule for QueueRedrivePolicy {
    fn name(&self) -> &'static str {
        "aws_sqs_queue_redrive_policy"
    }

    fn enabled(&self) -> bool {
        false
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/sqs/redrive_policy/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let resources = runner.get_resource_content(self.resource_type, &BodySchema::new().attribute(self.attribute_name))?;
        debug!(count = resources.len(), "aws_sqs_queue resources");

        for resource in &resources {
            let Some(attribute) = resource.body.attribute(self.attribute_name) else {
                runner.emit_issue(self, checks::not_present(self.attribute_name), resource.def_range.clone());
                continue;
            };
            if runner.evaluate_string(&attribute.expr)?.trim().is_empty() {
                runner.emit_issue_on_expr(self, format!("\"{}\" is empty.", self.attribute_name), &attribute.expr);
            }
        }
        Ok(())
    }
}
