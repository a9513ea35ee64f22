use slslint_core::{Result, Rule, Runner, Severity};

use crate::checks;

/// Subscriptions must redrive undeliverable messages to a queue.
pub struct SubscriptionRedrivePolicy {
    resource_type: &'static str,
    attribute_name: &'static str,
}

impl SubscriptionRedrivePolicy {
    pub fn new() -> Self {
        Self { resource_type: "aws_sns_topic_subscription", attribute_name: "redrive_policy" }
    }
}

impl Rule for SubscriptionRedrivePolicy {
    fn name(&self) -> &'static str {
        "aws_sns_topic_subscription_redrive_policy"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/sns/redrive_policy/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_attribute(self, runner, self.resource_type, self.attribute_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{found, issue, r};
    use pretty_assertions::assert_eq;
    use slslint_core::Expression;
    use slslint_tfcompat::builder::{resource, snapshot};

    #[test]
    fn redrive_policy() {
        let rule = SubscriptionRedrivePolicy::new();

        let missing = snapshot([resource("aws_sns_topic_subscription", "this").at(r(2, 1, 2, 43))]);
        assert_eq!(
            found(&rule, missing),
            vec![issue("\"redrive_policy\" is not present.", r(2, 1, 2, 43))]
        );

        let present = snapshot([resource("aws_sns_topic_subscription", "this").attr(
            "redrive_policy",
            Expression::template(r#"{"deadLetterTargetArn": "${aws_sqs_queue.dlq.arn}"}"#, r(6, 20, 6, 72)),
        )]);
        assert_eq!(found(&rule, present), vec![]);
    }
}
