use slslint_core::{Attribute, BodySchema, Result, Rule, Runner, Severity};
use slslint_policy::PolicyDocument;
use tracing::{debug, warn};

use crate::checks;

const LAMBDA_PRINCIPALS: &[&str] = &["lambda.amazonaws.com", "lambda.amazonaws.com.cn"];

/// Roles assumable by Lambda must not grant wildcard actions in inline policies.
pub struct RoleLambdaNoStar {
    resource_type: &'static str,
    assume_attribute: &'static str,
    inline_block: &'static str,
    policy_attribute: &'static str,
}

impl RoleLambdaNoStar {
    pub fn new() -> Self {
        Self {
            resource_type: "aws_iam_role",
            assume_attribute: "assume_role_policy",
            inline_block: "inline_policy",
            policy_attribute: "policy",
        }
    }

    fn assumable_by_lambda(&self, runner: &mut dyn Runner, attribute: &Attribute) -> Result<bool> {
        let text = runner.evaluate_string(&attribute.expr)?;
        match PolicyDocument::parse(&text) {
            Ok(document) => Ok(document.has_service_principal(LAMBDA_PRINCIPALS)),
            Err(e) => {
                warn!(range = %attribute.expr.range, error = %e, "assume role policy is not a policy document");
                Ok(false)
            }
        }
    }
}

impl Rule for RoleLambdaNoStar {
    fn name(&self) -> &'static str {
        "aws_iam_role_lambda_no_star"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/star_permissions.html"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let schema = BodySchema::new()
            .attribute(self.assume_attribute)
            .block_with(self.inline_block, BodySchema::new().attribute(self.policy_attribute));
        let resources = runner.get_resource_content(self.resource_type, &schema)?;
        debug!(count = resources.len(), "aws_iam_role resources");

        for resource in &resources {
            let Some(assume) = resource.body.attribute(self.assume_attribute) else {
                runner.emit_issue(self, checks::not_present(self.assume_attribute), resource.def_range.clone());
                continue;
            };
            if !self.assumable_by_lambda(runner, assume)? {
                continue;
            }

            for inline in resource.body.blocks_of_type(self.inline_block) {
                let Some(policy) = inline.body.attribute(self.policy_attribute) else {
                    runner.emit_issue(self, checks::not_present(self.policy_attribute), inline.def_range.clone());
                    continue;
                };

                let text = runner.evaluate_string(&policy.expr)?;
                match PolicyDocument::parse(&text) {
                    Ok(document) if document.has_star_action() => runner.emit_issue_on_expr(
                        self,
                        "Inline policy for role with Lambda as principal has policy actions with stars.".to_string(),
                        &policy.expr,
                    ),
                    Ok(_) => {}
                    Err(_) => runner.emit_issue_on_expr(
                        self,
                        format!("\"{}\" is not valid JSON.", self.policy_attribute),
                        &policy.expr,
                    ),
                }
            }
        }
        Ok(())
    }
}
