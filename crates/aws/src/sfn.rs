use slslint_core::{BodySchema, Result, Rule, Runner, Severity};
use tracing::debug;

use crate::checks;

pub struct StateMachineTracing {
    resource_type: &'static str,
    block_name: &'static str,
    attribute_name: &'static str,
}

impl StateMachineTracing {
    pub fn new() -> Self {
        Self {
            resource_type: "aws_sfn_state_machine",
            block_name: "tracing_configuration",
            attribute_name: "enabled",
        }
    }
}

impl Rule for StateMachineTracing {
    fn name(&self) -> &'static str {
        "aws_sfn_state_machine_tracing"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/step_functions/tracing/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let schema = BodySchema::new().block_with(self.block_name, BodySchema::new().attribute(self.attribute_name));
        let resources = runner.get_resource_content(self.resource_type, &schema)?;
        debug!(count = resources.len(), "aws_sfn_state_machine resources");

        for resource in &resources {
            let mut configs = resource.body.blocks_of_type(self.block_name).peekable();
            if configs.peek().is_none() {
                runner.emit_issue(self, checks::not_present(self.block_name), resource.def_range.clone());
                continue;
            }
            for config in configs {
                let Some(enabled) = config.body.attribute(self.attribute_name) else {
                    runner.emit_issue(self, checks::not_present(self.attribute_name), config.def_range.clone());
                    continue;
                };
                if runner.evaluate_string(&enabled.expr)? != "true" {
                    runner.emit_issue_on_expr(
                        self,
                        format!("\"{}\" should be set to true.", self.attribute_name),
                        &enabled.expr,
                    );
                }
            }
        }
        Ok(())
    }
}
