use lazy_static::lazy_static;
use regex::Regex;
use slslint_core::{BodySchema, Range, Result, Rule, Runner, Severity};
use tracing::debug;

lazy_static! {
    static ref LAMBDA_LOG_GROUP: Regex = Regex::new(r"^/aws/lambda/(.+)$").unwrap();
}

struct LambdaLogGroup {
    /// `${aws_lambda_function.<name>.function_name}`, as a log group template renders it.
    reference: String,
    function_name: Option<String>,
    def_range: Range,
    found: bool,
}

/// Every Lambda function needs a `/aws/lambda/<name>` log group with a retention period.
pub struct LogGroupLambdaRetention {
    function_resource_type: &'static str,
    function_name_attribute: &'static str,
    log_group_resource_type: &'static str,
    name_attribute: &'static str,
    retention_attribute: &'static str,
}

impl LogGroupLambdaRetention {
    pub fn new() -> Self {
        Self {
            function_resource_type: "aws_lambda_function",
            function_name_attribute: "function_name",
            log_group_resource_type: "aws_cloudwatch_log_group",
            name_attribute: "name",
            retention_attribute: "retention_in_days",
        }
    }

    fn functions(&self, runner: &mut dyn Runner) -> Result<Vec<LambdaLogGroup>> {
        let schema = BodySchema::new().attribute(self.function_name_attribute);
        let resources = runner.get_resource_content(self.function_resource_type, &schema)?;

        let mut functions = Vec::with_capacity(resources.len());
        for resource in &resources {
            let function_name = match resource.body.attribute(self.function_name_attribute) {
                Some(attr) => Some(runner.evaluate_string(&attr.expr)?),
                None => None,
            };
            functions.push(LambdaLogGroup {
                reference: format!(
                    "${{{}.{}.{}}}",
                    self.function_resource_type,
                    resource.resource_name().unwrap_or_default(),
                    self.function_name_attribute
                ),
                function_name,
                def_range: resource.def_range.clone(),
                found: false,
            });
        }
        Ok(functions)
    }

    /// Suffixes of log groups that have a retention period set.
    fn retained_suffixes(&self, runner: &mut dyn Runner) -> Result<Vec<String>> {
        let schema = BodySchema::new()
            .attribute(self.name_attribute)
            .attribute(self.retention_attribute);
        let resources = runner.get_resource_content(self.log_group_resource_type, &schema)?;

        let mut suffixes = Vec::new();
        for resource in &resources {
            let (Some(name), Some(retention)) = (
                resource.body.attribute(self.name_attribute),
                resource.body.attribute(self.retention_attribute),
            ) else {
                continue;
            };
            let name = runner.evaluate_string(&name.expr)?;
            runner.evaluate_expr(&retention.expr)?;

            if let Some(caps) = LAMBDA_LOG_GROUP.captures(&name) {
                suffixes.push(caps[1].to_string());
            }
        }
        Ok(suffixes)
    }
}

impl Rule for LogGroupLambdaRetention {
    fn name(&self) -> &'static str {
        "aws_cloudwatch_log_group_lambda_retention"
    }

    fn enabled(&self) -> bool {
        false
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/log_retention.html"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let mut functions = self.functions(runner)?;
        let suffixes = self.retained_suffixes(runner)?;
        debug!(functions = functions.len(), log_groups = suffixes.len(), "joining functions to log groups");

        for function in &mut functions {
            function.found = suffixes
                .iter()
                .any(|s| *s == function.reference || function.function_name.as_deref() == Some(s.as_str()));
        }

        for function in functions.iter().filter(|f| !f.found) {
            runner.emit_issue(
                self,
                format!("\"{}\" is missing a log group with {}.", self.function_resource_type, self.retention_attribute),
                function.def_range.clone(),
            );
        }
        Ok(())
    }
}
