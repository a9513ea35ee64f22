//! API Gateway (REST and HTTP) stage rules.

use slslint_core::{BodySchema, Result, Rule, Runner, Severity};
use slslint_policy::is_json_log_format;
use tracing::debug;

use crate::checks;

const REST_STAGE: &str = "aws_api_gateway_stage";
const HTTP_STAGE: &str = "aws_apigatewayv2_stage";
const ACCESS_LOG_SETTINGS: &str = "access_log_settings";

/// Default method settings (`method_path = "*/*"`) must set throttling limits.
pub struct MethodSettingsThrottling {
    resource_type: &'static str,
    block_name: &'static str,
    burst_attribute: &'static str,
    rate_attribute: &'static str,
}

impl MethodSettingsThrottling {
    pub fn new() -> Self {
        Self {
            resource_type: "aws_api_gateway_method_settings",
            block_name: "settings",
            burst_attribute: "throttling_burst_limit",
            rate_attribute: "throttling_rate_limit",
        }
    }
}

impl Rule for MethodSettingsThrottling {
    fn name(&self) -> &'static str {
        "aws_api_gateway_method_settings_throttling_rule"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/api_gateway/default_throttling/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let schema = BodySchema::new().attribute("method_path").block_with(
            self.block_name,
            BodySchema::new().attribute(self.burst_attribute).attribute(self.rate_attribute),
        );
        let resources = runner.get_resource_content(self.resource_type, &schema)?;
        debug!(count = resources.len(), "aws_api_gateway_method_settings resources");

        for resource in &resources {
            // Only the default method settings carry the stage-wide limits.
            let Some(method_path) = resource.body.attribute("method_path") else { continue };
            if runner.evaluate_string(&method_path.expr)? != "*/*" {
                continue;
            }

            let Some(settings) = resource.body.first_block(self.block_name) else {
                runner.emit_issue(
                    self,
                    format!("\"{}\" block is required for default method settings", self.block_name),
                    resource.def_range.clone(),
                );
                continue;
            };

            for attribute in [self.burst_attribute, self.rate_attribute] {
                if settings.body.attribute(attribute).is_none() {
                    runner.emit_issue(
                        self,
                        format!("\"{}\" is required for default method settings", attribute),
                        settings.def_range.clone(),
                    );
                }
            }
        }
        Ok(())
    }
}

/// Stages must ship access logs.
pub struct StageLogging {
    name: &'static str,
    resource_type: &'static str,
}

impl StageLogging {
    pub fn rest() -> Self {
        Self { name: "aws_apigateway_stage_logging_rule", resource_type: REST_STAGE }
    }

    pub fn http() -> Self {
        Self { name: "aws_apigatewayv2_stage_logging_rule", resource_type: HTTP_STAGE }
    }
}

impl Rule for StageLogging {
    fn name(&self) -> &'static str {
        self.name
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/api_gateway/logging/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_block(self, runner, self.resource_type, ACCESS_LOG_SETTINGS)
    }
}

/// Access log format must be JSON so the logs can be queried.
pub struct StageStructuredLogging {
    name: &'static str,
    resource_type: &'static str,
    attribute_name: &'static str,
}

impl StageStructuredLogging {
    pub fn rest() -> Self {
        Self {
            name: "aws_api_gateway_stage_structured_logging",
            resource_type: REST_STAGE,
            attribute_name: "format",
        }
    }

    pub fn http() -> Self {
        Self {
            name: "aws_apigatewayv2_stage_structured_logging",
            resource_type: HTTP_STAGE,
            attribute_name: "format",
        }
    }
}

impl Rule for StageStructuredLogging {
    fn name(&self) -> &'static str {
        self.name
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/api_gateway/structured_logging/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let schema = BodySchema::new()
            .block_with(ACCESS_LOG_SETTINGS, BodySchema::new().attribute(self.attribute_name));
        let resources = runner.get_resource_content(self.resource_type, &schema)?;
        debug!(resource_type = self.resource_type, count = resources.len(), "stage resources");

        for resource in &resources {
            // Missing logging is reported by the logging rule.
            let Some(settings) = resource.body.first_block(ACCESS_LOG_SETTINGS) else { continue };

            let Some(attribute) = settings.body.attribute(self.attribute_name) else {
                runner.emit_issue(self, checks::not_present(self.attribute_name), settings.def_range.clone());
                continue;
            };

            let format = runner.evaluate_string(&attribute.expr)?;
            if !is_json_log_format(&format) {
                runner.emit_issue_on_expr(
                    self,
                    format!("\"{}\" is not valid JSON.", self.attribute_name),
                    &attribute.expr,
                );
            }
        }
        Ok(())
    }
}

/// REST stages must enable X-Ray tracing.
pub struct StageTracing {
    resource_type: &'static str,
    attribute_name: &'static str,
}

impl StageTracing {
    pub fn new() -> Self {
        Self { resource_type: REST_STAGE, attribute_name: "xray_tracing_enabled" }
    }
}

impl Rule for StageTracing {
    fn name(&self) -> &'static str {
        "aws_apigateway_stage_tracing_rule"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/api_gateway/tracing/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_value(self, runner, self.resource_type, self.attribute_name, "true")
    }
}

/// HTTP stages must set default route throttling.
pub struct StageV2Throttling {
    resource_type: &'static str,
    block_name: &'static str,
    burst_attribute: &'static str,
    rate_attribute: &'static str,
}

impl StageV2Throttling {
    pub fn new() -> Self {
        Self {
            resource_type: HTTP_STAGE,
            block_name: "default_route_settings",
            burst_attribute: "throttling_burst_limit",
            rate_attribute: "throttling_rate_limit",
        }
    }
}

impl Rule for StageV2Throttling {
    fn name(&self) -> &'static str {
        "aws_apigatewayv2_stage_throttling_rule"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/api_gateway/default_throttling/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let schema = BodySchema::new().block_with(
            self.block_name,
            BodySchema::new().attribute(self.burst_attribute).attribute(self.rate_attribute),
        );
        let resources = runner.get_resource_content(self.resource_type, &schema)?;
        debug!(count = resources.len(), "aws_apigatewayv2_stage resources");

        for resource in &resources {
            let Some(settings) = resource.body.first_block(self.block_name) else {
                runner.emit_issue(self, checks::not_present(self.block_name), resource.def_range.clone());
                continue;
            };
            for attribute in [self.burst_attribute, self.rate_attribute] {
                if settings.body.attribute(attribute).is_none() {
                    runner.emit_issue(self, checks::not_present(attribute), settings.def_range.clone());
                }
            }
        }
        Ok(())
    }
}
