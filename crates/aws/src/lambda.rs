//! Lambda function, permission and event source rules.

use std::collections::BTreeMap;

use slslint_core::{BodySchema, Expression, Result, Rule, Runner, Severity};
use tracing::debug;

use crate::checks;

const FUNCTION: &str = "aws_lambda_function";
const PERMISSION: &str = "aws_lambda_permission";

/// Service principals that invoke functions asynchronously.
const ASYNC_PRINCIPALS: &[&str] = &[
    "events.amazonaws.com",
    "iot.amazonaws.com",
    "s3.amazonaws.com",
    "sns.amazonaws.com",
    "events.amazonaws.com.cn",
    "iot.amazonaws.com.cn",
    "s3.amazonaws.com.cn",
    "sns.amazonaws.com.cn",
];

const EOL_RUNTIMES: &[&str] = &[
    "dotnetcore1.0",
    "dotnetcore2.0",
    "dotnetcore2.1",
    "nodejs",
    "nodejs4.3",
    "nodejs4.3-edge",
    "nodejs6.10",
    "nodejs8.10",
    "nodejs10.x",
    "python2.7",
    "ruby2.5",
];

struct AsyncPermission {
    function_name: String,
    expr: Expression,
    found: bool,
}

/// Functions invoked asynchronously need an on-failure destination.
pub struct EventInvokeConfigAsyncOnFailure {
    config_resource_type: &'static str,
    function_name_attribute: &'static str,
    principal_attribute: &'static str,
    blocks: [&'static str; 2],
    destination_attribute: &'static str,
}

impl EventInvokeConfigAsyncOnFailure {
    pub fn new() -> Self {
        Self {
            config_resource_type: "aws_lambda_function_event_invoke_config",
            function_name_attribute: "function_name",
            principal_attribute: "principal",
            blocks: ["destination_config", "on_failure"],
            destination_attribute: "destination",
        }
    }

    fn async_permissions(&self, runner: &mut dyn Runner) -> Result<Vec<AsyncPermission>> {
        let schema = BodySchema::new()
            .attribute(self.function_name_attribute)
            .attribute(self.principal_attribute);
        let resources = runner.get_resource_content(PERMISSION, &schema)?;

        let mut permissions = Vec::new();
        for resource in &resources {
            let Some(principal) = resource.body.attribute(self.principal_attribute) else {
                runner.emit_issue(self, checks::not_present(self.principal_attribute), resource.def_range.clone());
                continue;
            };
            let principal = runner.evaluate_string(&principal.expr)?;
            if !ASYNC_PRINCIPALS.contains(&principal.as_str()) {
                continue;
            }

            let Some(function_name) = resource.body.attribute(self.function_name_attribute) else {
                runner.emit_issue(self, checks::not_present(self.function_name_attribute), resource.def_range.clone());
                continue;
            };
            permissions.push(AsyncPermission {
                function_name: runner.evaluate_string(&function_name.expr)?,
                expr: function_name.expr.clone(),
                found: false,
            });
        }
        Ok(permissions)
    }
}

impl Rule for EventInvokeConfigAsyncOnFailure {
    fn name(&self) -> &'static str {
        "aws_lambda_event_invoke_config_async_on_failure"
    }

    fn enabled(&self) -> bool {
        false
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/async_failure_destination/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let mut permissions = self.async_permissions(runner)?;
        debug!(count = permissions.len(), "async lambda permissions");

        let schema = checks::nested_schema(&self.blocks, self.destination_attribute)
            .attribute(self.function_name_attribute);
        let configs = runner.get_resource_content(self.config_resource_type, &schema)?;

        for config in &configs {
            let Some(function_name) = config.body.attribute(self.function_name_attribute) else {
                runner.emit_issue(self, checks::not_present(self.function_name_attribute), config.def_range.clone());
                continue;
            };
            let function_name = runner.evaluate_string(&function_name.expr)?;

            let mut matched = false;
            for permission in permissions.iter_mut().filter(|p| p.function_name == function_name) {
                permission.found = true;
                matched = true;
            }
            if !matched {
                continue;
            }

            if let Some((message, range)) =
                checks::first_missing(&config.body, &config.def_range, &self.blocks, self.destination_attribute)
            {
                runner.emit_issue(self, message, range);
            }
        }

        for permission in permissions.iter().filter(|p| !p.found) {
            runner.emit_issue_on_expr(
                self,
                format!(
                    "missing \"{}\" resource for {}.",
                    self.config_resource_type, self.function_name_attribute
                ),
                &permission.expr,
            );
        }
        Ok(())
    }
}

/// Event source mappings need an on-failure destination.
pub struct EventSourceMappingFailureDestination {
    resource_type: &'static str,
    blocks: [&'static str; 2],
    attribute_name: &'static str,
}

impl EventSourceMappingFailureDestination {
    pub fn new() -> Self {
        Self {
            resource_type: "aws_lambda_event_source_mapping",
            blocks: ["destination_config", "on_failure"],
            attribute_name: "destination_arn",
        }
    }
}

impl Rule for EventSourceMappingFailureDestination {
    fn name(&self) -> &'static str {
        "aws_lambda_event_source_mapping_failure_destination"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/eventsourcemapping_failure_destination/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_path(self, runner, self.resource_type, &self.blocks, self.attribute_name)
    }
}

/// The platform default memory size is rarely the right one.
pub struct FunctionDefaultMemory {
    attribute_name: &'static str,
}

impl FunctionDefaultMemory {
    pub fn new() -> Self {
        Self { attribute_name: "memory_size" }
    }
}

impl Rule for FunctionDefaultMemory {
    fn name(&self) -> &'static str {
        "aws_lambda_function_default_memory"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/default_memory_size/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_attribute(self, runner, FUNCTION, self.attribute_name)
    }
}

pub struct FunctionDefaultTimeout {
    attribute_name: &'static str,
}

impl FunctionDefaultTimeout {
    pub fn new() -> Self {
        Self { attribute_name: "timeout" }
    }
}

impl Rule for FunctionDefaultTimeout {
    fn name(&self) -> &'static str {
        "aws_lambda_function_default_timeout"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/default_timeout/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_attribute(self, runner, FUNCTION, self.attribute_name)
    }
}

pub struct FunctionEolRuntime {
    attribute_name: &'static str,
}

impl FunctionEolRuntime {
    pub fn new() -> Self {
        Self { attribute_name: "runtime" }
    }
}

impl Rule for FunctionEolRuntime {
    fn name(&self) -> &'static str {
        "aws_lambda_function_eol_runtime"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/end_of_life_runtime/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let resources = runner.get_resource_content(FUNCTION, &BodySchema::new().attribute(self.attribute_name))?;
        debug!(count = resources.len(), "aws_lambda_function resources");

        for resource in &resources {
            // Container image functions have no runtime.
            let Some(attribute) = resource.body.attribute(self.attribute_name) else { continue };
            let runtime = runner.evaluate_string(&attribute.expr)?;
            if EOL_RUNTIMES.contains(&runtime.as_str()) {
                runner.emit_issue_on_expr(self, format!("\"{}\" is an end-of-life runtime.", runtime), &attribute.expr);
            }
        }
        Ok(())
    }
}

/// Functions must run with active X-Ray tracing.
pub struct FunctionTracing {
    block_name: &'static str,
    attribute_name: &'static str,
    expected: &'static str,
}

impl FunctionTracing {
    pub fn new() -> Self {
        Self { block_name: "tracing_config", attribute_name: "mode", expected: "Active" }
    }
}

impl Rule for FunctionTracing {
    fn name(&self) -> &'static str {
        "aws_lambda_function_tracing_rule"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/tracing/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let schema = checks::nested_schema(&[self.block_name], self.attribute_name);
        let resources = runner.get_resource_content(FUNCTION, &schema)?;
        debug!(count = resources.len(), "aws_lambda_function resources");

        let qualified = format!("{}.{}", self.block_name, self.attribute_name);
        for resource in &resources {
            let Some(config) = resource.body.first_block(self.block_name) else {
                runner.emit_issue(self, checks::not_present(self.block_name), resource.def_range.clone());
                continue;
            };
            let Some(mode) = config.body.attribute(self.attribute_name) else {
                runner.emit_issue(self, checks::not_present(&qualified), config.def_range.clone());
                continue;
            };
            if runner.evaluate_string(&mode.expr)? != self.expected {
                runner.emit_issue_on_expr(
                    self,
                    format!("\"{}\" should be set to {}.", qualified, self.expected),
                    &mode.expr,
                );
            }
        }
        Ok(())
    }
}

/// A function should be invoked through a single service principal.
pub struct PermissionMultiplePrincipals {
    principal_attribute: &'static str,
    function_name_attribute: &'static str,
}

impl PermissionMultiplePrincipals {
    pub fn new() -> Self {
        Self { principal_attribute: "principal", function_name_attribute: "function_name" }
    }
}

impl Rule for PermissionMultiplePrincipals {
    fn name(&self) -> &'static str {
        "aws_lambda_permission_multiple_principals"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/lambda/permission_multiple_principals/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        let schema = BodySchema::new()
            .attribute(self.principal_attribute)
            .attribute(self.function_name_attribute);
        let resources = runner.get_resource_content(PERMISSION, &schema)?;
        debug!(count = resources.len(), "aws_lambda_permission resources");

        // function name -> principal -> principal expressions
        let mut permissions: BTreeMap<String, BTreeMap<String, Vec<Expression>>> = BTreeMap::new();
        for resource in &resources {
            let Some(principal) = resource.body.attribute(self.principal_attribute) else {
                runner.emit_issue(self, checks::not_present(self.principal_attribute), resource.def_range.clone());
                continue;
            };
            let principal_value = runner.evaluate_string(&principal.expr)?;

            let Some(function_name) = resource.body.attribute(self.function_name_attribute) else {
                runner.emit_issue(self, checks::not_present(self.function_name_attribute), resource.def_range.clone());
                continue;
            };
            let function_name = runner.evaluate_string(&function_name.expr)?;

            permissions
                .entry(function_name)
                .or_default()
                .entry(principal_value)
                .or_default()
                .push(principal.expr.clone());
        }

        let message = format!(
            "different \"{}\" values for the same {}.",
            self.principal_attribute, self.function_name_attribute
        );
        for by_principal in permissions.values().filter(|p| p.len() > 1) {
            for expr in by_principal.values().flatten() {
                runner.emit_issue_on_expr(self, message.clone(), expr);
            }
        }
        Ok(())
    }
}
