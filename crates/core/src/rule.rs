use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Block, Expression, Range, Value};
use crate::schema::BodySchema;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Notice,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
        })
    }
}

/// A single finding. Issues are never mutated once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    pub link: String,
}

impl Issue {
    pub fn new(rule: &dyn Rule, message: impl Into<String>, range: Range) -> Self {
        Self {
            rule: rule.name().to_string(),
            severity: rule.severity(),
            message: message.into(),
            range,
            link: rule.link().to_string(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({}) [{}]", self.range, self.message, self.rule, self.severity)
    }
}

/// Configuration collaborator supplied by the host.
pub trait Runner {
    /// All `resource_type` resource blocks, each body reduced to `schema`.
    fn get_resource_content(&self, resource_type: &str, schema: &BodySchema) -> Result<Vec<Block>>;

    /// Resolves an expression to a literal. Fails when it cannot be resolved statically.
    fn evaluate_expr(&self, expr: &Expression) -> Result<Value>;

    fn emit_issue(&mut self, rule: &dyn Rule, message: String, range: Range);

    fn evaluate_string(&self, expr: &Expression) -> Result<String> {
        self.evaluate_expr(expr).map(|v| v.to_string_lossy())
    }

    fn emit_issue_on_expr(&mut self, rule: &dyn Rule, message: String, expr: &Expression) {
        self.emit_issue(rule, message, expr.range.clone());
    }
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the rule runs when the configuration says nothing about it.
    fn enabled(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity;

    fn link(&self) -> &'static str;

    fn check(&self, runner: &mut dyn Runner) -> Result<()>;
}
