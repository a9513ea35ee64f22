//! Configuration model and rule contract shared by every serverless rule.
//!
//! Rules never parse configuration themselves. They ask a [`Runner`] for the
//! resource content they need, evaluate expressions through it and report
//! [`Issue`]s back to it.

mod model;
mod rule;
mod ruleset;
mod schema;

pub use model::{Attribute, Block, Body, ExprKind, Expression, Pos, Range, Value};
pub use rule::{Issue, Rule, Runner, Severity};
pub use ruleset::{Config, RuleConfig, RuleSet};
pub use schema::{AttributeSchema, BlockSchema, BodySchema};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{range}: unknown value for expression \"{expr}\"")]
    UnknownValue { expr: String, range: Range },
    #[error("{range}: unsupported expression \"{expr}\"")]
    Unsupported { expr: String, range: Range },
    #[error("reference chain too deep while evaluating \"{expr}\"")]
    ReferenceDepth { expr: String },
    #[error("failed to get \"{resource_type}\" resource content: {message}")]
    Content { resource_type: String, message: String },
    #[error("rule not found: {0}")]
    UnknownRule(String),
    #[error("failed to check \"{rule}\" rule: {source}")]
    Rule {
        rule: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
