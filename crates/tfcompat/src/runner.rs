use lazy_static::lazy_static;
use regex::Regex;
use slslint_core::{
    Block, BodySchema, Error, ExprKind, Expression, Issue, Range, Result, Rule, Runner, Value,
};
use tracing::debug;

use crate::Snapshot;

lazy_static! {
    static ref INTERPOLATION: Regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
}

const MAX_REFERENCE_DEPTH: usize = 8;

/// Serves snapshot content to rules and collects the issues they emit.
///
/// Evaluation is static: literals evaluate to themselves, `var.<name>` and
/// `<type>.<name>.<attribute>` references resolve against the snapshot, and
/// template interpolations that cannot be resolved are kept verbatim.
#[derive(Debug, Default)]
pub struct SnapshotRunner {
    snapshot: Snapshot,
    issues: Vec<Issue>,
}

impl SnapshotRunner {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, issues: Vec::new() }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    fn resolve(&self, expr: &Expression, depth: usize) -> Result<Value> {
        if depth > MAX_REFERENCE_DEPTH {
            return Err(Error::ReferenceDepth { expr: expr.to_string() });
        }
        match &expr.kind {
            ExprKind::Literal(v) => Ok(v.clone()),
            ExprKind::Traversal(reference) => self.resolve_reference(reference.trim(), &expr.range, depth),
            ExprKind::Template(source) => {
                if source.contains("%{") {
                    return Err(Error::Unsupported { expr: expr.to_string(), range: expr.range.clone() });
                }
                self.render_template(source, &expr.range, depth).map(Value::String)
            }
        }
    }

    fn render_template(&self, source: &str, range: &Range, depth: usize) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        for caps in INTERPOLATION.captures_iter(source) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else { continue };
            out.push_str(&source[last..whole.start()]);
            match self.resolve_reference(inner.as_str().trim(), range, depth) {
                Ok(v) => out.push_str(&v.to_string_lossy()),
                Err(Error::UnknownValue { .. }) => out.push_str(whole.as_str()),
                Err(e) => return Err(e),
            }
            last = whole.end();
        }
        out.push_str(&source[last..]);
        Ok(out)
    }

    fn resolve_reference(&self, reference: &str, range: &Range, depth: usize) -> Result<Value> {
        let unknown = || Error::UnknownValue { expr: reference.to_string(), range: range.clone() };
        let parts: Vec<&str> = reference.split('.').collect();
        match parts.as_slice() {
            ["var", name] => self.snapshot.variables.get(*name).cloned().ok_or_else(unknown),
            [resource_type, name, attribute] => {
                let attr = self
                    .snapshot
                    .resources
                    .iter()
                    .find(|b| b.resource_type() == Some(*resource_type) && b.resource_name() == Some(*name))
                    .and_then(|b| b.body.attribute(attribute))
                    .ok_or_else(unknown)?;
                self.resolve(&attr.expr, depth + 1)
            }
            _ => Err(unknown()),
        }
    }
}

impl Runner for SnapshotRunner {
    fn get_resource_content(&self, resource_type: &str, schema: &BodySchema) -> Result<Vec<Block>> {
        let blocks: Vec<Block> = self
            .snapshot
            .resources
            .iter()
            .filter(|b| b.type_name == "resource" && b.resource_type() == Some(resource_type))
            .map(|b| Block {
                type_name: b.type_name.clone(),
                labels: b.labels.clone(),
                body: b.body.partial(schema),
                def_range: b.def_range.clone(),
            })
            .collect();
        debug!(resource_type, count = blocks.len(), "resource content");
        Ok(blocks)
    }

    fn evaluate_expr(&self, expr: &Expression) -> Result<Value> {
        self.resolve(expr, 0)
    }

    fn emit_issue(&mut self, rule: &dyn Rule, message: String, range: Range) {
        debug!(rule = rule.name(), %range, %message, "issue");
        self.issues.push(Issue::new(rule, message, range));
    }
}
