use slslint_core::{Body, BodySchema, Range, Result, Rule, Runner};
use tracing::debug;

pub(crate) fn not_present(name: &str) -> String {
    format!("\"{}\" is not present.", name)
}

/// Schema for `blocks[0] { blocks[1] { ... { attribute } } }`.
pub(crate) fn nested_schema(blocks: &[&str], attribute: &str) -> BodySchema {
    match blocks.split_first() {
        None => BodySchema::new().attribute(attribute),
        Some((first, rest)) => BodySchema::new().block_with(*first, nested_schema(rest, attribute)),
    }
}

/// Walks `blocks` down from `body` and returns the message and anchor for the
/// first missing element, or `None` when `attribute` is present at the end.
pub(crate) fn first_missing(body: &Body, def_range: &Range, blocks: &[&str], attribute: &str) -> Option<(String, Range)> {
    let mut body = body;
    let mut anchor = def_range;
    for name in blocks {
        let block = match body.first_block(name) {
            Some(b) => b,
            None => return Some((not_present(name), anchor.clone())),
        };
        body = &block.body;
        anchor = &block.def_range;
    }
    match body.attribute(attribute) {
        Some(_) => None,
        None => Some((not_present(attribute), anchor.clone())),
    }
}

/// One issue per resource missing `attribute`, anchored at the resource.
pub(crate) fn require_attribute(rule: &dyn Rule, runner: &mut dyn Runner, resource_type: &str, attribute: &str) -> Result<()> {
    require_path(rule, runner, resource_type, &[], attribute)
}

/// One issue per resource at the first missing element of `blocks` then `attribute`.
pub(crate) fn require_path(
    rule: &dyn Rule,
    runner: &mut dyn Runner,
    resource_type: &str,
    blocks: &[&str],
    attribute: &str,
) -> Result<()> {
    let resources = runner.get_resource_content(resource_type, &nested_schema(blocks, attribute))?;
    debug!(resource_type, count = resources.len(), "checking resources");
    for resource in &resources {
        if let Some((message, range)) = first_missing(&resource.body, &resource.def_range, blocks, attribute) {
            runner.emit_issue(rule, message, range);
        }
    }
    Ok(())
}

/// `attribute` must be present and evaluate to `expected`.
pub(crate) fn require_value(
    rule: &dyn Rule,
    runner: &mut dyn Runner,
    resource_type: &str,
    attribute: &str,
    expected: &str,
) -> Result<()> {
    let resources = runner.get_resource_content(resource_type, &BodySchema::new().attribute(attribute))?;
    debug!(resource_type, count = resources.len(), "checking resources");
    for resource in &resources {
        let attr = match resource.body.attribute(attribute) {
            Some(a) => a,
            None => {
                runner.emit_issue(rule, not_present(attribute), resource.def_range.clone());
                continue;
            }
        };
        if runner.evaluate_string(&attr.expr)? != expected {
            runner.emit_issue_on_expr(rule, format!("\"{}\" should be set to {}.", attribute, expected), &attr.expr);
        }
    }
    Ok(())
}

/// One issue per resource without at least one `block`.
pub(crate) fn require_block(rule: &dyn Rule, runner: &mut dyn Runner, resource_type: &str, block: &str) -> Result<()> {
    let resources = runner.get_resource_content(resource_type, &BodySchema::new().block(block))?;
    debug!(resource_type, count = resources.len(), "checking resources");
    for resource in &resources {
        if resource.body.first_block(block).is_none() {
            runner.emit_issue(rule, not_present(block), resource.def_range.clone());
        }
    }
    Ok(())
}
