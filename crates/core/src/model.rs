use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::BodySchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    #[serde(default)]
    pub byte: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, byte: 0 }
    }
}

/// Source span of a configuration node, columns are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub start: Pos,
    #[serde(default)]
    pub end: Pos,
}

impl Range {
    pub fn new(filename: impl Into<String>, start: (usize, usize), end: (usize, usize)) -> Self {
        Self {
            filename: filename.into(),
            start: Pos::new(start.0, start.1),
            end: Pos::new(end.0, end.1),
        }
    }

    pub fn point(filename: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(filename, (line, column), (line, column))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{},{}-{},{}",
            self.filename, self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Literal produced by evaluating an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Value {
    /// String coercion used when a rule reads an attribute as text.
    pub fn to_string_lossy(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(Value),
    /// Quoted string, may contain `${...}` interpolations.
    Template(String),
    /// Bare reference such as `aws_lambda_function.this.function_name`.
    Traversal(String),
}

/// Unevaluated expression bound to an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExprKind,
    #[serde(default)]
    pub range: Range,
}

impl Expression {
    pub fn literal(value: impl Into<Value>, range: Range) -> Self {
        Self { kind: ExprKind::Literal(value.into()), range }
    }

    pub fn template(source: impl Into<String>, range: Range) -> Self {
        Self { kind: ExprKind::Template(source.into()), range }
    }

    pub fn traversal(source: impl Into<String>, range: Range) -> Self {
        Self { kind: ExprKind::Traversal(source.into()), range }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(Value::String(s)) => write!(f, "{s:?}"),
            ExprKind::Literal(v) => f.write_str(&v.to_string_lossy()),
            ExprKind::Template(s) => write!(f, "{s:?}"),
            ExprKind::Traversal(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub expr: Expression,
    #[serde(default)]
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub body: Body,
    #[serde(default)]
    pub def_range: Range,
}

impl Block {
    /// First label of a `resource` block, e.g. `aws_lambda_function`.
    pub fn resource_type(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Second label of a `resource` block, e.g. `this`.
    pub fn resource_name(&self) -> Option<&str> {
        self.labels.get(1).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Body {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn blocks_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| b.type_name == type_name)
    }

    pub fn first_block(&self, type_name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.type_name == type_name)
    }

    /// Copy of this body holding only what `schema` asks for.
    pub fn partial(&self, schema: &BodySchema) -> Body {
        let attributes = self
            .attributes
            .iter()
            .filter(|a| schema.has_attribute(&a.name))
            .cloned()
            .collect();
        let blocks = self
            .blocks
            .iter()
            .filter_map(|b| {
                let block_schema = schema.find_block(&b.type_name)?;
                let body = match &block_schema.body {
                    Some(inner) => b.body.partial(inner),
                    None => Body::default(),
                };
                Some(Block {
                    type_name: b.type_name.clone(),
                    labels: b.labels.clone(),
                    body,
                    def_range: b.def_range.clone(),
                })
            })
            .collect();
        Body { attributes, blocks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            expr: Expression::literal(value, Range::default()),
            range: Range::default(),
        }
    }

    #[test]
    fn partial_keeps_only_schema_members() {
        let body = Body {
            attributes: vec![attr("method_path", "*/*"), attr("rest_api_id", "abc")],
            blocks: vec![Block {
                type_name: "settings".into(),
                labels: vec![],
                body: Body {
                    attributes: vec![attr("throttling_burst_limit", "10"), attr("logging_level", "INFO")],
                    blocks: vec![],
                },
                def_range: Range::point("main.tf", 4, 2),
            }],
        };
        let schema = BodySchema::new()
            .attribute("method_path")
            .block_with("settings", BodySchema::new().attribute("throttling_burst_limit"));

        let partial = body.partial(&schema);
        assert_eq!(partial.attributes.len(), 1);
        assert!(partial.attribute("rest_api_id").is_none());
        let settings = partial.first_block("settings").unwrap();
        assert_eq!(settings.def_range, Range::point("main.tf", 4, 2));
        assert_eq!(settings.body.attributes, vec![attr("throttling_burst_limit", "10")]);
    }

    #[test]
    fn partial_block_header_only() {
        let body = Body {
            attributes: vec![],
            blocks: vec![Block {
                type_name: "access_log_settings".into(),
                labels: vec![],
                body: Body { attributes: vec![attr("format", "{}")], blocks: vec![] },
                def_range: Range::default(),
            }],
        };
        let partial = body.partial(&BodySchema::new().block("access_log_settings").block("tags"));
        assert_eq!(partial.blocks.len(), 1);
        assert!(partial.blocks[0].body.attributes.is_empty());
    }

    #[test]
    fn first_block_outlives_the_type_name() {
        let body = Body {
            attributes: vec![],
            blocks: vec![Block {
                type_name: "tracing_config".into(),
                labels: vec![],
                body: Body::default(),
                def_range: Range::point("main.tf", 6, 3),
            }],
        };
        let found = {
            let wanted = String::from("tracing_config");
            body.first_block(&wanted)
        };
        assert_eq!(found.map(|b| b.def_range.clone()), Some(Range::point("main.tf", 6, 3)));
        assert!(body.first_block("dead_letter_config").is_none());
    }

    #[test]
    fn value_string_coercion() {
        assert_eq!(Value::from(true).to_string_lossy(), "true");
        assert_eq!(Value::from(128).to_string_lossy(), "128");
        assert_eq!(Value::from("Active").to_string_lossy(), "Active");
    }

    #[test]
    fn range_display() {
        let r = Range::new("resource.tf", (4, 10), (4, 23));
        assert_eq!(r.to_string(), "resource.tf:4,10-4,23");
    }
}
