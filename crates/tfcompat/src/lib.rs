//! Stand-in for the linter host: a serialized configuration snapshot and an
//! in-memory [`Runner`](slslint_core::Runner) over it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slslint_core::{Block, Config, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub mod builder;
mod runner;

pub use runner::SnapshotRunner;

/// Resource blocks as handed over by the host, ranges included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Values for `var.<name>` references.
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default)]
    pub resources: Vec<Block>,
}

impl Snapshot {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read snapshot {}", path.display()))?;
        let snapshot = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_yaml_str(&raw),
        };
        snapshot.with_context(|| format!("load snapshot {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        // Expression kinds are written as `{ literal: ... }` maps, not YAML tags.
        let snapshot: Snapshot = serde_yaml::with::singleton_map_recursive::deserialize(
            serde_yaml::Deserializer::from_str(raw),
        )
        .context("parse YAML snapshot")?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw).context("parse JSON snapshot")?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<()> {
        for (i, block) in self.resources.iter().enumerate() {
            if block.type_name != "resource" {
                anyhow::bail!("resources[{}]: expected a \"resource\" block, got \"{}\"", i, block.type_name);
            }
            if block.labels.len() != 2 {
                anyhow::bail!(
                    "resources[{}]: resource blocks take exactly two labels (type and name), got {}",
                    i,
                    block.labels.len()
                );
            }
        }
        Ok(())
    }
}

/// Reads the YAML rule configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_yaml::from_slice(&raw).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slslint_core::{ExprKind, Range};
    use std::io::Write;

    const SNAPSHOT: &str = r#"
variables:
  env: prod
resources:
  - type: resource
    labels: [aws_lambda_function, this]
    def_range:
      filename: main.tf
      start: { line: 1, column: 1 }
      end: { line: 1, column: 38 }
    body:
      attributes:
        - name: function_name
          expr:
            kind: { template: "orders-${var.env}" }
            range:
              filename: main.tf
              start: { line: 2, column: 19 }
              end: { line: 2, column: 37 }
        - name: memory_size
          expr:
            kind: { literal: 256 }
      blocks:
        - type: tracing_config
          def_range: { filename: main.tf, start: { line: 4, column: 3 }, end: { line: 4, column: 17 } }
"#;

    #[test]
    fn loads_yaml_snapshot() {
        let snapshot = Snapshot::from_yaml_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.variables.get("env"), Some(&Value::from("prod")));
        let function = &snapshot.resources[0];
        assert_eq!(function.resource_type(), Some("aws_lambda_function"));
        assert_eq!(function.resource_name(), Some("this"));
        assert_eq!(function.def_range, Range::new("main.tf", (1, 1), (1, 38)));
        let name = function.body.attribute("function_name").unwrap();
        assert_eq!(name.expr.kind, ExprKind::Template("orders-${var.env}".into()));
        let memory = function.body.attribute("memory_size").unwrap();
        assert_eq!(memory.expr.kind, ExprKind::Literal(Value::from(256)));
        assert_eq!(function.body.blocks[0].type_name, "tracing_config");
    }

    #[test]
    fn loads_yaml_snapshot_from_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "resources:\n  - type: resource\n    labels: [aws_appsync_graphql_api, this]\n    body:\n      attributes:\n        - name: xray_enabled\n          expr:\n            kind: {{ literal: true }}\n        - name: name\n          expr:\n            kind: {{ traversal: var.api_name }}\n"
        )
        .unwrap();
        let snapshot = Snapshot::from_path(file.path()).unwrap();
        let api = &snapshot.resources[0];
        assert_eq!(
            api.body.attribute("xray_enabled").unwrap().expr.kind,
            ExprKind::Literal(Value::Bool(true))
        );
        assert_eq!(
            api.body.attribute("name").unwrap().expr.kind,
            ExprKind::Traversal("var.api_name".into())
        );
    }

    #[test]
    fn loads_json_snapshot_from_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"resources": [{{"type": "resource", "labels": ["aws_sqs_queue", "q"]}}]}}"#
        )
        .unwrap();
        let snapshot = Snapshot::from_path(file.path()).unwrap();
        assert_eq!(snapshot.resources.len(), 1);
        assert!(snapshot.resources[0].body.attributes.is_empty());
    }

    #[test]
    fn rejects_resource_without_name_label() {
        let err = Snapshot::from_yaml_str("resources:\n  - type: resource\n    labels: [aws_sqs_queue]\n")
            .unwrap_err();
        assert!(err.to_string().contains("two labels"));
    }

    #[test]
    fn rejects_non_resource_block() {
        let err = Snapshot::from_yaml_str("resources:\n  - type: data\n    labels: [aws_iam_policy_document, x]\n")
            .unwrap_err();
        assert!(err.to_string().contains("expected a \"resource\" block"));
    }

    #[test]
    fn loads_rule_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "disabled_by_default: true\nrules:\n  aws_sqs_queue_redrive_policy:\n    enabled: true").unwrap();
        let config = load_config(file.path()).unwrap();
        assert!(config.disabled_by_default);
        assert!(config.only.is_empty());
        assert!(config.rules["aws_sqs_queue_redrive_policy"].enabled);
    }
}
