use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info_span};

use crate::rule::{Rule, Runner};
use crate::{Error, Result};

/// Rule selection read from the user's configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub disabled_by_default: bool,
    /// When non-empty, only these rules run.
    #[serde(default)]
    pub only: Vec<String>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub enabled: bool,
}

impl Config {
    pub fn is_enabled(&self, rule: &dyn Rule) -> bool {
        let name = rule.name();
        if !self.only.is_empty() {
            return self.only.iter().any(|n| n == name);
        }
        match self.rules.get(name) {
            Some(rc) => rc.enabled,
            None if self.disabled_by_default => false,
            None => rule.enabled(),
        }
    }
}

/// Ordered registry of rules handed to the host.
pub struct RuleSet {
    pub name: &'static str,
    pub version: &'static str,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new(name: &'static str, version: &'static str, rules: Vec<Box<dyn Rule>>) -> Self {
        Self { name, version, rules }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn enabled_rules(&self, config: &Config) -> Result<Vec<&dyn Rule>> {
        for name in config.only.iter().chain(config.rules.keys()) {
            if !self.rules.iter().any(|r| r.name() == name) {
                return Err(Error::UnknownRule(name.clone()));
            }
        }
        Ok(self.rules().filter(|r| config.is_enabled(*r)).collect())
    }

    /// Runs every enabled rule in registry order, stopping at the first failure.
    pub fn check(&self, runner: &mut dyn Runner, config: &Config) -> Result<()> {
        let rules = self.enabled_rules(config)?;
        debug!(ruleset = self.name, enabled = rules.len(), "running rules");
        for rule in rules {
            let _span = info_span!("rule", name = rule.name()).entered();
            rule.check(runner).map_err(|e| Error::Rule {
                rule: rule.name().to_string(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Expression, Range, Value};
    use crate::rule::Severity;
    use crate::schema::BodySchema;

    struct Fixed {
        name: &'static str,
        default_on: bool,
    }

    impl Rule for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }
        fn enabled(&self) -> bool {
            self.default_on
        }
        fn severity(&self) -> Severity {
            Severity::Notice
        }
        fn link(&self) -> &'static str {
            ""
        }
        fn check(&self, runner: &mut dyn Runner) -> Result<()> {
            if self.name == "broken" {
                return Err(Error::Content { resource_type: "x".into(), message: "boom".into() });
            }
            runner.emit_issue(self, format!("{} ran", self.name), Range::default());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Sink(Vec<String>);

    impl Runner for Sink {
        fn get_resource_content(&self, _: &str, _: &BodySchema) -> Result<Vec<Block>> {
            Ok(vec![])
        }
        fn evaluate_expr(&self, _: &Expression) -> Result<Value> {
            Ok(Value::Bool(true))
        }
        fn emit_issue(&mut self, _: &dyn Rule, message: String, _: Range) {
            self.0.push(message);
        }
    }

    fn set(rules: &[(&'static str, bool)]) -> RuleSet {
        RuleSet::new(
            "test",
            "0.0.0",
            rules
                .iter()
                .map(|&(name, on)| Box::new(Fixed { name, default_on: on }) as Box<dyn Rule>)
                .collect(),
        )
    }

    #[test]
    fn defaults_apply_without_config() {
        let rs = set(&[("a", true), ("b", false)]);
        let mut sink = Sink::default();
        rs.check(&mut sink, &Config::default()).unwrap();
        assert_eq!(sink.0, vec!["a ran"]);
    }

    #[test]
    fn explicit_rule_config_wins() {
        let rs = set(&[("a", true), ("b", false)]);
        let mut config = Config { disabled_by_default: true, ..Config::default() };
        config.rules.insert("b".into(), RuleConfig { enabled: true });
        let names: Vec<_> = rs.enabled_rules(&config).unwrap().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn only_restricts_selection() {
        let rs = set(&[("a", true), ("b", false), ("c", true)]);
        let config = Config { only: vec!["c".into(), "b".into()], ..Config::default() };
        let names: Vec<_> = rs.enabled_rules(&config).unwrap().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let rs = set(&[("a", true)]);
        let config = Config { only: vec!["nope".into()], ..Config::default() };
        assert!(matches!(rs.enabled_rules(&config), Err(Error::UnknownRule(n)) if n == "nope"));
    }

    #[test]
    fn rule_error_carries_rule_name() {
        let rs = set(&[("a", true), ("broken", true), ("c", true)]);
        let mut sink = Sink::default();
        let err = rs.check(&mut sink, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Rule { ref rule, .. } if rule == "broken"));
        assert_eq!(sink.0, vec!["a ran"]);
    }
}
