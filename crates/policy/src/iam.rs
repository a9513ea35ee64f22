use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

lazy_static! {
    static ref SERVICE_STAR: Regex = Regex::new(r"^[A-Za-z0-9-]+:\*$").unwrap();
}

/// IAM fields that accept either a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v).iter(),
            OneOrMany::Many(v) => v.iter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// `"Principal": "*"`
    Wildcard(String),
    Map(BTreeMap<String, OneOrMany<String>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub action: Option<OneOrMany<String>>,
    #[serde(default)]
    pub principal: Option<Principal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub statement: OneOrMany<Statement>,
}

/// `*` or a whole-service wildcard such as `dynamodb:*`.
pub fn is_star_action(action: &str) -> bool {
    action == "*" || SERVICE_STAR.is_match(action)
}

impl Statement {
    pub fn has_service_principal(&self, services: &[&str]) -> bool {
        match &self.principal {
            Some(Principal::Map(m)) => m
                .get("Service")
                .map_or(false, |s| s.iter().any(|v| services.contains(&v.as_str()))),
            _ => false,
        }
    }

    pub fn has_star_action(&self) -> bool {
        self.action
            .as_ref()
            .map_or(false, |a| a.iter().any(|v| is_star_action(v)))
    }
}

impl PolicyDocument {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn has_service_principal(&self, services: &[&str]) -> bool {
        self.statement.iter().any(|s| s.has_service_principal(services))
    }

    /// True when any statement names a wildcard action, whatever its effect.
    pub fn has_star_action(&self) -> bool {
        self.statement.iter().any(Statement::has_star_action)
    }
}
