use slslint_core::{Result, Rule, Runner, Severity};

use crate::checks;

/// GraphQL APIs must enable X-Ray tracing.
pub struct GraphqlApiTracing {
    resource_type: &'static str,
    attribute_name: &'static str,
}

impl GraphqlApiTracing {
    pub fn new() -> Self {
        Self { resource_type: "aws_appsync_graphql_api", attribute_name: "xray_enabled" }
    }
}

impl Rule for GraphqlApiTracing {
    fn name(&self) -> &'static str {
        "aws_appsync_graphql_api_tracing_rule"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn link(&self) -> &'static str {
        "https://awslabs.github.io/serverless-rules/rules/appsync/tracing/"
    }

    fn check(&self, runner: &mut dyn Runner) -> Result<()> {
        checks::require_value(self, runner, self.resource_type, self.attribute_name, "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{found, issue, r};
    use pretty_assertions::assert_eq;
    use slslint_core::{Expression, Value};
    use slslint_tfcompat::builder::{resource, snapshot};

    #[test]
    fn tracing_enabled() {
        let snap = snapshot([resource("aws_appsync_graphql_api", "this")
            .attr("name", Expression::literal("example", r(3, 10, 3, 19)))
            .attr("xray_enabled", Expression::literal(true, r(4, 18, 4, 22)))]);
        assert_eq!(found(&GraphqlApiTracing::new(), snap), vec![]);
    }

    #[test]
    fn tracing_from_variable() {
        let mut snap = snapshot([resource("aws_appsync_graphql_api", "this")
            .attr("xray_enabled", Expression::traversal("var.tracing", r(4, 18, 4, 29)))]);
        snap.variables.insert("tracing".into(), Value::from(false));
        assert_eq!(
            found(&GraphqlApiTracing::new(), snap),
            vec![issue("\"xray_enabled\" should be set to true.", r(4, 18, 4, 29))]
        );
    }

    #[test]
    fn tracing_missing() {
        let snap = snapshot([resource("aws_appsync_graphql_api", "this").at(r(2, 1, 2, 40))]);
        assert_eq!(
            found(&GraphqlApiTracing::new(), snap),
            vec![issue("\"xray_enabled\" is not present.", r(2, 1, 2, 40))]
        );
    }
}
