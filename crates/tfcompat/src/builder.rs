//! Fluent construction of snapshot content, mostly for tests.
//!
//! ```
//! use slslint_core::{Expression, Range};
//! use slslint_tfcompat::builder::{block, resource, snapshot};
//!
//! let snap = snapshot([resource("aws_lambda_function", "this")
//!     .at(Range::new("main.tf", (1, 1), (1, 38)))
//!     .attr("timeout", Expression::literal(30, Range::new("main.tf", (2, 13), (2, 15))))
//!     .block(block("tracing_config").at(Range::new("main.tf", (3, 3), (3, 17))))]);
//! assert_eq!(snap.resources.len(), 1);
//! ```

use slslint_core::{Attribute, Block, Body, Expression, Range};

use crate::Snapshot;

#[derive(Debug, Clone)]
pub struct BlockBuilder {
    block: Block,
}

pub fn resource(resource_type: &str, name: &str) -> BlockBuilder {
    BlockBuilder {
        block: Block {
            type_name: "resource".to_string(),
            labels: vec![resource_type.to_string(), name.to_string()],
            body: Body::default(),
            def_range: Range::default(),
        },
    }
}

pub fn block(type_name: &str) -> BlockBuilder {
    BlockBuilder {
        block: Block {
            type_name: type_name.to_string(),
            labels: Vec::new(),
            body: Body::default(),
            def_range: Range::default(),
        },
    }
}

impl BlockBuilder {
    pub fn at(mut self, def_range: Range) -> Self {
        self.block.def_range = def_range;
        self
    }

    /// Adds an attribute spanning its expression.
    pub fn attr(mut self, name: &str, expr: Expression) -> Self {
        let range = expr.range.clone();
        self.block.body.attributes.push(Attribute { name: name.to_string(), expr, range });
        self
    }

    pub fn block(mut self, child: BlockBuilder) -> Self {
        self.block.body.blocks.push(child.build());
        self
    }

    pub fn build(self) -> Block {
        self.block
    }
}

pub fn snapshot(resources: impl IntoIterator<Item = BlockBuilder>) -> Snapshot {
    Snapshot {
        variables: Default::default(),
        resources: resources.into_iter().map(BlockBuilder::build).collect(),
    }
}
