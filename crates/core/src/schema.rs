/// Declarative description of the attributes and blocks a rule needs from a body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodySchema {
    pub attributes: Vec<AttributeSchema>,
    pub blocks: Vec<BlockSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSchema {
    pub type_name: String,
    /// `None` keeps the block header without any of its content.
    pub body: Option<BodySchema>,
}

impl BodySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttributeSchema { name: name.into() });
        self
    }

    pub fn block(mut self, type_name: impl Into<String>) -> Self {
        self.blocks.push(BlockSchema { type_name: type_name.into(), body: None });
        self
    }

    pub fn block_with(mut self, type_name: impl Into<String>, body: BodySchema) -> Self {
        self.blocks.push(BlockSchema { type_name: type_name.into(), body: Some(body) });
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    pub fn find_block(&self, type_name: &str) -> Option<&BlockSchema> {
        self.blocks.iter().find(|b| b.type_name == type_name)
    }
}
