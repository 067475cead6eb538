use strum::{Display, EnumIter, IntoStaticStr};

/// Table columns, declared in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    ElementPath,
    ElementName,
    ElementTemplate,
    AttributePath,
    AttributeName,
    AttributeType,
    DataReference,
    ConfigString,
    StaticValue,
    Description,
}

impl Column {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}
