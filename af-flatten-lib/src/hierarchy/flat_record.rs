use crate::table::Column;
use serde::Serialize;

/// One output row: a single attribute with its full ancestry and scalar metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    /// Slash-joined names of the element chain, root-most element first.
    pub element_path: String,

    /// Name of the nearest enclosing element.
    pub element_name: String,

    /// Template of the nearest enclosing element.
    pub element_template: Option<String>,

    /// Slash-joined names of the attribute chain, starting at the attribute owned by the element.
    pub attribute_path: String,

    /// This attribute's own name.
    pub attribute_name: String,

    pub attribute_type: Option<String>,
    pub data_reference: Option<String>,
    pub config_string: Option<String>,
    pub static_value: Option<String>,
    pub description: Option<String>,
}

impl FlatRecord {
    /// The value this record holds for `column`, `None` when null.
    #[must_use]
    pub fn get(&self, column: Column) -> Option<&str> {
        match column {
            Column::ElementPath => Some(&self.element_path),
            Column::ElementName => Some(&self.element_name),
            Column::ElementTemplate => self.element_template.as_deref(),
            Column::AttributePath => Some(&self.attribute_path),
            Column::AttributeName => Some(&self.attribute_name),
            Column::AttributeType => self.attribute_type.as_deref(),
            Column::DataReference => self.data_reference.as_deref(),
            Column::ConfigString => self.config_string.as_deref(),
            Column::StaticValue => self.static_value.as_deref(),
            Column::Description => self.description.as_deref(),
        }
    }
}
