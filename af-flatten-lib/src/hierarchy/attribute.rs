/// The scalar metadata carried by an attribute, each field independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeFields {
    /// `Type`
    pub attribute_type: Option<String>,

    /// `DataReference`
    pub data_reference: Option<String>,

    /// `ConfigString`
    pub config_string: Option<String>,

    /// `Value`
    pub static_value: Option<String>,

    /// `Description`
    pub description: Option<String>,
}

/// An AF attribute: a named value that may hold nested attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute's `Name`, exactly as found in the source (may be blank).
    pub name: Option<String>,

    pub fields: AttributeFields,

    /// Nested attributes, in document order.
    pub attributes: Vec<Self>,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            fields: AttributeFields::default(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, attribute_type: impl Into<String>) -> Self {
        self.fields.attribute_type = Some(attribute_type.into());
        self
    }

    #[must_use]
    pub fn with_data_reference(mut self, data_reference: impl Into<String>) -> Self {
        self.fields.data_reference = Some(data_reference.into());
        self
    }

    #[must_use]
    pub fn with_config_string(mut self, config_string: impl Into<String>) -> Self {
        self.fields.config_string = Some(config_string.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.fields.static_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.fields.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Self) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Number of attributes in this subtree, this one included.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&Self> = vec![self];
        while let Some(attribute) = pending.pop() {
            count += 1;
            pending.extend(attribute.attributes.iter());
        }

        count
    }
}

impl Drop for Attribute {
    fn drop(&mut self) {
        let mut pending = core::mem::take(&mut self.attributes);
        while let Some(mut attribute) = pending.pop() {
            pending.append(&mut attribute.attributes);
        }
    }
}
