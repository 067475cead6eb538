use super::Attribute;

/// An AF element: a named container of child elements and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// The element's `Name`, exactly as found in the source (may be blank).
    pub name: Option<String>,

    /// The element's `Template`, carried for display only.
    pub template: Option<String>,

    /// Child elements, in document order.
    pub elements: Vec<Self>,

    /// Attributes owned directly by this element, in document order.
    pub attributes: Vec<Attribute>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            template: None,
            elements: Vec::new(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Self) -> Self {
        self.elements.push(element);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Count of attributes reachable from this element, nested ones included.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&Self> = vec![self];
        while let Some(element) = pending.pop() {
            count += element.attributes.iter().map(Attribute::subtree_len).sum::<usize>();
            pending.extend(element.elements.iter());
        }

        count
    }
}

impl Drop for Element {
    // Unlink children before they drop so deep trees are freed without recursion.
    fn drop(&mut self) {
        let mut pending = core::mem::take(&mut self.elements);
        while let Some(mut element) = pending.pop() {
            pending.append(&mut element.elements);
        }
    }
}
