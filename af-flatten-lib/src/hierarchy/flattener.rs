use super::{Attribute, Document, Element, FlatRecord, HierarchyError, UnnamedSentinels, resolved_name};
use std::rc::Rc;

/// The element an attribute subtree hangs off.
struct Owner<'a> {
    path: String,
    name: &'a str,
    template: Option<&'a str>,
}

/// A pending unit of work on the traversal stack.
enum Visit<'a> {
    Element {
        element: &'a Element,
        parent_path: String,
    },
    Attribute {
        attribute: &'a Attribute,
        owner: Rc<Owner<'a>>,
        prefix: String,
    },
}

/// Turns an element hierarchy into one [`FlatRecord`] per attribute.
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    sentinels: UnnamedSentinels,
}

impl Flattener {
    #[must_use]
    pub const fn new(sentinels: UnnamedSentinels) -> Self {
        Self { sentinels }
    }

    /// Flatten the top-level elements of a document.
    ///
    /// Records come out in document order, pre-order: an element's attributes (each
    /// followed by its nested attributes) come before its child elements.
    #[must_use]
    pub fn flatten(&self, root_elements: &[Element]) -> Vec<FlatRecord> {
        let mut records = Vec::new();
        let mut stack: Vec<Visit<'_>> = root_elements
            .iter()
            .rev()
            .map(|element| Visit::Element {
                element,
                parent_path: String::new(),
            })
            .collect();

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Element { element, parent_path } => {
                    let name = resolved_name(element.name.as_deref())
                        .unwrap_or_else(|| self.sentinels.element(parent_path.is_empty()));
                    let path = join_path(&parent_path, name);

                    // Pushed first so they are popped after every attribute subtree of this element.
                    for child in element.elements.iter().rev() {
                        stack.push(Visit::Element {
                            element: child,
                            parent_path: path.clone(),
                        });
                    }

                    let owner = Rc::new(Owner {
                        path,
                        name,
                        template: element.template.as_deref(),
                    });

                    for attribute in element.attributes.iter().rev() {
                        stack.push(Visit::Attribute {
                            attribute,
                            owner: Rc::clone(&owner),
                            prefix: String::new(),
                        });
                    }
                }

                Visit::Attribute { attribute, owner, prefix } => {
                    let name = resolved_name(attribute.name.as_deref()).unwrap_or(self.sentinels.attribute);
                    let path = join_path(&prefix, name);

                    for nested in attribute.attributes.iter().rev() {
                        stack.push(Visit::Attribute {
                            attribute: nested,
                            owner: Rc::clone(&owner),
                            prefix: path.clone(),
                        });
                    }

                    records.push(record(&owner, path, name, attribute));
                }
            }
        }

        log::debug!(
            "flattened {} top-level element(s) into {} record(s)",
            root_elements.len(),
            records.len()
        );

        records
    }

    /// Flatten a parsed document, failing if it lacks its root container.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::StructureError`] when the document has no root container;
    /// no records are produced in that case.
    pub fn flatten_document(&self, document: &Document) -> Result<Vec<FlatRecord>, HierarchyError> {
        let root_elements = document.root_elements()?;
        Ok(self.flatten(root_elements))
    }
}

/// Flatten with the default (legacy) placeholder names.
#[must_use]
pub fn flatten(root_elements: &[Element]) -> Vec<FlatRecord> {
    Flattener::default().flatten(root_elements)
}

/// Flatten a parsed document with the default (legacy) placeholder names.
///
/// # Errors
///
/// Returns [`HierarchyError::StructureError`] when the document has no root container.
pub fn flatten_document(document: &Document) -> Result<Vec<FlatRecord>, HierarchyError> {
    Flattener::default().flatten_document(document)
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn record(owner: &Owner<'_>, attribute_path: String, attribute_name: &str, attribute: &Attribute) -> FlatRecord {
    let fields = &attribute.fields;
    FlatRecord {
        element_path: owner.path.clone(),
        element_name: owner.name.to_string(),
        element_template: owner.template.map(str::to_string),
        attribute_path,
        attribute_name: attribute_name.to_string(),
        attribute_type: fields.attribute_type.clone(),
        data_reference: fields.data_reference.clone(),
        config_string: fields.config_string.clone(),
        static_value: fields.static_value.clone(),
        description: fields.description.clone(),
    }
}
