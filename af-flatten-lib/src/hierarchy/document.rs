use super::{Element, HierarchyError};

/// Tag of the root container that holds the top-level elements.
pub const ROOT_CONTAINER_TAG: &str = "AFDatabase";

/// The root container of an AF export (`AFDatabase`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    /// The database `Name`, if the export carries one.
    pub name: Option<String>,

    /// Top-level elements, in document order.
    pub elements: Vec<Element>,
}

/// A parsed AF export.
///
/// `database` is `None` when the document's root element has no `AFDatabase` child,
/// i.e. the document is not an AF export at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Tag name of the document's root element.
    pub root_tag: String,

    pub database: Option<Database>,
}

impl Document {
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self {
            root_tag: "AF".to_string(),
            database: Some(database),
        }
    }

    /// The top-level elements directly under the root container.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::StructureError`] if the root container is missing.
    pub fn root_elements(&self) -> Result<&[Element], HierarchyError> {
        self.database
            .as_ref()
            .map(|db| db.elements.as_slice())
            .ok_or_else(|| HierarchyError::StructureError {
                container: ROOT_CONTAINER_TAG,
                root_tag: self.root_tag.clone(),
            })
    }
}
