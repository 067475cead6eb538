use thiserror::Error;

/// Failures that prevent an AF document from being flattened at all.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// The document lacks the container node that anchors the hierarchy.
    #[error("expected container node not found: no <{container}> under <{root_tag}>; is this a PI AF export?")]
    StructureError { container: &'static str, root_tag: String },

    /// The document is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: usize, message: String },

    /// The document ended while elements were still open.
    #[error("document ended inside <{open_tag}>")]
    Truncated { open_tag: String },

    /// The document has no root element.
    #[error("document contains no root element")]
    Empty,
}

impl HierarchyError {
    /// Returns `true` for the missing-container failure.
    #[must_use]
    pub const fn is_structure_error(&self) -> bool {
        matches!(self, Self::StructureError { .. })
    }
}
