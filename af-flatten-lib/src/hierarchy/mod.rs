//! PI AF hierarchy model and the flattening core
//!
//! This module holds the in-memory form of an AF export (a [`Document`] whose
//! root container owns a sequence of top-level [`Element`]s) and the
//! [`Flattener`] that turns it into one [`FlatRecord`] per attribute.
//!
//! # Implementation Model
//!
//! Elements own child elements and attributes; attributes own nested
//! attributes. Both are immutable once parsed. Flattening walks the tree in
//! document order, pre-order, using an explicit work stack rather than the call
//! stack, so a pathologically deep export cannot overflow the thread stack.
//!
//! Every attribute yields exactly one record. The record carries the slash-joined
//! path of its enclosing element chain and the slash-joined path of its attribute
//! chain, which restarts at each element.
//!
//! Missing names never fail the traversal; they are replaced by the sentinels
//! described by [`UnnamedSentinels`]. The only hard failure is a document that
//! lacks its root container, reported as [`HierarchyError::StructureError`].

mod attribute;
mod document;
mod element;
mod error;
mod flat_record;
mod flattener;
mod sentinels;

pub use attribute::{Attribute, AttributeFields};
pub use document::{Database, Document, ROOT_CONTAINER_TAG};
pub use element::Element;
pub use error::HierarchyError;
pub use flat_record::FlatRecord;
pub use flattener::{Flattener, flatten, flatten_document};
pub use sentinels::{SentinelStyle, UnnamedSentinels};

/// The two kinds of node found in an AF hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum NodeKind {
    /// A named container modelling a physical or logical asset.
    Element,

    /// A named, typed value owned by an element or by another attribute.
    Attribute,
}

/// Trim a raw name and treat blank text as absent.
fn resolved_name(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
