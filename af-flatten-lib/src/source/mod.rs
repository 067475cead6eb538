//! Loading AF exports
//!
//! A [`SourceLocation`] names either a URL or a local file. The [`SourceProvider`]
//! fetches the text (over HTTP with retries, or from disk), optionally keeps a local
//! copy, and hands it to [`parse_document`], a streaming parser that never recurses.

mod location;
mod provider;
mod resilient_http;
mod xml;

pub use location::SourceLocation;
pub use provider::SourceProvider;
pub use resilient_http::{DEFAULT_REQUEST_TIMEOUT, resilient_get, resilient_send};
pub use xml::parse_document;
