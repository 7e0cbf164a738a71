//! Minimal JSON-LD processing for the notegraph item pipeline
//!
//! This crate provides the JSON-LD algorithms the item model and schema
//! resolver depend on:
//! - Context parsing (`@vocab`, `@base`, prefix and term definitions)
//! - IRI expansion
//! - Document expansion
//! - Document flattening (node-map generation with blank-node ids)
//!
//! # Example
//!
//! ```
//! use notegraph_json_ld::{expand, flatten};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "@context": "https://schema.org/",
//!     "@type": "NoteDigitalDocument",
//!     "text": "hello"
//! });
//!
//! let expanded = expand(&doc).unwrap();
//! assert!(expanded["https://schema.org/text"].is_array());
//!
//! let nodes = flatten(&doc).unwrap();
//! assert_eq!(nodes.len(), 1);
//! ```

pub mod context;
pub mod error;
pub mod expand;
pub mod flatten;
pub mod iri;

pub use context::{ParsedContext, TermDef, TypeValue};
pub use error::{JsonLdError, Result};

use serde_json::Value as JsonValue;

/// Parse a JSON-LD context (string, object, array, or null).
pub fn parse_context(context: &JsonValue) -> Result<ParsedContext> {
    ParsedContext::parse(None, context)
}

/// Expand a compact IRI against a parsed context (vocab mode).
pub fn expand_iri(compact: &str, context: &ParsedContext) -> String {
    expand::expand_iri(compact, context, true)
}

/// Expand a JSON-LD document, resolving its embedded `@context`.
pub fn expand(doc: &JsonValue) -> Result<JsonValue> {
    expand::document(doc, &ParsedContext::new())
}

/// Expand a JSON-LD document against a pre-parsed context.
pub fn expand_with_context(doc: &JsonValue, context: &ParsedContext) -> Result<JsonValue> {
    expand::document(doc, context)
}

/// Flatten a JSON-LD document into a list of flat node objects.
pub fn flatten(doc: &JsonValue) -> Result<Vec<JsonValue>> {
    flatten::flatten(doc, &ParsedContext::new())
}

/// Flatten an already-expanded document.
pub fn flatten_expanded(expanded: &JsonValue) -> Result<Vec<JsonValue>> {
    flatten::flatten_expanded(expanded)
}
