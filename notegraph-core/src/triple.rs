//! Triple view of a loaded item's named graph.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One subject/predicate/object row derived from a flattened node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    /// Graph id the row belongs to
    pub graph: String,
    /// Subject IRI (item uri, declared id, or blank node id)
    pub subject: String,
    /// Predicate IRI, or the `@type` keyword for type assertions
    pub predicate: String,
    pub object: TripleObject,
}

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TripleObject {
    /// Literal value (the content of an `@value` object)
    Literal(JsonValue),
    /// Reference to another subject by IRI
    Reference(String),
}

impl TripleObject {
    pub fn as_literal(&self) -> Option<&JsonValue> {
        match self {
            TripleObject::Literal(value) => Some(value),
            TripleObject::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            TripleObject::Reference(target) => Some(target),
            TripleObject::Literal(_) => None,
        }
    }
}
