//! Value classification for expanded JSON-LD node values.
//!
//! Every consumer of node values (triple derivation, section building)
//! pattern-matches on [`NodeValue`] instead of re-deriving ad hoc
//! `'@value' in x` style checks.

use crate::error::{CoreError, Result};
use serde_json::{Map, Value as JsonValue};

/// A classified JSON-LD node value.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// A literal: raw scalar or the content of an `@value` object
    Literal(JsonValue),
    /// A reference to another subject by IRI
    Reference(String),
    /// A nested node carrying its own `@type`
    TypedNode {
        type_iri: String,
        node: Map<String, JsonValue>,
    },
}

/// Classify a node value.
///
/// Total over well-formed expanded values: `@value` objects and raw
/// scalars are literals, `@id`-only objects are references, objects with
/// `@type` alongside other keys are typed sub-nodes. Anything else is a
/// [`CoreError::MalformedNode`].
pub fn classify(value: &JsonValue) -> Result<NodeValue> {
    match value {
        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
            Ok(NodeValue::Literal(value.clone()))
        }
        JsonValue::Object(map) => {
            if let Some(inner) = map.get("@value") {
                return Ok(NodeValue::Literal(inner.clone()));
            }
            if let Some(type_iri) = first_type(map) {
                return Ok(NodeValue::TypedNode {
                    type_iri,
                    node: map.clone(),
                });
            }
            if let Some(id) = map.get("@id").and_then(|v| v.as_str()) {
                return Ok(NodeValue::Reference(id.to_string()));
            }
            Err(CoreError::malformed(
                "object with none of @value, @id, @type",
            ))
        }
        JsonValue::Null => Err(CoreError::malformed("null is not a node value")),
        JsonValue::Array(_) => Err(CoreError::malformed(
            "nested array where a single node value was expected",
        )),
    }
}

/// First `@type` of a node, tolerating both string and array forms.
/// Multiple types are a degenerate case sources over-assert; the first wins.
pub fn first_type(map: &Map<String, JsonValue>) -> Option<String> {
    match map.get("@type") {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Array(items)) => items
            .iter()
            .find_map(|v| v.as_str())
            .map(String::from),
        _ => None,
    }
}
