//! JSON-LD document flattening.
//!
//! Expansion followed by node-map generation: every nested node object is
//! hoisted into a flat node list and replaced in place by an `{"@id": ...}`
//! reference. Nodes without an `@id` receive generated blank-node ids
//! (`_:b0`, `_:b1`, ... in first-visit order). Statements about the same
//! subject merge into one node object.

use crate::context::ParsedContext;
use crate::error::{JsonLdError, Result};
use crate::expand;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;

/// Flatten a JSON-LD document into a list of flat node objects.
pub fn flatten(doc: &JsonValue, context: &ParsedContext) -> Result<Vec<JsonValue>> {
    let expanded = expand::document(doc, context)?;
    flatten_expanded(&expanded)
}

/// Flatten an already-expanded document.
pub fn flatten_expanded(expanded: &JsonValue) -> Result<Vec<JsonValue>> {
    let mut node_map = NodeMap::default();

    match expanded {
        JsonValue::Array(items) => {
            for item in items {
                node_map.visit(item)?;
            }
        }
        JsonValue::Object(_) => {
            node_map.visit(expanded)?;
        }
        other => {
            return Err(JsonLdError::UnexpectedShape {
                message: format!("cannot flatten non-node document: {}", other),
            })
        }
    }

    Ok(node_map.into_nodes())
}

/// Accumulates flat nodes in first-visit order.
#[derive(Default)]
struct NodeMap {
    order: Vec<String>,
    nodes: HashMap<String, Map<String, JsonValue>>,
    blank_counter: usize,
}

impl NodeMap {
    /// Visit an expanded node object, hoisting nested nodes. Returns the
    /// node's subject id.
    fn visit(&mut self, node: &JsonValue) -> Result<String> {
        let map = node.as_object().ok_or_else(|| JsonLdError::UnexpectedShape {
            message: format!("expected a node object, got {}", node),
        })?;

        let id = match map.get("@id").and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => self.mint_blank_id(),
        };

        let entry = self.entry(&id);
        entry.insert("@id".to_string(), json!(id));

        // Collect property work first; nested visits need &mut self
        let mut pending: Vec<(String, Vec<JsonValue>)> = Vec::new();

        for (key, value) in map {
            match key.as_str() {
                "@id" => {}
                "@type" => {
                    let types = value.clone();
                    merge_values(self.entry(&id), "@type", as_vec(types));
                }
                "@graph" => {
                    // Nested graph contents flatten into the same node list
                    match value {
                        JsonValue::Array(items) => {
                            for item in items {
                                self.visit(item)?;
                            }
                        }
                        other => {
                            self.visit(other)?;
                        }
                    }
                }
                _ => {
                    let values = match value {
                        JsonValue::Array(items) => items.clone(),
                        other => vec![other.clone()],
                    };
                    pending.push((key.clone(), values));
                }
            }
        }

        for (key, values) in pending {
            let mut flat_values = Vec::with_capacity(values.len());
            for value in values {
                flat_values.push(self.flatten_value(value)?);
            }
            merge_values(self.entry(&id), &key, flat_values);
        }

        Ok(id)
    }

    /// Replace a nested node object by a reference, hoisting it.
    fn flatten_value(&mut self, value: JsonValue) -> Result<JsonValue> {
        match &value {
            JsonValue::Object(map) => {
                if map.contains_key("@value") {
                    return Ok(value);
                }
                // Reference-only objects stay as references
                if map.len() == 1 && map.contains_key("@id") {
                    return Ok(value);
                }
                let child_id = self.visit(&value)?;
                Ok(json!({ "@id": child_id }))
            }
            _ => Ok(value),
        }
    }

    fn mint_blank_id(&mut self) -> String {
        let id = format!("_:b{}", self.blank_counter);
        self.blank_counter += 1;
        id
    }

    fn entry(&mut self, id: &str) -> &mut Map<String, JsonValue> {
        if !self.nodes.contains_key(id) {
            self.order.push(id.to_string());
            self.nodes.insert(id.to_string(), Map::new());
        }
        self.nodes.get_mut(id).unwrap()
    }

    fn into_nodes(mut self) -> Vec<JsonValue> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.remove(id))
            .map(JsonValue::Object)
            .collect()
    }
}

fn as_vec(value: JsonValue) -> Vec<JsonValue> {
    match value {
        JsonValue::Array(items) => items,
        other => vec![other],
    }
}

/// Append values under a key, keeping existing ones.
fn merge_values(entry: &mut Map<String, JsonValue>, key: &str, values: Vec<JsonValue>) {
    match entry.get_mut(key) {
        Some(JsonValue::Array(existing)) => {
            for v in values {
                if !existing.contains(&v) {
                    existing.push(v);
                }
            }
        }
        _ => {
            entry.insert(key.to_string(), JsonValue::Array(values));
        }
    }
}
