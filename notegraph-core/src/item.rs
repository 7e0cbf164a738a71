//! The JSON-LD item model.
//!
//! An [`Item`] owns a JSON-LD payload and its derived named-graph form.
//! Loading a payload expands it, asserts exactly one primary subject,
//! re-keys that subject to the item's own uri (preserving a declared
//! `@id` as provenance), and flattens the result into the named graph.
//! All reads go through the derived [`Triple`] and subject views.

use crate::error::{CoreError, Result};
use crate::ident::{mint_uri, DEFAULT_PREFIX};
use crate::triple::{Triple, TripleObject};
use crate::value::{classify, NodeValue};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use tracing::warn;

/// Namespace for provenance keys the item model injects.
pub const PROVENANCE_NS: &str = "https://notegraph.dev/ns#";

/// Predicate recording the `@id` a loaded payload declared for itself.
pub const DERIVED_FROM: &str = "https://notegraph.dev/ns#derivedFrom";

/// A user-authored item: one primary subject plus whatever nested
/// sub-subjects its payload carries.
#[derive(Debug, Clone)]
pub struct Item {
    uri: String,
    source_type: String,
    observed_at: DateTime<Utc>,
    payload: JsonValue,
    named_graph: BTreeMap<String, Vec<JsonValue>>,
}

impl Item {
    /// Create an empty item of the given type under the default prefix.
    pub fn new(type_iri: impl Into<String>) -> Self {
        Self::with_prefix(type_iri, DEFAULT_PREFIX)
    }

    /// Create an empty item with a caller-chosen uri prefix.
    pub fn with_prefix(type_iri: impl Into<String>, prefix: &str) -> Self {
        let type_iri = type_iri.into();
        let uri = mint_uri(prefix);

        // Envelope node so the type is queryable before any load
        let envelope = json!({"@id": uri, "@type": [type_iri]});
        let mut named_graph = BTreeMap::new();
        named_graph.insert(uri.clone(), vec![envelope]);

        Self {
            uri,
            source_type: type_iri,
            observed_at: Utc::now(),
            payload: JsonValue::Null,
            named_graph,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// The payload as last loaded, `Null` before the first load.
    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    /// The derived named-graph container: graph id to flattened nodes.
    pub fn named_graph(&self) -> &BTreeMap<String, Vec<JsonValue>> {
        &self.named_graph
    }

    /// Load a JSON-LD payload into the item.
    ///
    /// Expansion and flattening are staged in full before any state
    /// changes; on error the item is exactly as it was before the call.
    pub async fn load(&mut self, payload: &JsonValue) -> Result<()> {
        let expanded = notegraph_json_ld::expand(payload)?;

        let top_level: Vec<&JsonValue> = match &expanded {
            JsonValue::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        if top_level.len() != 1 {
            return Err(CoreError::MultipleSubjects {
                count: top_level.len(),
            });
        }
        let Some(node) = top_level[0].as_object() else {
            return Err(CoreError::malformed("payload did not expand to a node object"));
        };

        if let Some(key) = find_reserved_key(top_level[0]) {
            return Err(CoreError::ReservedKeyConflict { key });
        }

        // Re-key the primary subject to our uri; a declared @id survives
        // as provenance rather than competing for identity
        let mut primary: Map<String, JsonValue> = node.clone();
        match primary.get("@id").and_then(|v| v.as_str()).map(String::from) {
            Some(declared) if declared != self.uri => {
                primary.insert(
                    DERIVED_FROM.to_string(),
                    json!([{"@id": declared}]),
                );
                primary.insert("@id".to_string(), json!(self.uri));
            }
            Some(_) => {}
            None => {
                primary.insert("@id".to_string(), json!(self.uri));
            }
        }

        let nodes = notegraph_json_ld::flatten_expanded(&JsonValue::Object(primary))?;

        // Commit
        self.payload = payload.clone();
        self.named_graph.insert(self.uri.clone(), nodes);
        Ok(())
    }

    /// One triple per property-value pair across all graphs.
    ///
    /// Nodes lacking an `@id` are skipped with a warning; they cannot be
    /// addressed as subjects. `@type` assertions are emitted as reference
    /// triples under the `@type` predicate.
    pub fn properties(&self) -> Vec<Triple> {
        let mut triples = Vec::new();

        for (graph_id, nodes) in &self.named_graph {
            for node in nodes {
                let Some(map) = node.as_object() else {
                    warn!(graph = %graph_id, "skipping non-object node in named graph");
                    continue;
                };
                let Some(subject) = map.get("@id").and_then(|v| v.as_str()) else {
                    warn!(graph = %graph_id, "skipping node without @id");
                    continue;
                };

                for (key, value) in map {
                    if key == "@id" {
                        continue;
                    }
                    if key == "@type" {
                        for type_iri in as_values(value).iter().filter_map(|v| v.as_str()) {
                            triples.push(Triple {
                                graph: graph_id.clone(),
                                subject: subject.to_string(),
                                predicate: "@type".to_string(),
                                object: TripleObject::Reference(type_iri.to_string()),
                            });
                        }
                        continue;
                    }
                    if key.starts_with('@') {
                        continue;
                    }

                    for value in as_values(value) {
                        let object = match classify(value) {
                            Ok(NodeValue::Literal(literal)) => TripleObject::Literal(literal),
                            Ok(NodeValue::Reference(target)) => TripleObject::Reference(target),
                            Ok(NodeValue::TypedNode { .. }) => {
                                // Flattening replaces nested nodes with
                                // references; a survivor is unexpected
                                warn!(subject = %subject, predicate = %key, "unflattened nested node in graph");
                                continue;
                            }
                            Err(e) => {
                                warn!(subject = %subject, predicate = %key, error = %e, "skipping unclassifiable value");
                                continue;
                            }
                        };
                        triples.push(Triple {
                            graph: graph_id.clone(),
                            subject: subject.to_string(),
                            predicate: key.clone(),
                            object,
                        });
                    }
                }
            }
        }
        triples
    }

    /// Unique subject uris, the item's own uri always first.
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects = vec![self.uri.clone()];
        for triple in self.properties() {
            if !subjects.contains(&triple.subject) {
                subjects.push(triple.subject);
            }
        }
        subjects
    }

    /// The primary subject's `@type`. Multiple asserted types are
    /// tolerated; the first is used.
    pub fn type_url(&self) -> Option<&str> {
        let nodes = self.named_graph.get(&self.uri)?;
        let primary = nodes.iter().find_map(|node| {
            let map = node.as_object()?;
            (map.get("@id").and_then(|v| v.as_str()) == Some(self.uri.as_str())).then_some(map)
        })?;
        match primary.get("@type")? {
            JsonValue::String(s) => Some(s.as_str()),
            JsonValue::Array(items) => items.iter().find_map(|v| v.as_str()),
            _ => None,
        }
    }
}

/// View a value as a slice of values, whether or not expansion left it
/// as an array.
fn as_values(value: &JsonValue) -> Vec<&JsonValue> {
    match value {
        JsonValue::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Depth-first scan for keys in the provenance namespace.
fn find_reserved_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Object(map) => {
            for (key, nested) in map {
                if key.starts_with(PROVENANCE_NS) {
                    return Some(key.clone());
                }
                if let Some(found) = find_reserved_key(nested) {
                    return Some(found);
                }
            }
            None
        }
        JsonValue::Array(items) => items.iter().find_map(find_reserved_key),
        _ => None,
    }
}
