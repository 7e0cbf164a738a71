//! Section derivation: turn an expanded node or a loaded item into an
//! ordered list of renderable sections.
//!
//! Two forms exist. The node-based form walks a raw JSON-LD node tree and
//! needs no resolver; labels are the local names of the keys. The
//! triple-based form walks a loaded [`Item`]'s flattened triples and
//! resolves human labels through the vocabulary resolver, degrading to
//! raw IRIs when resolution fails.

use crate::error::{CoreError, Result};
use crate::item::Item;
use crate::triple::TripleObject;
use crate::value::{classify, first_type, NodeValue};
use notegraph_schema::SchemaResolver;
use notegraph_vocab::local_name;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use tracing::debug;

/// Heading levels are capped; descent past this depth stays flat.
pub const MAX_HEADER_LEVEL: u8 = 5;

/// One renderable section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Section {
    /// Heading introducing a (sub-)subject
    Header { label: String, level: u8 },
    /// A literal property row
    ValueRow {
        label: String,
        property: String,
        subject: String,
        value: JsonValue,
    },
    /// A row referencing a subject outside this item
    ReferenceRow {
        label: String,
        property: String,
        subject: String,
        target: String,
    },
    /// Placeholder for a subtree that could not be rendered
    ErrorRow { subject: String, message: String },
}

/// Build sections from a raw JSON-LD node.
pub fn build_sections(node: &JsonValue) -> Result<Vec<Section>> {
    build_sections_with(node, &HashSet::new())
}

/// Build sections from a raw JSON-LD node, skipping references whose
/// target is already a known subject of the same item.
pub fn build_sections_with(
    node: &JsonValue,
    known_subjects: &HashSet<String>,
) -> Result<Vec<Section>> {
    let map = node
        .as_object()
        .ok_or_else(|| CoreError::malformed("section input must be a node object"))?;
    let mut out = Vec::new();
    walk_node(map, known_subjects, 1, true, &mut out)?;
    Ok(out)
}

/// Recursive node walk. The top-level node gets no header of its own;
/// nested typed nodes get one at the incremented level. All of a node's
/// own rows are emitted before any nested sub-section.
fn walk_node(
    map: &Map<String, JsonValue>,
    known_subjects: &HashSet<String>,
    level: u8,
    top_level: bool,
    out: &mut Vec<Section>,
) -> Result<()> {
    let subject = map
        .get("@id")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let type_iri = first_type(map).ok_or_else(|| CoreError::MissingType {
        subject: subject.clone(),
    })?;

    if !top_level {
        out.push(Section::Header {
            label: local_name(&type_iri).to_string(),
            level: level.min(MAX_HEADER_LEVEL),
        });
    }

    // Key order is the map's sorted order, so output is deterministic
    let mut nested: Vec<Map<String, JsonValue>> = Vec::new();
    for (key, value) in map {
        if key.starts_with('@') {
            continue;
        }
        for value in as_values(value) {
            match classify(value) {
                Ok(NodeValue::Literal(literal)) => out.push(Section::ValueRow {
                    label: local_name(key).to_string(),
                    property: key.clone(),
                    subject: subject.clone(),
                    value: literal,
                }),
                Ok(NodeValue::Reference(target)) => {
                    if known_subjects.contains(&target) {
                        // Already rendered as its own subject
                        continue;
                    }
                    out.push(Section::ReferenceRow {
                        label: local_name(key).to_string(),
                        property: key.clone(),
                        subject: subject.clone(),
                        target,
                    });
                }
                Ok(NodeValue::TypedNode { node, .. }) => nested.push(node),
                Err(e) => out.push(Section::ErrorRow {
                    subject: if subject.is_empty() {
                        key.clone()
                    } else {
                        subject.clone()
                    },
                    message: e.to_string(),
                }),
            }
        }
    }

    for child in nested {
        let next_level = (level + 1).min(MAX_HEADER_LEVEL);
        if let Err(e) = walk_node(&child, known_subjects, next_level, false, out) {
            // Unrenderable subtrees surface a placeholder, not a failure
            out.push(Section::ErrorRow {
                subject: child
                    .get("@id")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&subject)
                    .to_string(),
                message: e.to_string(),
            });
        }
    }
    Ok(())
}

/// Build sections from a loaded item's triple view.
///
/// The primary subject renders first and headerless; every other subject
/// gets a header labeled from its `@type`, resolved through the
/// vocabulary resolver. Resolver failures never abort section building.
pub async fn build_item_sections(item: &Item, resolver: &SchemaResolver) -> Vec<Section> {
    let triples = item.properties();
    let subjects = item.subjects();
    let known: HashSet<&str> = subjects.iter().map(String::as_str).collect();

    let mut out = Vec::new();
    for subject in &subjects {
        let rows: Vec<_> = triples.iter().filter(|t| &t.subject == subject).collect();

        if subject != item.uri() {
            let type_iri = rows
                .iter()
                .find(|t| t.predicate == "@type")
                .and_then(|t| t.object.as_reference());
            let label = match type_iri {
                Some(iri) => resolve_label(resolver, iri).await,
                None => subject.clone(),
            };
            out.push(Section::Header { label, level: 2 });
        }

        for triple in rows {
            if triple.predicate == "@type" {
                continue;
            }
            match &triple.object {
                TripleObject::Literal(value) => out.push(Section::ValueRow {
                    label: resolve_label(resolver, &triple.predicate).await,
                    property: triple.predicate.clone(),
                    subject: subject.clone(),
                    value: value.clone(),
                }),
                TripleObject::Reference(target) => {
                    if known.contains(target.as_str()) {
                        continue;
                    }
                    out.push(Section::ReferenceRow {
                        label: resolve_label(resolver, &triple.predicate).await,
                        property: triple.predicate.clone(),
                        subject: subject.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    out
}

/// Label lookup with degrade-to-IRI fallback.
async fn resolve_label(resolver: &SchemaResolver, iri: &str) -> String {
    match resolver.label_for_type(iri).await {
        Ok(Some(label)) => label,
        Ok(None) => iri.to_string(),
        Err(e) => {
            debug!(iri = %iri, error = %e, "label resolution failed, using raw IRI");
            iri.to_string()
        }
    }
}

fn as_values(value: &JsonValue) -> Vec<&JsonValue> {
    match value {
        JsonValue::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}
