//! JSON-LD document expansion.
//!
//! Rewrites a compact document into expanded form: every key and `@type`
//! value becomes a fully-qualified IRI, every property value becomes an
//! array of value objects (`{"@value": ...}`), IRI references
//! (`{"@id": ...}`), or nested node objects.

use crate::context::{ParsedContext, TermDef, TypeValue};
use crate::error::{JsonLdError, Result};
use crate::iri;
use serde_json::{json, Map, Value as JsonValue};

/// Expand a single compact IRI.
///
/// `vocab` selects `@vocab` (for properties and types) over `@base`
/// (for `@id` values) as the fallback namespace.
pub fn expand_iri(compact: &str, context: &ParsedContext, vocab: bool) -> String {
    details(compact, context, vocab).0
}

/// Expand a compact IRI, returning the matched term definition as well.
pub fn details(compact: &str, context: &ParsedContext, vocab: bool) -> (String, Option<TermDef>) {
    // Keywords pass through untouched
    if compact.starts_with('@') {
        return (compact.to_string(), None);
    }

    // Exact term match
    if let Some(def) = context.get(compact) {
        let expanded = def.id.clone().unwrap_or_else(|| compact.to_string());
        return (expanded, Some(def.clone()));
    }

    // Prefix match (schema:name)
    if let Some((prefix, suffix)) = iri::parse_prefix(compact) {
        if let Some(def) = context.get(prefix) {
            if let Some(ns) = &def.id {
                return (format!("{}{}", ns, suffix), Some(def.clone()));
            }
        }
    }

    // Vocab/base fallback for terms that don't look like IRIs
    if !iri::looks_like_iri(compact) {
        let default = if vocab {
            context.vocab.as_deref()
        } else {
            context.base.as_deref()
        };
        if let Some(ns) = default {
            let expanded = if vocab {
                format!("{}{}", ns, compact)
            } else {
                iri::join(ns, compact)
            };
            return (expanded, None);
        }
    }

    (compact.to_string(), None)
}

/// Expand a whole document.
///
/// A top-level array expands element-wise; a `{@context, @graph}` default
/// graph unwraps to its (expanded) graph contents.
pub fn document(doc: &JsonValue, context: &ParsedContext) -> Result<JsonValue> {
    match doc {
        JsonValue::Array(items) => {
            let expanded: Result<Vec<_>> =
                items.iter().map(|item| document(item, context)).collect();
            Ok(JsonValue::Array(expanded?))
        }

        JsonValue::Object(map) => {
            let merged = merge_local_context(map, context)?;

            // Default graph: only @context and @graph present
            if let Some(graph) = map.get("@graph") {
                let substantive = map.keys().filter(|k| *k != "@context" && *k != "@graph");
                if substantive.count() == 0 {
                    return document(graph, &merged);
                }
            }

            expand_node(map, &merged)
        }

        other => Ok(other.clone()),
    }
}

/// Merge a node's local `@context` (if any) into the active context.
fn merge_local_context(
    map: &Map<String, JsonValue>,
    context: &ParsedContext,
) -> Result<ParsedContext> {
    match map.get("@context") {
        Some(local) => ParsedContext::parse(Some(context), local),
        None => Ok(context.clone()),
    }
}

/// Expand one node object.
fn expand_node(map: &Map<String, JsonValue>, context: &ParsedContext) -> Result<JsonValue> {
    let context = merge_local_context(map, context)?;
    let mut result = Map::new();

    for (key, value) in map {
        match key.as_str() {
            "@context" => continue,

            "@id" => {
                if let JsonValue::String(s) = value {
                    result.insert("@id".to_string(), json!(expand_iri(s, &context, false)));
                }
            }

            "@type" => {
                let types: Vec<String> = match value {
                    JsonValue::String(s) => vec![expand_iri(s, &context, true)],
                    JsonValue::Array(items) => items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(|s| expand_iri(s, &context, true))
                        .collect(),
                    _ => vec![],
                };
                result.insert("@type".to_string(), json!(types));
            }

            "@graph" => {
                let expanded = document(value, &context)?;
                result.insert("@graph".to_string(), expanded);
            }

            _ => {
                let (expanded_key, def) = details(key, &context, true);
                let values = expand_value(key, value, def.as_ref(), &context)?;
                if values.is_empty() {
                    continue;
                }
                match result.get_mut(&expanded_key) {
                    Some(JsonValue::Array(existing)) => existing.extend(values),
                    _ => {
                        result.insert(expanded_key, JsonValue::Array(values));
                    }
                }
            }
        }
    }

    Ok(JsonValue::Object(result))
}

/// Expand a property value into a list of expanded value objects.
fn expand_value(
    key: &str,
    value: &JsonValue,
    def: Option<&TermDef>,
    context: &ParsedContext,
) -> Result<Vec<JsonValue>> {
    let coerced_type = def.and_then(|d| d.type_.as_ref());

    match value {
        JsonValue::Null => Ok(vec![]),

        JsonValue::Bool(_) | JsonValue::Number(_) => {
            Ok(vec![literal_object(value.clone(), coerced_type, None)?])
        }

        JsonValue::String(s) => {
            // @type: @id coercion turns strings into IRI references
            if coerced_type == Some(&TypeValue::Id) {
                return Ok(vec![json!({"@id": expand_iri(s, context, false)})]);
            }
            let language = def
                .and_then(|d| d.language.clone())
                .or_else(|| context.language.clone());
            Ok(vec![literal_object(value.clone(), coerced_type, language)?])
        }

        JsonValue::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                if item.is_array() {
                    return Err(JsonLdError::NestedSequence {
                        key: key.to_string(),
                    });
                }
                out.extend(expand_value(key, item, def, context)?);
            }
            Ok(out)
        }

        JsonValue::Object(map) => {
            if map.contains_key("@value") {
                return Ok(vec![expand_value_object(map, def, context)?]);
            }
            Ok(vec![expand_node(map, context)?])
        }
    }
}

/// Wrap a raw scalar as an expanded `{"@value": ...}` object.
fn literal_object(
    value: JsonValue,
    coerced_type: Option<&TypeValue>,
    language: Option<String>,
) -> Result<JsonValue> {
    let mut obj = Map::new();
    obj.insert("@value".to_string(), value);

    if let Some(TypeValue::Iri(t)) = coerced_type {
        if language.is_some() {
            return Err(JsonLdError::LanguageWithType);
        }
        obj.insert("@type".to_string(), json!(t));
    } else if let Some(lang) = language {
        obj.insert("@language".to_string(), json!(lang));
    }

    Ok(JsonValue::Object(obj))
}

/// Normalize an explicit `{"@value": ...}` object.
fn expand_value_object(
    map: &Map<String, JsonValue>,
    def: Option<&TermDef>,
    context: &ParsedContext,
) -> Result<JsonValue> {
    let value = map.get("@value").cloned().unwrap_or(JsonValue::Null);

    let explicit_type = map
        .get("@type")
        .and_then(|t| t.as_str())
        .map(|t| expand_iri(t, context, true));
    let coerced = def.and_then(|d| match &d.type_ {
        Some(TypeValue::Iri(t)) => Some(t.clone()),
        _ => None,
    });
    let type_iri = explicit_type.or(coerced);

    let language = map
        .get("@language")
        .and_then(|l| l.as_str())
        .map(String::from)
        .or_else(|| context.language.clone());

    let mut obj = Map::new();
    obj.insert("@value".to_string(), value);
    if let Some(t) = type_iri {
        if language.is_some() {
            return Err(JsonLdError::LanguageWithType);
        }
        obj.insert("@type".to_string(), json!(t));
    } else if let Some(lang) = language {
        obj.insert("@language".to_string(), json!(lang));
    }

    Ok(JsonValue::Object(obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_iri_exact_and_prefix() {
        let ctx = ParsedContext::parse(
            None,
            &json!({
                "schema": "http://schema.org/",
                "REPLACE": "http://schema.org/Person"
            }),
        )
        .unwrap();

        assert_eq!(
            expand_iri("schema:name", &ctx, true),
            "http://schema.org/name"
        );
        assert_eq!(expand_iri("REPLACE", &ctx, true), "http://schema.org/Person");
        assert_eq!(expand_iri("not:matching", &ctx, true), "not:matching");
    }

    #[test]
    fn test_expand_iri_vocab_fallback() {
        let ctx = ParsedContext::parse(None, &json!("https://schema.org")).unwrap();

        assert_eq!(expand_iri("name", &ctx, true), "https://schema.org/name");
        assert_eq!(
            expand_iri("http://example.org/ns#Book", &ctx, true),
            "http://example.org/ns#Book"
        );
    }

    #[test]
    fn test_expand_node_basic() {
        let doc = json!({
            "@context": {
                "ical": "http://www.w3.org/2002/12/cal/ical#",
                "xsd": "http://www.w3.org/2001/XMLSchema#",
                "ical:dtstart": {"@type": "xsd:dateTime"}
            },
            "ical:summary": "Lady Gaga Concert",
            "ical:dtstart": "2011-04-09T20:00:00Z"
        });

        let result = document(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        assert!(obj.contains_key("http://www.w3.org/2002/12/cal/ical#summary"));
        let dtstart = &obj["http://www.w3.org/2002/12/cal/ical#dtstart"][0];
        assert_eq!(dtstart["@value"], "2011-04-09T20:00:00Z");
        assert_eq!(dtstart["@type"], "http://www.w3.org/2001/XMLSchema#dateTime");
    }

    #[test]
    fn test_expand_id_and_type() {
        let doc = json!({
            "@context": "https://schema.org",
            "@id": "https://www.wikidata.org/wiki/Q836821",
            "@type": "Movie",
            "name": "Hitchhiker's Guide to the Galaxy"
        });

        let result = document(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        assert_eq!(obj["@id"], "https://www.wikidata.org/wiki/Q836821");
        assert_eq!(obj["@type"], json!(["https://schema.org/Movie"]));
        assert!(obj.contains_key("https://schema.org/name"));
    }

    #[test]
    fn test_expand_nested_node() {
        let doc = json!({
            "@context": "https://schema.org/",
            "@type": "Person",
            "address": {
                "@type": "PostalAddress",
                "streetAddress": "7 S. Broadway"
            }
        });

        let result = document(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        let address = &obj["https://schema.org/address"][0];
        assert_eq!(address["@type"], json!(["https://schema.org/PostalAddress"]));
        assert_eq!(
            address["https://schema.org/streetAddress"][0]["@value"],
            "7 S. Broadway"
        );
    }

    #[test]
    fn test_expand_default_graph_unwraps() {
        let doc = json!({
            "@context": {"schema": "http://schema.org/"},
            "@graph": [
                {"@id": "ex:1", "schema:name": "Jane"},
                {"@id": "ex:2", "schema:name": "John"}
            ]
        });

        let result = document(&doc, &ParsedContext::new()).unwrap();
        let items = result.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0]
            .as_object()
            .unwrap()
            .contains_key("http://schema.org/name"));
    }

    #[test]
    fn test_id_coercion() {
        let doc = json!({
            "@context": {
                "schema": "http://schema.org/",
                "knows": {"@id": "schema:knows", "@type": "@id"}
            },
            "knows": "http://example.org/jane"
        });

        let result = document(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();
        assert_eq!(
            obj["http://schema.org/knows"][0]["@id"],
            "http://example.org/jane"
        );
    }

    #[test]
    fn test_false_value_survives() {
        let doc = json!({
            "@id": "http://example.org/foo",
            "http://example.org/bar": {"@value": false}
        });

        let result = document(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();
        assert_eq!(obj["http://example.org/bar"][0]["@value"], false);
    }

    #[test]
    fn test_nested_sequence_rejected() {
        let doc = json!({
            "http://example.org/xs": [[1, 2]]
        });

        assert!(matches!(
            document(&doc, &ParsedContext::new()),
            Err(JsonLdError::NestedSequence { .. })
        ));
    }

    #[test]
    fn test_multiple_types() {
        let doc = json!({
            "@context": "https://schema.org/",
            "@type": ["Person", "Patient"]
        });

        let result = document(&doc, &ParsedContext::new()).unwrap();
        assert_eq!(
            result["@type"],
            json!(["https://schema.org/Person", "https://schema.org/Patient"])
        );
    }
}
