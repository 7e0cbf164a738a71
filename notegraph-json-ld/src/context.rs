//! JSON-LD `@context` parsing.
//!
//! A context can be a vocabulary string (`"https://schema.org/"`), a term
//! map, an array of either (merged left to right), or `null` (reset).
//! Parsed contexts drive IRI expansion in [`crate::expand`].

use crate::error::{JsonLdError, Result};
use crate::iri;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// The `@type` of a term definition: either the `@id` keyword (values are
/// IRI references) or a concrete datatype IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeValue {
    Id,
    Iri(String),
}

/// A single term definition from a context map.
#[derive(Debug, Clone, Default)]
pub struct TermDef {
    /// Expanded IRI the term maps to
    pub id: Option<String>,
    /// Datatype coercion (`@type`)
    pub type_: Option<TypeValue>,
    /// Language tag (`@language`)
    pub language: Option<String>,
}

/// A fully parsed `@context`.
#[derive(Debug, Clone, Default)]
pub struct ParsedContext {
    /// Default vocabulary (`@vocab`)
    pub vocab: Option<String>,
    /// Base IRI for `@id` values (`@base`)
    pub base: Option<String>,
    /// Default language (`@language`)
    pub language: Option<String>,
    /// Term definitions
    pub terms: HashMap<String, TermDef>,
}

impl ParsedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a term definition.
    pub fn get(&self, term: &str) -> Option<&TermDef> {
        self.terms.get(term)
    }

    /// Parse a context value on top of an optional base context.
    pub fn parse(base: Option<&ParsedContext>, context: &JsonValue) -> Result<ParsedContext> {
        let mut active = base.cloned().unwrap_or_default();

        match context {
            // null resets the active context
            JsonValue::Null => Ok(ParsedContext::default()),

            JsonValue::String(s) => {
                active.vocab = Some(iri::with_trailing_separator(s));
                Ok(active)
            }

            JsonValue::Object(map) => {
                // Tolerate a wrapped {"@context": ...} document
                if let Some(inner) = map.get("@context") {
                    return Self::parse(Some(&active), inner);
                }
                parse_context_map(active, map)
            }

            JsonValue::Array(items) => {
                for item in items {
                    active = Self::parse(Some(&active), item)?;
                }
                Ok(active)
            }

            other => Err(JsonLdError::InvalidContext {
                message: format!("context must be null, string, object, or array; got {}", other),
            }),
        }
    }
}

/// Parse a context term map on top of an active context.
fn parse_context_map(mut active: ParsedContext, map: &Map<String, JsonValue>) -> Result<ParsedContext> {
    // Keywords first so term resolution can use @vocab/@base
    for (key, value) in map {
        match key.as_str() {
            "@vocab" => {
                active.vocab = match value {
                    JsonValue::String(s) => Some(iri::with_trailing_separator(s)),
                    JsonValue::Null => None,
                    other => {
                        return Err(JsonLdError::InvalidContext {
                            message: format!("@vocab must be a string, got {}", other),
                        })
                    }
                };
            }
            "@base" => {
                active.base = match value {
                    JsonValue::String(s) => Some(s.clone()),
                    JsonValue::Null => None,
                    other => {
                        return Err(JsonLdError::InvalidContext {
                            message: format!("@base must be a string, got {}", other),
                        })
                    }
                };
            }
            "@language" => {
                active.language = value.as_str().map(|s| s.to_string());
            }
            // @version / @protected accepted but not tracked
            "@version" | "@protected" => {}
            _ => {}
        }
    }

    // Collect raw term values; resolved against each other below
    let mut raw: HashMap<String, (Option<String>, Option<String>, Option<String>)> = HashMap::new();
    for (key, value) in map {
        if key.starts_with('@') {
            continue;
        }
        match value {
            JsonValue::String(s) => {
                raw.insert(key.clone(), (Some(s.clone()), None, None));
            }
            JsonValue::Object(def) => {
                // A definition without @id maps the term key itself
                let id = def
                    .get("@id")
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .or_else(|| Some(key.clone()));
                let type_ = def.get("@type").and_then(|v| v.as_str()).map(String::from);
                let language = def
                    .get("@language")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                raw.insert(key.clone(), (id, type_, language));
            }
            JsonValue::Null => {
                active.terms.remove(key);
            }
            other => {
                return Err(JsonLdError::InvalidContext {
                    message: format!("invalid definition for term '{}': {}", key, other),
                });
            }
        }
    }

    for (key, (id, type_, language)) in &raw {
        let resolved_id = id
            .as_deref()
            .map(|v| resolve_term(v, &raw, &active, 8));
        let resolved_type = type_.as_deref().map(|t| match t {
            "@id" => TypeValue::Id,
            other => TypeValue::Iri(resolve_term(other, &raw, &active, 8)),
        });
        active.terms.insert(
            key.clone(),
            TermDef {
                id: resolved_id,
                type_: resolved_type,
                language: language.clone(),
            },
        );
    }

    Ok(active)
}

/// Resolve a raw term value to a full IRI.
///
/// Chases exact-match chains (`"UUID": "dtUUID"`), compact IRIs whose
/// prefix is defined in the same map, then falls back to the prior
/// context and `@vocab`. The depth bound stops definition cycles.
fn resolve_term(
    value: &str,
    raw: &HashMap<String, (Option<String>, Option<String>, Option<String>)>,
    active: &ParsedContext,
    depth: usize,
) -> String {
    if depth == 0 || value.starts_with('@') {
        return value.to_string();
    }

    // Exact match against a sibling term in this map
    if let Some((Some(id), _, _)) = raw.get(value) {
        if id != value {
            return resolve_term(id, raw, active, depth - 1);
        }
    }

    // Exact match against the prior context
    if let Some(def) = active.get(value) {
        if let Some(id) = &def.id {
            return id.clone();
        }
    }

    // Compact IRI with a prefix defined here or in the prior context
    if let Some((prefix, suffix)) = iri::parse_prefix(value) {
        if let Some((Some(ns), _, _)) = raw.get(prefix) {
            let ns = resolve_term(ns, raw, active, depth - 1);
            return format!("{}{}", ns, suffix);
        }
        if let Some(def) = active.get(prefix) {
            if let Some(ns) = &def.id {
                return format!("{}{}", ns, suffix);
            }
        }
    }

    if iri::is_absolute(value) {
        return value.to_string();
    }

    // Vocab-relative term
    if let Some(vocab) = &active.vocab {
        return format!("{}{}", vocab, value);
    }

    value.to_string()
}
