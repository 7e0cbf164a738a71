//! The vocabulary resolver: fetches, canonicalizes, and memoizes RDFS
//! class/property descriptions.
//!
//! Resolution of a type IRI walks the published vocabulary document,
//! records every `rdf:Property` and `rdfs:Class` node it finds, then
//! recursively resolves not-yet-seen super-classes and `schema:sameAs`
//! aliases. Results are cached for the process lifetime.
//!
//! Per-type resolution follows an `Unresolved -> Resolving -> Resolved`
//! state machine: concurrent requests for the same type while a resolution
//! is in flight await the same fetch instead of issuing duplicates. A
//! failed resolution clears the entry so later requests retry.

use crate::error::{Result, SchemaError};
use crate::fetcher::SchemaFetcher;
use crate::model::{RdfsClass, RdfsProperty};
use futures::future::BoxFuture;
use notegraph_vocab::{iris_equivalent, normalize_scheme, rdf, rdfs, schema_org};
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Resolver tuning knobs.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Depth bound for recursive class-hierarchy walks. Vocabulary graphs
    /// are external and untrusted; exceeding the bound is a first-class
    /// error, never a silent cutoff.
    pub max_depth: usize,
    /// Treat http/https scheme variants of the same IRI as identical.
    pub normalize_schemes: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 30,
            normalize_schemes: true,
        }
    }
}

/// Per-type resolution state.
///
/// `Resolving` holds the in-flight marker waiters share; the fetching task
/// holds the lock until the walk completes.
enum Resolution {
    Resolving(Arc<futures::lock::Mutex<Option<Result<()>>>>),
    Resolved,
}

/// Hierarchy links for one class, both directions.
#[derive(Debug, Clone, Default)]
struct ClassLinks {
    parents: Vec<String>,
    children: Vec<String>,
}

/// Memoizing RDFS vocabulary resolver.
///
/// Owns its cache; construct once and share by reference (or `Arc`) so all
/// consumers see the same vocabulary view. Fresh instances give tests full
/// isolation.
pub struct SchemaResolver {
    config: ResolverConfig,
    fetcher: Arc<dyn SchemaFetcher>,
    classes: RwLock<HashMap<String, RdfsClass>>,
    properties: RwLock<HashMap<String, RdfsProperty>>,
    /// class IRI -> property IRIs whose domain includes it
    domain_index: RwLock<HashMap<String, Vec<String>>>,
    hierarchy: RwLock<HashMap<String, ClassLinks>>,
    /// rdfs:label of any subject seen during a walk, recognized type or not
    labels: RwLock<HashMap<String, String>>,
    resolutions: Mutex<HashMap<String, Resolution>>,
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("config", &self.config)
            .field("classes", &self.classes.read().map(|c| c.len()).unwrap_or(0))
            .field(
                "properties",
                &self.properties.read().map(|p| p.len()).unwrap_or(0),
            )
            .finish()
    }
}

impl SchemaResolver {
    pub fn new(fetcher: Arc<dyn SchemaFetcher>) -> Self {
        Self::with_config(fetcher, ResolverConfig::default())
    }

    pub fn with_config(fetcher: Arc<dyn SchemaFetcher>, config: ResolverConfig) -> Self {
        Self {
            config,
            fetcher,
            classes: RwLock::new(HashMap::new()),
            properties: RwLock::new(HashMap::new()),
            domain_index: RwLock::new(HashMap::new()),
            hierarchy: RwLock::new(HashMap::new()),
            labels: RwLock::new(HashMap::new()),
            resolutions: Mutex::new(HashMap::new()),
        }
    }

    /// Cache key for an IRI under the configured normalization rule.
    fn norm(&self, iri: &str) -> String {
        if self.config.normalize_schemes {
            normalize_scheme(iri).into_owned()
        } else {
            iri.to_string()
        }
    }

    /// Human label for a type (or property) IRI.
    ///
    /// Returns `Ok(None)` when the vocabulary has no matching node or no
    /// `rdfs:label`; fetch and parse failures propagate. Callers that only
    /// need a cosmetic label catch the error and degrade to the raw IRI.
    pub async fn label_for_type(&self, type_iri: &str) -> Result<Option<String>> {
        self.ensure_resolved(type_iri).await?;
        let key = self.norm(type_iri);

        if let Some(label) = self
            .classes
            .read()
            .expect("class cache poisoned")
            .get(&key)
            .and_then(|c| c.label.clone())
        {
            return Ok(Some(label));
        }
        if let Some(label) = self
            .properties
            .read()
            .expect("property cache poisoned")
            .get(&key)
            .and_then(|p| p.label.clone())
        {
            return Ok(Some(label));
        }
        Ok(self
            .labels
            .read()
            .expect("label cache poisoned")
            .get(&key)
            .cloned())
    }

    /// All properties valid for a type: those whose domain includes the
    /// type itself, plus (transitively) its declared super-classes.
    pub async fn properties(&self, type_iri: &str) -> Result<Vec<RdfsProperty>> {
        self.ensure_resolved(type_iri).await?;

        let mut out = Vec::new();
        self.collect_properties(&self.norm(type_iri), self.config.max_depth, &mut out)?;

        // Union: first occurrence of each property id wins
        let mut seen = HashSet::new();
        out.retain(|p| seen.insert(self.norm(&p.id)));
        Ok(out)
    }

    /// Curated minimal property set for known built-in types, used to
    /// scaffold a new blank item. `None` means the caller should fall back
    /// to [`Self::properties`].
    pub fn default_properties(&self, type_iri: &str) -> Option<Vec<RdfsProperty>> {
        if type_iri.contains("NoteDigitalDocument") {
            Some(vec![
                RdfsProperty {
                    id: schema_org::DATE_CREATED.to_string(),
                    label: Some("Date Created".to_string()),
                    comment: Some("Date when the note was originally authored.".to_string()),
                    domain_includes: vec![schema_org::NOTE_DIGITAL_DOCUMENT.to_string()],
                },
                RdfsProperty {
                    id: schema_org::TEXT.to_string(),
                    label: Some("Note text".to_string()),
                    comment: Some("Textual content of the note.".to_string()),
                    domain_includes: vec![schema_org::NOTE_DIGITAL_DOCUMENT.to_string()],
                },
            ])
        } else {
            None
        }
    }

    /// Normalized class view with hierarchy links, if the type resolves to
    /// an `rdfs:Class`.
    pub async fn class_for_type(&self, type_iri: &str) -> Result<Option<RdfsClass>> {
        self.ensure_resolved(type_iri).await?;
        let key = self.norm(type_iri);

        let Some(mut class) = self
            .classes
            .read()
            .expect("class cache poisoned")
            .get(&key)
            .cloned()
        else {
            return Ok(None);
        };

        if let Some(links) = self
            .hierarchy
            .read()
            .expect("hierarchy cache poisoned")
            .get(&key)
        {
            class.super_classes = links.parents.clone();
            class.sub_classes = links.children.clone();
        }
        Ok(Some(class))
    }

    /// Drive a type's cache entry to `Resolved`, coalescing concurrent
    /// requests for the same type onto one walk.
    async fn ensure_resolved(&self, type_iri: &str) -> Result<()> {
        let key = self.norm(type_iri);

        // Properties are indexed while their declaring class resolves and
        // publish no further hierarchy of their own; no walk needed
        if self
            .properties
            .read()
            .expect("property cache poisoned")
            .contains_key(&key)
        {
            return Ok(());
        }

        enum Action {
            Done,
            Wait(Arc<futures::lock::Mutex<Option<Result<()>>>>),
            Walk(Arc<futures::lock::Mutex<Option<Result<()>>>>),
        }

        loop {
            let action = {
                let mut entries = self.resolutions.lock().expect("resolution map poisoned");
                match entries.get(&key) {
                    Some(Resolution::Resolved) => Action::Done,
                    Some(Resolution::Resolving(marker)) => Action::Wait(marker.clone()),
                    None => {
                        let marker = Arc::new(futures::lock::Mutex::new(None));
                        entries.insert(key.clone(), Resolution::Resolving(marker.clone()));
                        Action::Walk(marker)
                    }
                }
            };

            match action {
                Action::Done => return Ok(()),

                Action::Wait(marker) => {
                    let guard = marker.lock().await;
                    match guard.as_ref() {
                        Some(Ok(())) => return Ok(()),
                        Some(Err(e)) => return Err(e.clone()),
                        None => {
                            // The resolving task was dropped before it got
                            // anywhere; clear the stale marker and retry.
                            drop(guard);
                            let mut entries =
                                self.resolutions.lock().expect("resolution map poisoned");
                            let stale = matches!(
                                entries.get(&key),
                                Some(Resolution::Resolving(m)) if Arc::ptr_eq(m, &marker)
                            );
                            if stale {
                                entries.remove(&key);
                            }
                            continue;
                        }
                    }
                }

                Action::Walk(marker) => {
                    let mut guard = marker.lock().await;

                    let mut visited = HashSet::new();
                    let result = self
                        .resolve_walk(type_iri, &mut visited, self.config.max_depth)
                        .await;

                    *guard = Some(result.clone());
                    drop(guard);

                    let mut entries = self.resolutions.lock().expect("resolution map poisoned");
                    match &result {
                        Ok(()) => {
                            // Everything the walk touched is now cached
                            for walked in visited {
                                entries.insert(walked, Resolution::Resolved);
                            }
                        }
                        Err(e) => {
                            warn!(iri = %type_iri, error = %e, "vocabulary resolution failed");
                            entries.remove(&key);
                        }
                    }
                    return result;
                }
            }
        }
    }

    /// Fetch and index one vocabulary document, recursing into super-classes
    /// and sameAs aliases. `visited` spans the whole resolution so aliases
    /// pointing back at each other terminate.
    fn resolve_walk<'a>(
        &'a self,
        iri: &'a str,
        visited: &'a mut HashSet<String>,
        depth: usize,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if depth == 0 {
                return Err(SchemaError::MaxRecursionExceeded {
                    iri: iri.to_string(),
                    depth: self.config.max_depth,
                });
            }
            if !visited.insert(self.norm(iri)) {
                return Ok(());
            }

            debug!(iri = %iri, depth, "resolving vocabulary type");
            let doc = self.fetcher.fetch(iri).await?;
            let expanded = notegraph_json_ld::expand(&doc)?;

            let nodes: Vec<&JsonValue> = match &expanded {
                JsonValue::Array(items) => items.iter().collect(),
                other => vec![other],
            };

            let mut pending = Vec::new();

            for node in nodes {
                let Some(map) = node.as_object() else { continue };
                let subject = map.get("@id").and_then(|v| v.as_str()).unwrap_or(iri);

                if let Some(label) = get_string(map, rdfs::LABEL) {
                    self.labels
                        .write()
                        .expect("label cache poisoned")
                        .entry(self.norm(subject))
                        .or_insert(label);
                }

                let types = node_types(map);
                let is_property = types
                    .iter()
                    .any(|t| iris_equivalent(t, rdf::PROPERTY, true))
                    // Untyped nodes with subPropertyOf are properties in
                    // practice; schema.org omits @type on some of them
                    || (types.is_empty() && get_key(map, rdfs::SUB_PROPERTY_OF).is_some());
                let is_class = types.iter().any(|t| iris_equivalent(t, rdfs::CLASS, true));

                if is_property {
                    self.record_property(subject, map);
                } else if is_class {
                    pending.extend(self.record_class(subject, map));
                }
            }

            for next in pending {
                if !visited.contains(&self.norm(&next)) {
                    self.resolve_walk(&next, visited, depth - 1).await?;
                }
            }

            Ok(())
        })
    }

    /// Index an `rdf:Property` node: descriptor plus domain index entries.
    fn record_property(&self, subject: &str, map: &Map<String, JsonValue>) {
        let mut prop = RdfsProperty::new(subject);
        prop.label = get_string(map, rdfs::LABEL);
        prop.comment = get_string(map, rdfs::COMMENT);

        let mut domains = get_ids(map, schema_org::DOMAIN_INCLUDES);
        domains.extend(get_ids(map, rdfs::DOMAIN));
        prop.domain_includes = domains.clone();

        let key = self.norm(subject);
        {
            let mut index = self.domain_index.write().expect("domain index poisoned");
            for domain in &domains {
                let entry = index.entry(self.norm(domain)).or_default();
                if !entry.iter().any(|p| self.norm(p) == key) {
                    entry.push(subject.to_string());
                }
            }
        }
        self.properties
            .write()
            .expect("property cache poisoned")
            .insert(key, prop);
    }

    /// Index an `rdfs:Class` node. Returns the IRIs resolution should
    /// recurse into (super-classes and sameAs aliases).
    fn record_class(&self, subject: &str, map: &Map<String, JsonValue>) -> Vec<String> {
        let key = self.norm(subject);
        {
            let mut classes = self.classes.write().expect("class cache poisoned");
            let entry = classes
                .entry(key.clone())
                .or_insert_with(|| RdfsClass::new(subject));
            if entry.label.is_none() {
                entry.label = get_string(map, rdfs::LABEL);
            }
            if entry.comment.is_none() {
                entry.comment = get_string(map, rdfs::COMMENT);
            }
        }

        let supers = get_ids(map, rdfs::SUB_CLASS_OF);
        {
            let mut hierarchy = self.hierarchy.write().expect("hierarchy cache poisoned");
            for parent in &supers {
                let parent_key = self.norm(parent);
                if parent_key == key {
                    // Self-loops add nothing
                    continue;
                }
                let links = hierarchy.entry(key.clone()).or_default();
                if !links.parents.contains(&parent_key) {
                    links.parents.push(parent_key.clone());
                }
                let parent_links = hierarchy.entry(parent_key).or_default();
                if !parent_links.children.contains(&key) {
                    parent_links.children.push(key.clone());
                }
            }
        }

        let mut pending = supers;
        pending.extend(get_ids(map, schema_org::SAME_AS));
        pending
    }

    /// Depth-bounded ancestor walk accumulating applicable properties.
    fn collect_properties(
        &self,
        key: &str,
        depth: usize,
        out: &mut Vec<RdfsProperty>,
    ) -> Result<()> {
        if depth == 0 {
            return Err(SchemaError::MaxRecursionExceeded {
                iri: key.to_string(),
                depth: self.config.max_depth,
            });
        }

        let direct: Vec<String> = self
            .domain_index
            .read()
            .expect("domain index poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default();
        {
            let properties = self.properties.read().expect("property cache poisoned");
            for prop_id in direct {
                if let Some(prop) = properties.get(&self.norm(&prop_id)) {
                    out.push(prop.clone());
                }
            }
        }

        let parents: Vec<String> = self
            .hierarchy
            .read()
            .expect("hierarchy cache poisoned")
            .get(key)
            .map(|links| links.parents.clone())
            .unwrap_or_default();
        for parent in parents {
            self.collect_properties(&parent, depth - 1, out)?;
        }
        Ok(())
    }
}

/// The `@type` values of an expanded node.
fn node_types(map: &Map<String, JsonValue>) -> Vec<String> {
    match map.get("@type") {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(String::from)
            .collect(),
        Some(JsonValue::String(s)) => vec![s.clone()],
        _ => vec![],
    }
}

/// Look up a predicate tolerating http/https variants of the key.
fn get_key<'m>(map: &'m Map<String, JsonValue>, iri: &str) -> Option<&'m JsonValue> {
    if let Some(v) = map.get(iri) {
        return Some(v);
    }
    let alt = if let Some(rest) = iri.strip_prefix("http://") {
        format!("https://{}", rest)
    } else if let Some(rest) = iri.strip_prefix("https://") {
        format!("http://{}", rest)
    } else {
        return None;
    };
    map.get(&alt)
}

/// First `@value`/`@id`/string under a predicate.
fn get_string(map: &Map<String, JsonValue>, iri: &str) -> Option<String> {
    let value = get_key(map, iri)?;
    let first = match value {
        JsonValue::Array(items) => items.first()?,
        other => other,
    };
    match first {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Object(obj) => obj
            .get("@value")
            .or_else(|| obj.get("@id"))
            .and_then(|v| v.as_str())
            .map(String::from),
        _ => None,
    }
}

/// All `@id` references under a predicate.
fn get_ids(map: &Map<String, JsonValue>, iri: &str) -> Vec<String> {
    let Some(value) = get_key(map, iri) else {
        return vec![];
    };
    let items: Vec<&JsonValue> = match value {
        JsonValue::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(|v| match v {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Object(obj) => obj.get("@id").and_then(|x| x.as_str()).map(String::from),
            _ => None,
        })
        .collect()
}
