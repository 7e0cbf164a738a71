//! End-to-end resolver tests over an in-memory vocabulary.

use async_trait::async_trait;
use notegraph_schema::{
    MemoryFetcher, ResolverConfig, SchemaError, SchemaFetcher, SchemaResolver,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

fn vocab_doc(nodes: JsonValue) -> JsonValue {
    json!({
        "@context": {
            "rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
            "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
            "schema": "http://schema.org/"
        },
        "@graph": nodes
    })
}

/// A small schema.org-like fixture: Thing <- Person, each with one
/// property domained on it.
fn fixture_fetcher() -> Arc<MemoryFetcher> {
    let fetcher = MemoryFetcher::new();

    fetcher.insert(
        "http://schema.org/Person",
        vocab_doc(json!([
            {
                "@id": "http://schema.org/Person",
                "@type": "rdfs:Class",
                "rdfs:label": "Person",
                "rdfs:comment": "A person (alive, dead, undead, or fictional).",
                "rdfs:subClassOf": {"@id": "http://schema.org/Thing"}
            },
            {
                "@id": "http://schema.org/birthDate",
                "@type": "rdf:Property",
                "rdfs:label": "birthDate",
                "schema:domainIncludes": {"@id": "http://schema.org/Person"}
            }
        ])),
    );

    fetcher.insert(
        "http://schema.org/Thing",
        vocab_doc(json!([
            {
                "@id": "http://schema.org/Thing",
                "@type": "rdfs:Class",
                "rdfs:label": "Thing"
            },
            {
                "@id": "http://schema.org/name",
                "@type": "rdf:Property",
                "rdfs:label": "name",
                "schema:domainIncludes": {"@id": "http://schema.org/Thing"}
            }
        ])),
    );

    Arc::new(fetcher)
}

#[tokio::test]
async fn test_properties_include_superclass_union() {
    let fetcher = fixture_fetcher();
    let resolver = SchemaResolver::new(fetcher.clone());

    let props = resolver
        .properties("https://schema.org/Person")
        .await
        .unwrap();
    let ids: Vec<&str> = props.iter().map(|p| p.id.as_str()).collect();

    // Own properties first, then inherited ones
    assert_eq!(
        ids,
        vec!["http://schema.org/birthDate", "http://schema.org/name"]
    );
    assert_eq!(props[0].label.as_deref(), Some("birthDate"));
}

#[tokio::test]
async fn test_resolution_is_memoized() {
    let fetcher = fixture_fetcher();
    let resolver = SchemaResolver::new(fetcher.clone());

    resolver
        .properties("https://schema.org/Person")
        .await
        .unwrap();
    // Person plus its superclass Thing
    assert_eq!(fetcher.fetch_count(), 2);

    resolver
        .properties("https://schema.org/Person")
        .await
        .unwrap();
    assert_eq!(fetcher.fetch_count(), 2);

    // Thing was resolved as part of Person's walk; no new fetch
    resolver
        .properties("http://schema.org/Thing")
        .await
        .unwrap();
    assert_eq!(fetcher.fetch_count(), 2);
}

/// Delegating fetcher that yields before every fetch so concurrent
/// resolutions actually interleave.
#[derive(Debug)]
struct YieldingFetcher(Arc<MemoryFetcher>);

#[async_trait]
impl SchemaFetcher for YieldingFetcher {
    async fn fetch(&self, iri: &str) -> notegraph_schema::Result<JsonValue> {
        tokio::task::yield_now().await;
        self.0.fetch(iri).await
    }
}

#[tokio::test]
async fn test_concurrent_resolution_coalesces() {
    let inner = fixture_fetcher();
    let resolver = Arc::new(SchemaResolver::new(Arc::new(YieldingFetcher(
        inner.clone(),
    ))));

    let (a, b) = tokio::join!(
        resolver.properties("https://schema.org/Person"),
        resolver.properties("https://schema.org/Person"),
    );
    assert_eq!(a.unwrap().len(), 2);
    assert_eq!(b.unwrap().len(), 2);

    // One walk served both callers
    assert_eq!(inner.fetch_count(), 2);
}

#[tokio::test]
async fn test_cyclic_hierarchy_exceeds_depth() {
    let fetcher = MemoryFetcher::new();
    fetcher.insert(
        "http://example.org/A",
        vocab_doc(json!({
            "@id": "http://example.org/A",
            "@type": "rdfs:Class",
            "rdfs:subClassOf": {"@id": "http://example.org/B"}
        })),
    );
    fetcher.insert(
        "http://example.org/B",
        vocab_doc(json!({
            "@id": "http://example.org/B",
            "@type": "rdfs:Class",
            "rdfs:subClassOf": {"@id": "http://example.org/A"}
        })),
    );

    let resolver = SchemaResolver::with_config(
        Arc::new(fetcher),
        ResolverConfig {
            max_depth: 10,
            ..ResolverConfig::default()
        },
    );

    let err = resolver
        .properties("http://example.org/A")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MaxRecursionExceeded { depth: 10, .. }
    ));
}

#[tokio::test]
async fn test_same_as_alias_is_followed() {
    let fetcher = MemoryFetcher::new();
    fetcher.insert(
        "http://example.org/Note",
        vocab_doc(json!({
            "@id": "http://example.org/Note",
            "@type": "rdfs:Class",
            "rdfs:label": "Note",
            "schema:sameAs": {"@id": "http://other.example/Note"}
        })),
    );
    fetcher.insert(
        "http://other.example/Note",
        vocab_doc(json!([
            {
                "@id": "http://other.example/Note",
                "@type": "rdfs:Class"
            },
            {
                "@id": "http://other.example/body",
                "@type": "rdf:Property",
                "rdfs:label": "body",
                "schema:domainIncludes": {"@id": "http://example.org/Note"}
            }
        ])),
    );
    let fetcher = Arc::new(fetcher);
    let resolver = SchemaResolver::new(fetcher.clone());

    let props = resolver.properties("http://example.org/Note").await.unwrap();
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].id, "http://other.example/body");
    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn test_label_lookup_and_scheme_equivalence() {
    let fetcher = fixture_fetcher();
    let resolver = SchemaResolver::new(fetcher);

    // Document registered under http; https lookup still resolves
    let label = resolver
        .label_for_type("https://schema.org/Person")
        .await
        .unwrap();
    assert_eq!(label.as_deref(), Some("Person"));

    let label = resolver
        .label_for_type("http://schema.org/birthDate")
        .await
        .unwrap();
    assert_eq!(label.as_deref(), Some("birthDate"));
}

#[tokio::test]
async fn test_class_for_type_links() {
    let fetcher = fixture_fetcher();
    let resolver = SchemaResolver::new(fetcher);

    let person = resolver
        .class_for_type("https://schema.org/Person")
        .await
        .unwrap()
        .expect("Person should resolve to a class");
    assert_eq!(person.super_classes, vec!["http://schema.org/Thing"]);
    assert_eq!(
        person.comment.as_deref(),
        Some("A person (alive, dead, undead, or fictional).")
    );

    let thing = resolver
        .class_for_type("http://schema.org/Thing")
        .await
        .unwrap()
        .expect("Thing should resolve to a class");
    assert_eq!(thing.sub_classes, vec!["http://schema.org/Person"]);
}

#[tokio::test]
async fn test_default_properties_for_note_document() {
    let resolver = SchemaResolver::new(Arc::new(MemoryFetcher::new()));

    // No fetch needed; curated defaults cover the built-in note type
    let props = resolver
        .default_properties("https://schema.org/NoteDigitalDocument")
        .expect("note type has curated defaults");
    let ids: Vec<&str> = props.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["https://schema.org/dateCreated", "https://schema.org/text"]
    );
    for prop in &props {
        assert!(prop.label.as_deref().is_some_and(|l| !l.is_empty()));
        assert!(prop.comment.as_deref().is_some_and(|c| !c.is_empty()));
    }

    assert!(resolver
        .default_properties("https://schema.org/Person")
        .is_none());
}

#[tokio::test]
async fn test_failed_resolution_retries() {
    let fetcher = Arc::new(MemoryFetcher::new());
    let resolver = SchemaResolver::new(fetcher.clone());

    let err = resolver
        .properties("http://example.org/Missing")
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::Fetch { .. }));

    // Failure is not cached; registering the document fixes the next call
    fetcher.insert(
        "http://example.org/Missing",
        vocab_doc(json!({
            "@id": "http://example.org/Missing",
            "@type": "rdfs:Class"
        })),
    );
    assert!(resolver.properties("http://example.org/Missing").await.is_ok());
}
