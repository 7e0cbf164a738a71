//! Section builder tests, both node-based and triple-based forms.

use notegraph_core::{
    build_item_sections, build_sections, build_sections_with, CoreError, Item, Section,
};
use notegraph_schema::{MemoryFetcher, SchemaResolver};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_primary_rows_precede_nested_header() {
    let node = json!({
        "@type": "https://schema.org/Person",
        "https://schema.org/address": {
            "@type": "https://schema.org/PostalAddress",
            "https://schema.org/streetAddress": "7 S. Broadway"
        },
        "https://schema.org/email": "ada@example.org",
        "https://schema.org/name": "Ada"
    });

    let sections = build_sections(&node).unwrap();
    assert_eq!(
        sections,
        vec![
            Section::ValueRow {
                label: "email".to_string(),
                property: "https://schema.org/email".to_string(),
                subject: String::new(),
                value: json!("ada@example.org"),
            },
            Section::ValueRow {
                label: "name".to_string(),
                property: "https://schema.org/name".to_string(),
                subject: String::new(),
                value: json!("Ada"),
            },
            Section::Header {
                label: "PostalAddress".to_string(),
                level: 2,
            },
            Section::ValueRow {
                label: "streetAddress".to_string(),
                property: "https://schema.org/streetAddress".to_string(),
                subject: String::new(),
                value: json!("7 S. Broadway"),
            },
        ]
    );
}

#[test]
fn test_person_postal_address_scenario() {
    let node = json!({
        "@type": "Person",
        "address": {
            "@type": "PostalAddress",
            "streetAddress": "7 S. Broadway"
        }
    });

    let sections = build_sections(&node).unwrap();
    assert_eq!(
        sections,
        vec![
            Section::Header {
                label: "PostalAddress".to_string(),
                level: 2,
            },
            Section::ValueRow {
                label: "streetAddress".to_string(),
                property: "streetAddress".to_string(),
                subject: String::new(),
                value: json!("7 S. Broadway"),
            },
        ]
    );
}

#[test]
fn test_missing_type_on_root_fails() {
    let err = build_sections(&json!({"name": "no type"})).unwrap_err();
    assert!(matches!(err, CoreError::MissingType { .. }));
}

#[test]
fn test_malformed_value_yields_error_row_only() {
    let node = json!({
        "@type": "Person",
        "broken": {"nested": "no discriminators"},
        "name": "Ada"
    });

    let sections = build_sections(&node).unwrap();
    // The broken value degrades to a placeholder; the rest still renders
    assert!(matches!(sections[0], Section::ErrorRow { .. }));
    assert!(matches!(sections[1], Section::ValueRow { .. }));
    assert_eq!(sections.len(), 2);
}

#[test]
fn test_known_subject_references_are_skipped() {
    let node = json!({
        "@type": "Person",
        "knows": {"@id": "item:alice"},
        "worksFor": {"@id": "https://other.example/org"}
    });

    let known: HashSet<String> = ["item:alice".to_string()].into();
    let sections = build_sections_with(&node, &known).unwrap();
    assert_eq!(
        sections,
        vec![Section::ReferenceRow {
            label: "worksFor".to_string(),
            property: "worksFor".to_string(),
            subject: String::new(),
            target: "https://other.example/org".to_string(),
        }]
    );
}

#[test]
fn test_header_level_caps_at_five() {
    // Six levels of nesting; headers must stop climbing at 5
    let mut node = json!({"@type": "Leaf", "depth": "six"});
    for name in ["E", "D", "C", "B", "A"] {
        node = json!({"@type": name, "child": node});
    }

    let sections = build_sections(&node).unwrap();
    let levels: Vec<u8> = sections
        .iter()
        .filter_map(|s| match s {
            Section::Header { level, .. } => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![2, 3, 4, 5, 5]);
}

async fn loaded_person_item() -> Item {
    let mut item = Item::new("https://schema.org/Person");
    item.load(&json!({
        "@context": "https://schema.org/",
        "@type": "Person",
        "name": "Ada",
        "address": {
            "@type": "PostalAddress",
            "streetAddress": "7 S. Broadway"
        }
    }))
    .await
    .unwrap();
    item
}

fn postal_address_fetcher() -> Arc<MemoryFetcher> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert(
        "http://schema.org/PostalAddress",
        json!({
            "@context": {
                "rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
                "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
                "schema": "http://schema.org/"
            },
            "@graph": [
                {
                    "@id": "http://schema.org/PostalAddress",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Postal address"
                },
                {
                    "@id": "https://schema.org/streetAddress",
                    "@type": "rdf:Property",
                    "rdfs:label": "Street address",
                    "schema:domainIncludes": {"@id": "http://schema.org/PostalAddress"}
                }
            ]
        }),
    );
    Arc::new(fetcher)
}

#[tokio::test]
async fn test_item_sections_resolve_labels() {
    let item = loaded_person_item().await;
    let resolver = SchemaResolver::new(postal_address_fetcher());

    let sections = build_item_sections(&item, &resolver).await;
    assert_eq!(
        sections,
        vec![
            // Primary subject first, headerless; the address reference is
            // a known subject and renders as its own section instead
            Section::ValueRow {
                label: "https://schema.org/name".to_string(),
                property: "https://schema.org/name".to_string(),
                subject: item.uri().to_string(),
                value: json!("Ada"),
            },
            Section::Header {
                label: "Postal address".to_string(),
                level: 2,
            },
            Section::ValueRow {
                label: "Street address".to_string(),
                property: "https://schema.org/streetAddress".to_string(),
                subject: "_:b0".to_string(),
                value: json!("7 S. Broadway"),
            },
        ]
    );
}

#[tokio::test]
async fn test_item_sections_degrade_to_raw_iri() {
    let item = loaded_person_item().await;
    // Nothing registered: every label lookup fails and degrades
    let resolver = SchemaResolver::new(Arc::new(MemoryFetcher::new()));

    let sections = build_item_sections(&item, &resolver).await;
    assert_eq!(
        sections[1],
        Section::Header {
            label: "https://schema.org/PostalAddress".to_string(),
            level: 2,
        }
    );
}

#[tokio::test]
async fn test_item_sections_include_provenance_reference() {
    let mut item = Item::new("https://schema.org/NoteDigitalDocument");
    item.load(&json!({
        "@context": "https://schema.org/",
        "@id": "http://imported.example/note-1",
        "@type": "NoteDigitalDocument",
        "text": "imported"
    }))
    .await
    .unwrap();
    let resolver = SchemaResolver::new(Arc::new(MemoryFetcher::new()));

    let sections = build_item_sections(&item, &resolver).await;
    // The derived-from marker points outside the item, so it renders as
    // a reference row
    assert!(sections.iter().any(|s| matches!(
        s,
        Section::ReferenceRow { target, .. } if target == "http://imported.example/note-1"
    )));
}
