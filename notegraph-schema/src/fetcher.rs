//! The HTTP seam of the vocabulary resolver.
//!
//! The resolver only ever sees [`SchemaFetcher`]; apps inject either the
//! reqwest-backed [`HttpFetcher`] or the in-memory [`MemoryFetcher`]
//! (tests, offline scaffolding).

use crate::error::{Result, SchemaError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;

/// JSON-LD media type sent for content negotiation.
pub const JSON_LD_MEDIA_TYPE: &str = "application/ld+json";

/// Fetches raw vocabulary documents by IRI.
#[async_trait]
pub trait SchemaFetcher: Debug + Send + Sync {
    /// Fetch the vocabulary document published at `iri`.
    ///
    /// Implementations must negotiate for `application/ld+json`.
    async fn fetch(&self, iri: &str) -> Result<JsonValue>;
}

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Timeout for a single vocabulary request
    pub request_timeout: Duration,
    /// Hosts that answer `303 See Other` for content negotiation; for
    /// these we request the `.jsonld` document directly
    pub jsonld_suffix_hosts: Vec<String>,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            jsonld_suffix_hosts: vec!["schema.org".to_string()],
        }
    }
}

/// reqwest-backed fetcher with content negotiation.
#[derive(Debug)]
pub struct HttpFetcher {
    config: HttpFetcherConfig,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_config(HttpFetcherConfig::default())
    }

    pub fn with_config(config: HttpFetcherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Rewrite the request URL for hosts known to 303-redirect instead of
    /// honoring the Accept header.
    fn request_url(&self, iri: &str) -> String {
        let suffix_host = self
            .config
            .jsonld_suffix_hosts
            .iter()
            .any(|host| iri.contains(host.as_str()));
        if suffix_host && !iri.ends_with(".jsonld") {
            format!("{}.jsonld", iri)
        } else {
            iri.to_string()
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaFetcher for HttpFetcher {
    async fn fetch(&self, iri: &str) -> Result<JsonValue> {
        if !iri.starts_with("http") {
            return Err(SchemaError::InvalidIri {
                iri: iri.to_string(),
            });
        }

        let url = self.request_url(iri);
        debug!(iri = %iri, url = %url, "fetching vocabulary document");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, JSON_LD_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| SchemaError::fetch(iri, e.to_string()))?
            .error_for_status()
            .map_err(|e| SchemaError::fetch(iri, e.to_string()))?;

        response
            .json::<JsonValue>()
            .await
            .map_err(|e| SchemaError::fetch(iri, e.to_string()))
    }
}

/// In-memory fetcher keyed by IRI.
///
/// Counts fetches per IRI so tests can assert that resolution is memoized
/// and concurrent lookups coalesce onto one fetch.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    documents: RwLock<HashMap<String, JsonValue>>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vocabulary document under its IRI.
    pub fn insert(&self, iri: impl Into<String>, doc: JsonValue) {
        self.documents
            .write()
            .expect("fetcher lock poisoned")
            .insert(iri.into(), doc);
    }

    /// Total number of fetch calls served (hits and misses).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaFetcher for MemoryFetcher {
    async fn fetch(&self, iri: &str) -> Result<JsonValue> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let documents = self.documents.read().expect("fetcher lock poisoned");
        documents
            .get(iri)
            .or_else(|| {
                let normalized = notegraph_vocab::normalize_scheme(iri);
                documents.get(normalized.as_ref())
            })
            .cloned()
            .ok_or_else(|| SchemaError::fetch(iri, "no document registered"))
    }
}
