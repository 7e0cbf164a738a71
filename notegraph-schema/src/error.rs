//! Error types for notegraph-schema

use notegraph_json_ld::JsonLdError;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Vocabulary resolution error type
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    /// Network or parse failure fetching a vocabulary document
    #[error("failed to fetch vocabulary for {iri}: {message}")]
    Fetch { iri: String, message: String },

    /// Class-hierarchy walk exceeded its depth bound; the vocabulary is
    /// external and may contain unexpected cycles
    #[error("maximum recursion depth ({depth}) exceeded resolving {iri}")]
    MaxRecursionExceeded { iri: String, depth: usize },

    /// The vocabulary document is not valid JSON-LD
    #[error(transparent)]
    JsonLd(#[from] JsonLdError),

    /// The IRI is not something we can fetch a vocabulary for
    #[error("invalid vocabulary IRI: {iri}")]
    InvalidIri { iri: String },
}

impl SchemaError {
    /// Create a fetch error
    pub fn fetch(iri: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::Fetch {
            iri: iri.into(),
            message: message.into(),
        }
    }
}
