//! Error types for notegraph-core

use notegraph_json_ld::JsonLdError;
use notegraph_schema::SchemaError;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, CoreError>;

/// Item-pipeline error type
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// A JSON-LD node has none of the expected discriminator keys
    /// (`@value`, `@id`, `@type`) and is not a raw scalar
    #[error("malformed node: {message}")]
    MalformedNode { message: String },

    /// Item loads accept exactly one top-level subject
    #[error("payload expanded to {count} top-level subjects, expected exactly one")]
    MultipleSubjects { count: usize },

    /// The payload already asserts keys in the item provenance namespace
    #[error("payload already contains reserved provenance key {key}")]
    ReservedKeyConflict { key: String },

    /// Section rendering requires every node to declare a `@type`
    #[error("node {subject} has no @type")]
    MissingType { subject: String },

    /// JSON-LD expansion or flattening failed
    #[error(transparent)]
    JsonLd(#[from] JsonLdError),

    /// Vocabulary resolution failed while building an item
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CoreError {
    /// Create a malformed-node error
    pub fn malformed(message: impl Into<String>) -> Self {
        CoreError::MalformedNode {
            message: message.into(),
        }
    }
}
