use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JsonLdError {
    #[error("Invalid context: {message}")]
    InvalidContext { message: String },

    #[error("Invalid IRI: {iri}")]
    InvalidIri { iri: String },

    #[error("@language cannot be combined with a specified @type")]
    LanguageWithType,

    #[error("Nested sequences are not allowed under key '{key}'")]
    NestedSequence { key: String },

    #[error("Unexpected document shape: {message}")]
    UnexpectedShape { message: String },
}

pub type Result<T> = std::result::Result<T, JsonLdError>;
