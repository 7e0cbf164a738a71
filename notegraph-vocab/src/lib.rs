//! RDF vocabulary constants and IRI helpers for notegraph
//!
//! Centralizes the vocabulary IRIs used across the workspace so that the
//! item model, section builder, and schema resolver all agree on them.
//!
//! # Organization
//!
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `schema_org` - schema.org terms the default-item scaffolding uses
//! - scheme normalization helpers (`normalize_scheme`, `iris_equivalent`)

use std::borrow::Cow;

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:Property IRI
    pub const PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// rdfs:Class IRI
    pub const CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";

    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// rdfs:comment IRI
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

    /// rdfs:subClassOf IRI
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

    /// rdfs:subPropertyOf IRI
    pub const SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";

    /// rdfs:domain IRI
    pub const DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
}

/// schema.org terms used by vocabulary resolution and item scaffolding
pub mod schema_org {
    /// schema.org namespace (http form, as published documents use it)
    pub const NS: &str = "http://schema.org/";

    /// schema:domainIncludes IRI
    pub const DOMAIN_INCLUDES: &str = "http://schema.org/domainIncludes";

    /// schema:sameAs IRI
    pub const SAME_AS: &str = "http://schema.org/sameAs";

    /// schema:NoteDigitalDocument IRI
    pub const NOTE_DIGITAL_DOCUMENT: &str = "https://schema.org/NoteDigitalDocument";

    /// schema:dateCreated IRI
    pub const DATE_CREATED: &str = "https://schema.org/dateCreated";

    /// schema:text IRI
    pub const TEXT: &str = "https://schema.org/text";
}

/// Rewrite an `https://` IRI to its `http://` form.
///
/// Vocabulary providers publish the same terms under both schemes; callers
/// that opt into scheme normalization compare IRIs through this function.
pub fn normalize_scheme(iri: &str) -> Cow<'_, str> {
    match iri.strip_prefix("https://") {
        Some(rest) => Cow::Owned(format!("http://{}", rest)),
        None => Cow::Borrowed(iri),
    }
}

/// Compare two IRIs, optionally treating http/https scheme variants of the
/// same host+path as equivalent.
pub fn iris_equivalent(a: &str, b: &str, normalize: bool) -> bool {
    if normalize {
        normalize_scheme(a) == normalize_scheme(b)
    } else {
        a == b
    }
}

/// Return the local name of an IRI: the segment after the last `#` or `/`.
///
/// Used as the degraded human label when no `rdfs:label` is available.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/'])
        .find(|s| !s.is_empty())
        .unwrap_or(iri)
}
