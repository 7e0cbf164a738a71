//! Normalized views of RDFS vocabulary entries.

use serde::{Deserialize, Serialize};

/// A property description extracted from a vocabulary document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfsProperty {
    /// Property IRI
    pub id: String,
    /// Human label (`rdfs:label`)
    pub label: Option<String>,
    /// Description (`rdfs:comment`)
    pub comment: Option<String>,
    /// Classes this property applies to (`schema:domainIncludes` / `rdfs:domain`)
    pub domain_includes: Vec<String>,
}

impl RdfsProperty {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            comment: None,
            domain_includes: Vec::new(),
        }
    }
}

/// A class description with its hierarchy links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfsClass {
    /// Class IRI
    pub id: String,
    /// Human label (`rdfs:label`)
    pub label: Option<String>,
    /// Description (`rdfs:comment`)
    pub comment: Option<String>,
    /// Direct super-classes (`rdfs:subClassOf`)
    pub super_classes: Vec<String>,
    /// Direct sub-classes (inverse links discovered during resolution)
    pub sub_classes: Vec<String>,
}

impl RdfsClass {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            comment: None,
            super_classes: Vec::new(),
            sub_classes: Vec::new(),
        }
    }
}
