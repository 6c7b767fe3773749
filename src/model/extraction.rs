//! Consumed contracts: per-document extraction results and critical-field specs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One extraction run over one source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub document_id: String,
    /// Document type as classified upstream (e.g. "policy", "invoice", "service_history")
    pub document_type: String,
    pub run_id: String,
    pub extracted_at: DateTime<Utc>,
    pub fields: Vec<ExtractedField>,
}

/// A single field record produced by the extraction collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: serde_json::Value,
    pub normalized_value: Option<String>,
    pub confidence: f64,
    /// Verbatim text from the source document backing this value
    pub quote: Option<String>,
}

/// Required ("critical") field names per document type, sourced from extraction specs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriticalFieldSpec(pub BTreeMap<String, Vec<String>>);

impl CriticalFieldSpec {
    /// Union of the required-field lists of every document type observed in the claim
    pub fn critical_for<'a, I>(&self, document_types: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names = BTreeSet::new();
        for doc_type in document_types {
            if let Some(required) = self.0.get(doc_type) {
                names.extend(required.iter().cloned());
            }
        }
        names
    }
}
