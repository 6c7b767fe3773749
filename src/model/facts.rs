//! Reconciled facts and conflict records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical short fact names used by the screening checks. All lookups go
/// through [`FactSet::resolve`], so namespaced variants such as
/// `policy.start_date` satisfy these as well.
pub mod fact_names {
    pub const POLICY_START_DATE: &str = "start_date";
    pub const POLICY_END_DATE: &str = "end_date";
    pub const CLAIM_DATE: &str = "claim_date";
    pub const DAMAGE_DATE: &str = "damage_date";
    pub const POLICYHOLDER_NAME: &str = "policyholder_name";
    pub const OWNER_NAME: &str = "owner_name";
    pub const MILEAGE: &str = "mileage";
    pub const MILEAGE_LIMIT: &str = "mileage_limit";
    pub const REPAIR_SHOP: &str = "repair_shop";
    pub const LAST_SERVICE_DATE: &str = "last_service_date";
    pub const DOCUMENT_DATE: &str = "document_date";
    pub const DEDUCTIBLE: &str = "deductible";
}

/// Where a selected fact value came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactProvenance {
    pub document_id: String,
    pub document_type: String,
    pub run_id: String,
    /// Verbatim text from the source document, when the extractor captured one
    pub quote: Option<String>,
}

/// A single reconciled fact. At most one exists per name per claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedFact {
    pub name: String,
    pub value: serde_json::Value,
    pub normalized_value: Option<String>,
    pub confidence: f64,
    pub selected_from: FactProvenance,
}

impl AggregatedFact {
    /// Raw value rendered as plain text (strings without JSON quoting)
    pub fn value_text(&self) -> String {
        render_value(&self.value)
    }
}

/// Render a JSON value as plain text for comparison and display
pub fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Canonical comparison form of a candidate value: the normalized value when
/// present, the rendered raw value otherwise
pub fn comparison_key(value: &serde_json::Value, normalized: Option<&str>) -> String {
    match normalized {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => render_value(value),
    }
}

/// Reconciled facts for one claim, keyed by canonical name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSet(BTreeMap<String, AggregatedFact>);

impl FactSet {
    pub fn insert(&mut self, fact: AggregatedFact) {
        self.0.insert(fact.name.clone(), fact);
    }

    pub fn get(&self, name: &str) -> Option<&AggregatedFact> {
        self.0.get(name)
    }

    /// Exact-name lookup, falling back to a namespace-suffix match so that
    /// `service_history.document_date` satisfies a request for `document_date`
    pub fn resolve(&self, name: &str) -> Option<&AggregatedFact> {
        if let Some(fact) = self.0.get(name) {
            return Some(fact);
        }
        let suffix = format!(".{name}");
        self.0.values().find(|f| f.name.ends_with(&suffix))
    }

    /// Resolved value rendered as text, preferring the normalized form
    pub fn resolve_text(&self, name: &str) -> Option<String> {
        self.resolve(name).map(|f| {
            f.normalized_value
                .clone()
                .unwrap_or_else(|| f.value_text())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatedFact> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Why a conflicting value was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    HighestConfidence,
}

/// One distinct candidate value inside a conflict, with every source that reported it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictValue {
    pub value: String,
    pub sources: Vec<FactProvenance>,
}

/// Recorded when two or more distinct values were reported for the same fact name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactConflict {
    pub fact_name: String,
    pub values: Vec<ConflictValue>,
    pub selected_value: String,
    pub selected_confidence: f64,
    pub selection_reason: SelectionReason,
}
