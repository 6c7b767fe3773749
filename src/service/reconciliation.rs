//! Fact reconciliation across per-document extraction runs
//!
//! Merges every document's extracted fields into one fact set per claim and
//! records a conflict wherever documents disagree on a value.

use std::collections::BTreeMap;

use crate::model::{
    AggregatedFact, ConflictValue, DocumentExtraction, ExtractedField, FactConflict,
    FactProvenance, FactSet, SelectionReason, comparison_key,
};

/// Output of one reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconciledFacts {
    pub facts: FactSet,
    pub conflicts: Vec<FactConflict>,
    /// Extraction run used per document id
    pub document_runs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct FactReconciler;

struct Candidate<'a> {
    document: &'a DocumentExtraction,
    field: &'a ExtractedField,
    key: String,
}

impl FactReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile the claim's extractions into one fact per name.
    ///
    /// Selection is deterministic and independent of input order: candidates
    /// are ranked by confidence, with ties broken by document id and value.
    pub fn reconcile(&self, extractions: &[DocumentExtraction]) -> ReconciledFacts {
        let selected_runs = select_latest_runs(extractions);
        let document_runs: BTreeMap<String, String> = selected_runs
            .iter()
            .map(|(id, doc)| (id.clone(), doc.run_id.clone()))
            .collect();

        let mut by_name: BTreeMap<&str, Vec<Candidate<'_>>> = BTreeMap::new();
        for document in selected_runs.values() {
            for field in &document.fields {
                // Absent values are neither selected nor counted as conflicting
                if field.value.is_null() {
                    continue;
                }
                by_name.entry(field.name.as_str()).or_default().push(Candidate {
                    document,
                    field,
                    key: comparison_key(&field.value, field.normalized_value.as_deref()),
                });
            }
        }

        let mut facts = FactSet::default();
        let mut conflicts = Vec::new();

        for (name, mut candidates) in by_name {
            candidates.sort_by(|a, b| {
                b.field
                    .confidence
                    .total_cmp(&a.field.confidence)
                    .then_with(|| a.document.document_id.cmp(&b.document.document_id))
                    .then_with(|| a.key.cmp(&b.key))
            });

            let winner = &candidates[0];
            facts.insert(AggregatedFact {
                name: name.to_string(),
                value: winner.field.value.clone(),
                normalized_value: winner.field.normalized_value.clone(),
                confidence: winner.field.confidence,
                selected_from: provenance(winner),
            });

            let values = group_by_value(&candidates);
            if values.len() >= 2 {
                tracing::debug!(
                    fact = name,
                    distinct_values = values.len(),
                    candidates = candidates.len(),
                    "Conflicting values detected during reconciliation"
                );
                conflicts.push(FactConflict {
                    fact_name: name.to_string(),
                    selected_value: winner.key.clone(),
                    selected_confidence: winner.field.confidence,
                    selection_reason: SelectionReason::HighestConfidence,
                    values,
                });
            }
        }

        tracing::debug!(
            facts = facts.len(),
            conflicts = conflicts.len(),
            documents = document_runs.len(),
            "Reconciliation complete"
        );

        ReconciledFacts {
            facts,
            conflicts,
            document_runs,
        }
    }
}

/// Group candidates by distinct comparison value, preserving ranking order
fn group_by_value(candidates: &[Candidate<'_>]) -> Vec<ConflictValue> {
    let mut groups: Vec<ConflictValue> = Vec::new();
    for candidate in candidates {
        match groups.iter_mut().find(|g| g.value == candidate.key) {
            Some(group) => group.sources.push(provenance(candidate)),
            None => groups.push(ConflictValue {
                value: candidate.key.clone(),
                sources: vec![provenance(candidate)],
            }),
        }
    }
    groups
}

fn provenance(candidate: &Candidate<'_>) -> FactProvenance {
    FactProvenance {
        document_id: candidate.document.document_id.clone(),
        document_type: candidate.document.document_type.clone(),
        run_id: candidate.document.run_id.clone(),
        quote: candidate.field.quote.clone(),
    }
}

/// Pick the newest extraction run per document; ties resolve to the larger
/// run id so repeated inputs stay deterministic
fn select_latest_runs(extractions: &[DocumentExtraction]) -> BTreeMap<String, &DocumentExtraction> {
    let mut latest: BTreeMap<String, &DocumentExtraction> = BTreeMap::new();
    for extraction in extractions {
        match latest.get(&extraction.document_id) {
            Some(current)
                if (current.extracted_at, &current.run_id)
                    >= (extraction.extracted_at, &extraction.run_id) => {}
            _ => {
                latest.insert(extraction.document_id.clone(), extraction);
            }
        }
    }
    latest
}
