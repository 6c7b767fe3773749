//! Persisted per-claim reconciliation report and the run-level rollup

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::facts::{FactConflict, FactSet};
use crate::model::gate::QualityGateResult;

/// Output of one reconciliation run for one claim. Superseded, never edited
/// in place, by subsequent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub claim_id: String,
    pub run_id: String,
    pub facts: FactSet,
    pub conflicts: Vec<FactConflict>,
    pub gate: QualityGateResult,
    /// Extraction run used per document id
    pub document_runs: BTreeMap<String, String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactFrequency {
    pub name: String,
    pub count: usize,
}

/// A claim that could not complete processing; recorded instead of propagated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedClaim {
    pub claim_id: String,
    pub error: String,
}

/// Run-level aggregation over every claim's reconciliation report, for
/// operational review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub claims_total: usize,
    pub claims_completed: usize,
    pub claims_failed: usize,
    pub gate_pass: usize,
    pub gate_warn: usize,
    pub gate_fail: usize,
    pub approved: usize,
    pub rejected: usize,
    pub referred: usize,
    pub auto_rejected: usize,
    pub most_missing_facts: Vec<FactFrequency>,
    pub most_frequent_conflicts: Vec<FactFrequency>,
    pub avg_conflicts: f64,
    pub avg_provenance_coverage: f64,
    pub avg_estimated_tokens: f64,
    pub failed_claims: Vec<FailedClaim>,
    pub generated_at: DateTime<Utc>,
}
