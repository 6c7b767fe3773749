//! Quality gate result for a reconciliation run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Warn,
    Fail,
}

/// Computed once per reconciliation run and persisted alongside the facts.
/// Informational for operators; never a circuit-breaker on screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGateResult {
    pub status: GateStatus,
    pub missing_critical_facts: Vec<String>,
    pub conflict_count: usize,
    /// Fraction of reconciled facts backed by a verbatim source quote
    pub provenance_coverage: f64,
    /// Heuristic size estimate of the fact set
    pub estimated_tokens: usize,
    pub reasons: Vec<String>,
}
