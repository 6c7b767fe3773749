//! Quality gate over a reconciled fact set
//!
//! Evaluates completeness, conflict load, and size against configured
//! thresholds. The result is informational for operators and persisted with
//! the reconciliation report; it never blocks screening.

use std::collections::BTreeSet;

use crate::model::{FactConflict, FactSet, GateStatus, GateThresholds, QualityGateResult};

pub struct QualityGate {
    thresholds: GateThresholds,
}

impl QualityGate {
    pub fn new(thresholds: GateThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(
        &self,
        facts: &FactSet,
        conflicts: &[FactConflict],
        critical_facts: &BTreeSet<String>,
    ) -> QualityGateResult {
        let t = &self.thresholds;

        // A critical name is satisfied by an exact match or a namespaced fact
        let missing_critical_facts: Vec<String> = critical_facts
            .iter()
            .filter(|name| facts.resolve(name).is_none())
            .cloned()
            .collect();
        let missing = missing_critical_facts.len();

        let conflict_count = conflicts.len();
        let estimated_tokens = estimate_tokens(facts, t.chars_per_token);
        let provenance_coverage = provenance_coverage(facts);

        let mut reasons = Vec::new();
        let mut status = GateStatus::Pass;

        // FAIL dominates WARN; evaluate its conditions first
        if missing > t.missing_critical_fail {
            reasons.push(format!(
                "{missing} critical facts missing (fail threshold {})",
                t.missing_critical_fail
            ));
            status = GateStatus::Fail;
        }
        if conflict_count > t.conflict_fail {
            reasons.push(format!(
                "{conflict_count} fact conflicts (fail threshold {})",
                t.conflict_fail
            ));
            status = GateStatus::Fail;
        }
        if estimated_tokens > t.token_fail {
            reasons.push(format!(
                "estimated {estimated_tokens} tokens (fail threshold {})",
                t.token_fail
            ));
            status = GateStatus::Fail;
        }

        if status != GateStatus::Fail {
            if missing > 0 && missing <= t.missing_critical_warn {
                reasons.push(format!(
                    "{missing} critical facts missing (warn threshold {})",
                    t.missing_critical_warn
                ));
                status = GateStatus::Warn;
            }
            if conflict_count > 0 && conflict_count <= t.conflict_warn {
                reasons.push(format!(
                    "{conflict_count} fact conflicts (warn threshold {})",
                    t.conflict_warn
                ));
                status = GateStatus::Warn;
            }
            if estimated_tokens > t.token_warn {
                reasons.push(format!(
                    "estimated {estimated_tokens} tokens (warn threshold {})",
                    t.token_warn
                ));
                status = GateStatus::Warn;
            }
        }

        QualityGateResult {
            status,
            missing_critical_facts,
            conflict_count,
            provenance_coverage,
            estimated_tokens,
            reasons,
        }
    }
}

/// Rough token proxy: character count of every value and name over the
/// configured divisor
fn estimate_tokens(facts: &FactSet, chars_per_token: usize) -> usize {
    let chars: usize = facts
        .iter()
        .map(|f| f.value_text().chars().count() + f.name.chars().count())
        .sum();
    chars / chars_per_token.max(1)
}

/// Fraction of facts whose provenance carries a non-empty verbatim quote
fn provenance_coverage(facts: &FactSet) -> f64 {
    if facts.is_empty() {
        return 0.0;
    }
    let with_quote = facts
        .iter()
        .filter(|f| {
            f.selected_from
                .quote
                .as_deref()
                .is_some_and(|q| !q.trim().is_empty())
        })
        .count();
    with_quote as f64 / facts.len() as f64
}
