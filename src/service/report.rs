//! Run-level aggregation of per-claim reports for operational review

use std::collections::BTreeMap;

use chrono::Utc;

use crate::model::{Decision, FactFrequency, FailedClaim, GateStatus, RunSummary};
use crate::service::pipeline::ClaimOutcome;

/// How many of the most frequent entries the summary keeps
const TOP_FREQUENCIES: usize = 10;

/// Roll every claim's reconciliation report up into summary statistics
pub fn build_run_summary(
    run_id: &str,
    outcomes: &[ClaimOutcome],
    claims_total: usize,
    failed_claims: Vec<FailedClaim>,
) -> RunSummary {
    let mut gate_pass = 0;
    let mut gate_warn = 0;
    let mut gate_fail = 0;
    let mut approved = 0;
    let mut rejected = 0;
    let mut referred = 0;
    let mut auto_rejected = 0;

    let mut missing_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut conflict_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut conflict_total = 0usize;
    let mut provenance_total = 0.0;
    let mut token_total = 0usize;

    for outcome in outcomes {
        match outcome.report.gate.status {
            GateStatus::Pass => gate_pass += 1,
            GateStatus::Warn => gate_warn += 1,
            GateStatus::Fail => gate_fail += 1,
        }
        match outcome.decision.decision {
            Decision::Approve => approved += 1,
            Decision::Reject => rejected += 1,
            Decision::Refer => referred += 1,
        }
        if outcome.screening.auto_reject {
            auto_rejected += 1;
        }

        for name in &outcome.report.gate.missing_critical_facts {
            *missing_counts.entry(name.as_str()).or_default() += 1;
        }
        for conflict in &outcome.report.conflicts {
            *conflict_counts.entry(conflict.fact_name.as_str()).or_default() += 1;
        }

        conflict_total += outcome.report.conflicts.len();
        provenance_total += outcome.report.gate.provenance_coverage;
        token_total += outcome.report.gate.estimated_tokens;
    }

    let completed = outcomes.len();
    let denominator = completed.max(1) as f64;

    RunSummary {
        run_id: run_id.to_string(),
        claims_total,
        claims_completed: completed,
        claims_failed: failed_claims.len(),
        gate_pass,
        gate_warn,
        gate_fail,
        approved,
        rejected,
        referred,
        auto_rejected,
        most_missing_facts: top_frequencies(missing_counts),
        most_frequent_conflicts: top_frequencies(conflict_counts),
        avg_conflicts: conflict_total as f64 / denominator,
        avg_provenance_coverage: provenance_total / denominator,
        avg_estimated_tokens: token_total as f64 / denominator,
        failed_claims,
        generated_at: Utc::now(),
    }
}

/// Most frequent names first; ties resolve alphabetically
fn top_frequencies(counts: BTreeMap<&str, usize>) -> Vec<FactFrequency> {
    let mut frequencies: Vec<FactFrequency> = counts
        .into_iter()
        .map(|(name, count)| FactFrequency {
            name: name.to_string(),
            count,
        })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    frequencies.truncate(TOP_FREQUENCIES);
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CompositeConfidence, ConfidenceBand, ConflictValue, DecisionRecord, FactConflict, FactSet,
        PayoutBreakdown, QualityGateResult, ReconciliationReport, ScreeningResult,
        SelectionReason,
    };

    fn outcome(
        claim_id: &str,
        gate_status: GateStatus,
        missing: &[&str],
        conflicts: &[&str],
        decision: Decision,
    ) -> ClaimOutcome {
        let report = ReconciliationReport {
            claim_id: claim_id.to_string(),
            run_id: "r1".to_string(),
            facts: FactSet::default(),
            conflicts: conflicts
                .iter()
                .map(|name| FactConflict {
                    fact_name: name.to_string(),
                    values: vec![ConflictValue {
                        value: "x".to_string(),
                        sources: vec![],
                    }],
                    selected_value: "x".to_string(),
                    selected_confidence: 0.9,
                    selection_reason: SelectionReason::HighestConfidence,
                })
                .collect(),
            gate: QualityGateResult {
                status: gate_status,
                missing_critical_facts: missing.iter().map(|s| s.to_string()).collect(),
                conflict_count: conflicts.len(),
                provenance_coverage: 0.5,
                estimated_tokens: 100,
                reasons: vec![],
            },
            document_runs: Default::default(),
            generated_at: Utc::now(),
        };
        let screening = ScreeningResult::from_checks(claim_id.to_string(), vec![], None);
        let decision = DecisionRecord {
            claim_id: claim_id.to_string(),
            decision,
            confidence: 0.8,
            rationale: "r".to_string(),
            checks: vec![],
            payout: PayoutBreakdown::zeroed("EUR"),
            fraud_indicators: vec![],
            model: None,
            tokens_spent: 0,
            generated_at: Utc::now(),
        };
        ClaimOutcome {
            claim_id: claim_id.to_string(),
            report,
            screening,
            decision,
            signals: vec![],
            composite: CompositeConfidence {
                score: 0.5,
                band: ConfidenceBand::Medium,
                signal_count: 0,
            },
        }
    }

    #[test]
    fn test_summary_counts_and_averages() {
        let outcomes = vec![
            outcome("c1", GateStatus::Pass, &[], &["vin"], Decision::Approve),
            outcome("c2", GateStatus::Warn, &["vin"], &["vin", "mileage"], Decision::Reject),
            outcome("c3", GateStatus::Fail, &["vin", "claim_date"], &[], Decision::Refer),
        ];

        let summary = build_run_summary(
            "r1",
            &outcomes,
            4,
            vec![FailedClaim {
                claim_id: "c4".to_string(),
                error: "no extraction data".to_string(),
            }],
        );

        assert_eq!(summary.claims_total, 4);
        assert_eq!(summary.claims_completed, 3);
        assert_eq!(summary.claims_failed, 1);
        assert_eq!((summary.gate_pass, summary.gate_warn, summary.gate_fail), (1, 1, 1));
        assert_eq!((summary.approved, summary.rejected, summary.referred), (1, 1, 1));
        assert_eq!(summary.avg_conflicts, 1.0);
        assert!((summary.avg_provenance_coverage - 0.5).abs() < 1e-9);

        // "vin" missing twice tops the list
        assert_eq!(summary.most_missing_facts[0].name, "vin");
        assert_eq!(summary.most_missing_facts[0].count, 2);
        assert_eq!(summary.most_frequent_conflicts[0].name, "vin");
        assert_eq!(summary.most_frequent_conflicts[0].count, 2);
    }

    #[test]
    fn test_empty_run_has_zero_averages() {
        let summary = build_run_summary("r1", &[], 0, vec![]);

        assert_eq!(summary.claims_completed, 0);
        assert_eq!(summary.avg_conflicts, 0.0);
        assert!(summary.most_missing_facts.is_empty());
    }
}
