//! Confidence-signal collection across pipeline stages
//!
//! One extraction function per stage, each independently fail-safe: a
//! missing or degenerate stage output yields no signals and a warning,
//! never an error and never an out-of-range value.

mod scorer;

pub use scorer::CompositeScorer;

use crate::model::{
    CoverageAnalysis, Decision, DecisionRecord, DocumentExtraction, GateStatus,
    ReconciliationReport, ScreeningResult, SignalSnapshot, SourceStage,
};

/// Stage outputs available for one claim run
pub struct StageArtifacts<'a> {
    pub extractions: Option<&'a [DocumentExtraction]>,
    pub reconciliation: Option<&'a ReconciliationReport>,
    pub coverage: Option<&'a CoverageAnalysis>,
    pub screening: Option<&'a ScreeningResult>,
    pub decision: Option<&'a DecisionRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct SignalCollector;

impl SignalCollector {
    pub fn new() -> Self {
        Self
    }

    /// Collect every available signal. Stages are independent; one stage's
    /// missing output never prevents collection from the others.
    pub fn collect(&self, artifacts: &StageArtifacts<'_>) -> Vec<SignalSnapshot> {
        let mut signals = Vec::new();
        signals.extend(extraction_signals(artifacts.extractions));
        signals.extend(reconciliation_signals(artifacts.reconciliation));
        signals.extend(coverage_signals(artifacts.coverage));
        signals.extend(screening_signals(artifacts.screening));
        signals.extend(assessment_signals(artifacts.decision));
        signals.extend(decision_signals(artifacts.decision, artifacts.coverage));

        tracing::debug!(count = signals.len(), "Signal collection complete");
        signals
    }
}

/// Rate helper: `None` when the denominator is zero
fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

fn stage_unavailable(stage: &str) -> Vec<SignalSnapshot> {
    tracing::warn!(stage = stage, "Stage output unavailable, no signals collected");
    Vec::new()
}

fn extraction_signals(extractions: Option<&[DocumentExtraction]>) -> Vec<SignalSnapshot> {
    let Some(extractions) = extractions else {
        return stage_unavailable("extraction");
    };

    let confidences: Vec<f64> = extractions
        .iter()
        .flat_map(|d| d.fields.iter())
        .map(|f| f.confidence)
        .filter(|c| c.is_finite())
        .collect();
    if confidences.is_empty() {
        return stage_unavailable("extraction");
    }

    let avg = confidences.iter().sum::<f64>() / confidences.len() as f64;
    let min = confidences.iter().copied().fold(f64::INFINITY, f64::min);

    vec![
        SignalSnapshot::new(
            "extraction.avg_field_confidence",
            avg,
            avg,
            SourceStage::Extraction,
            "Mean extraction confidence across all fields",
        ),
        SignalSnapshot::new(
            "extraction.min_field_confidence",
            min,
            min,
            SourceStage::Extraction,
            "Weakest extraction confidence across all fields",
        ),
    ]
}

fn reconciliation_signals(report: Option<&ReconciliationReport>) -> Vec<SignalSnapshot> {
    let Some(report) = report else {
        return stage_unavailable("reconciliation");
    };

    let mut signals = Vec::new();

    if let Some(conflict_rate) = ratio(report.conflicts.len(), report.facts.len()) {
        signals.push(SignalSnapshot::new(
            "reconciliation.conflict_rate",
            conflict_rate,
            1.0 - conflict_rate,
            SourceStage::Reconciliation,
            "Inverted share of facts with conflicting values",
        ));
    }

    signals.push(SignalSnapshot::new(
        "reconciliation.provenance_coverage",
        report.gate.provenance_coverage,
        report.gate.provenance_coverage,
        SourceStage::Reconciliation,
        "Share of facts backed by a verbatim source quote",
    ));

    let missing = report.gate.missing_critical_facts.len();
    if let Some(gap_rate) = ratio(missing, missing + report.facts.len()) {
        signals.push(SignalSnapshot::new(
            "reconciliation.critical_gap_penalty",
            gap_rate,
            1.0 - gap_rate,
            SourceStage::Reconciliation,
            "Inverted share of critical facts left unresolved",
        ));
    }

    let gate_score = match report.gate.status {
        GateStatus::Pass => 1.0,
        GateStatus::Warn => 0.5,
        GateStatus::Fail => 0.0,
    };
    signals.push(SignalSnapshot::new(
        "reconciliation.gate_status",
        gate_score,
        gate_score,
        SourceStage::Reconciliation,
        "Quality gate status mapped to a fixed score table",
    ));

    signals
}

fn coverage_signals(coverage: Option<&CoverageAnalysis>) -> Vec<SignalSnapshot> {
    let Some(coverage) = coverage else {
        return stage_unavailable("coverage");
    };

    let mut signals = Vec::new();

    let confidences: Vec<f64> = coverage
        .items
        .iter()
        .filter_map(|i| i.match_confidence)
        .filter(|c| c.is_finite())
        .collect();
    if !confidences.is_empty() {
        let avg = confidences.iter().sum::<f64>() / confidences.len() as f64;
        signals.push(SignalSnapshot::new(
            "coverage.avg_match_confidence",
            avg,
            avg,
            SourceStage::Coverage,
            "Mean line-item match confidence",
        ));
    }

    if let Some(review_rate) = ratio(coverage.review_needed_count(), coverage.items.len()) {
        signals.push(SignalSnapshot::new(
            "coverage.review_needed_rate",
            review_rate,
            1.0 - review_rate,
            SourceStage::Coverage,
            "Inverted share of line items needing manual review",
        ));
    }

    if !coverage.items.is_empty() {
        let count = coverage.items.len();
        signals.push(SignalSnapshot::new(
            "coverage.line_item_complexity",
            count as f64,
            complexity_score(count),
            SourceStage::Coverage,
            "Decay curve penalizing claims with many line items",
        ));
    }

    signals
}

/// Full score up to 10 items, linear decay between 10 and 20, floor of 0.15
/// beyond 20
fn complexity_score(item_count: usize) -> f64 {
    if item_count <= 10 {
        1.0
    } else if item_count <= 20 {
        1.0 - (item_count - 10) as f64 * 0.085
    } else {
        0.15
    }
}

fn screening_signals(screening: Option<&ScreeningResult>) -> Vec<SignalSnapshot> {
    let Some(screening) = screening else {
        return stage_unavailable("screening");
    };

    let mut signals = Vec::new();

    let evaluated =
        screening.checks_passed + screening.checks_failed + screening.checks_inconclusive;
    if let Some(pass_rate) = ratio(screening.checks_passed, evaluated) {
        signals.push(SignalSnapshot::new(
            "screening.check_pass_rate",
            pass_rate,
            pass_rate,
            SourceStage::Screening,
            "Share of evaluated checks that passed",
        ));
    }

    let hard_fail_score = if screening.hard_fails.is_empty() { 1.0 } else { 0.0 };
    signals.push(SignalSnapshot::new(
        "screening.hard_fail_penalty",
        screening.hard_fails.len() as f64,
        hard_fail_score,
        SourceStage::Screening,
        "Zeroed when any hard-fail check failed",
    ));

    if let Some(llm_rate) = ratio(screening.checks_for_llm.len(), screening.checks.len()) {
        signals.push(SignalSnapshot::new(
            "screening.llm_review_rate",
            llm_rate,
            1.0 - llm_rate,
            SourceStage::Screening,
            "Inverted share of checks flagged for LLM review",
        ));
    }

    signals
}

fn assessment_signals(decision: Option<&DecisionRecord>) -> Vec<SignalSnapshot> {
    let Some(decision) = decision else {
        return stage_unavailable("assessment");
    };
    if decision.tokens_spent == 0 {
        // Deterministic path; no assessment call was made
        tracing::debug!("No assessment call made, skipping assessment signals");
        return Vec::new();
    }

    vec![SignalSnapshot::new(
        "assessment.decision_confidence",
        decision.confidence,
        decision.confidence,
        SourceStage::Assessment,
        "Assessment model's own confidence in its decision",
    )]
}

fn decision_signals(
    decision: Option<&DecisionRecord>,
    coverage: Option<&CoverageAnalysis>,
) -> Vec<SignalSnapshot> {
    let Some(decision) = decision else {
        return stage_unavailable("decision");
    };

    let mut signals = Vec::new();

    let indicator_count = decision.fraud_indicators.len();
    signals.push(SignalSnapshot::new(
        "decision.fraud_indicator_penalty",
        indicator_count as f64,
        1.0 - indicator_count as f64 * 0.2,
        SourceStage::Decision,
        "Penalty scaled by the number of fraud indicators",
    ));

    // Concordance is only meaningful for a denial: it measures how well the
    // coverage result supports that specific verdict
    if decision.decision == Decision::Reject
        && let Some(coverage) = coverage
    {
        let determined = coverage.covered_count() + coverage.not_covered_count();
        if let Some(rate) = ratio(coverage.not_covered_count(), determined) {
            signals.push(SignalSnapshot::new(
                "decision.coverage_concordance",
                rate,
                rate,
                SourceStage::Decision,
                "Share of determinate line items supporting the denial",
            ));
        }
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CoverageItem, CoverageStatus, Decision, FactSet, PayoutBreakdown, QualityGateResult,
    };
    use chrono::Utc;

    fn gate(status: GateStatus) -> QualityGateResult {
        QualityGateResult {
            status,
            missing_critical_facts: vec![],
            conflict_count: 0,
            provenance_coverage: 0.8,
            estimated_tokens: 100,
            reasons: vec![],
        }
    }

    fn reconciliation(status: GateStatus) -> ReconciliationReport {
        ReconciliationReport {
            claim_id: "claim-1".to_string(),
            run_id: "run-1".to_string(),
            facts: FactSet::default(),
            conflicts: vec![],
            gate: gate(status),
            document_runs: Default::default(),
            generated_at: Utc::now(),
        }
    }

    fn coverage_with_items(count: usize) -> CoverageAnalysis {
        CoverageAnalysis {
            claim_id: "claim-1".to_string(),
            items: (0..count)
                .map(|i| CoverageItem {
                    description: format!("item {i}"),
                    amount: 100.0,
                    status: if i % 2 == 0 {
                        CoverageStatus::Covered
                    } else {
                        CoverageStatus::NotCovered
                    },
                    matched_component: None,
                    matched_category: None,
                    match_method: None,
                    match_confidence: Some(0.9),
                })
                .collect(),
            analyzed_at: Utc::now(),
        }
    }

    fn decision_record(decision: Decision, tokens_spent: u64) -> DecisionRecord {
        DecisionRecord {
            claim_id: "claim-1".to_string(),
            decision,
            confidence: 0.85,
            rationale: "rationale".to_string(),
            checks: vec![],
            payout: PayoutBreakdown::zeroed("EUR"),
            fraud_indicators: vec![],
            model: None,
            tokens_spent,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_stages_yield_no_signals() {
        let collector = SignalCollector::new();
        let signals = collector.collect(&StageArtifacts {
            extractions: None,
            reconciliation: None,
            coverage: None,
            screening: None,
            decision: None,
        });

        assert!(signals.is_empty());
    }

    #[test]
    fn test_all_signals_normalized_within_unit_interval() {
        let collector = SignalCollector::new();
        let report = reconciliation(GateStatus::Warn);
        let coverage = coverage_with_items(25);
        let decision = decision_record(Decision::Reject, 500);
        let signals = collector.collect(&StageArtifacts {
            extractions: None,
            reconciliation: Some(&report),
            coverage: Some(&coverage),
            screening: None,
            decision: Some(&decision),
        });

        assert!(!signals.is_empty());
        for signal in &signals {
            assert!(
                (0.0..=1.0).contains(&signal.normalized_value),
                "{} = {}",
                signal.signal_name,
                signal.normalized_value
            );
        }
    }

    #[test]
    fn test_gate_status_score_table() {
        for (status, expected) in [
            (GateStatus::Pass, 1.0),
            (GateStatus::Warn, 0.5),
            (GateStatus::Fail, 0.0),
        ] {
            let report = reconciliation(status);
            let signals = reconciliation_signals(Some(&report));
            let gate_signal = signals
                .iter()
                .find(|s| s.signal_name == "reconciliation.gate_status")
                .unwrap();
            assert_eq!(gate_signal.normalized_value, expected);
        }
    }

    #[test]
    fn test_complexity_decay_curve() {
        assert_eq!(complexity_score(5), 1.0);
        assert_eq!(complexity_score(10), 1.0);
        assert!((complexity_score(15) - 0.575).abs() < 1e-9);
        assert!((complexity_score(20) - 0.15).abs() < 1e-9);
        assert_eq!(complexity_score(40), 0.15);
    }

    #[test]
    fn test_concordance_only_emitted_for_denial() {
        let coverage = coverage_with_items(4);

        let approve = decision_signals(Some(&decision_record(Decision::Approve, 500)), Some(&coverage));
        assert!(!approve.iter().any(|s| s.signal_name == "decision.coverage_concordance"));

        let reject = decision_signals(Some(&decision_record(Decision::Reject, 500)), Some(&coverage));
        let concordance = reject
            .iter()
            .find(|s| s.signal_name == "decision.coverage_concordance")
            .unwrap();
        assert_eq!(concordance.normalized_value, 0.5);
    }

    #[test]
    fn test_assessment_signal_requires_llm_call() {
        assert!(assessment_signals(Some(&decision_record(Decision::Reject, 0))).is_empty());

        let with_call = assessment_signals(Some(&decision_record(Decision::Approve, 400)));
        assert_eq!(with_call.len(), 1);
        assert_eq!(with_call[0].normalized_value, 0.85);
    }

    #[test]
    fn test_degenerate_inputs_are_absorbed() {
        // No fields at all: extraction yields nothing rather than NaN
        let extractions: Vec<DocumentExtraction> = vec![];
        assert!(extraction_signals(Some(&extractions)).is_empty());

        // Coverage without items yields nothing
        let empty = coverage_with_items(0);
        assert!(coverage_signals(Some(&empty)).is_empty());
    }
}
