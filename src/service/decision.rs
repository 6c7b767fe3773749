//! Decision broker: the branch point between deterministic rejection and the
//! LLM-backed assessment call

use std::sync::Arc;

use chrono::Utc;

use crate::model::{
    CheckVerdict, Decision, DecisionCheck, DecisionRecord, FactSet, FraudIndicator, FraudSeverity,
    PayoutBreakdown, ScreeningResult,
};
use crate::service::assessment::{AssessmentCaller, AssessmentContext, AssessmentError};

pub struct DecisionBroker {
    assessment: Arc<dyn AssessmentCaller>,
}

impl DecisionBroker {
    pub fn new(assessment: Arc<dyn AssessmentCaller>) -> Self {
        Self { assessment }
    }

    /// Auto-reject synthesizes a deterministic record with zero external
    /// calls; anything else goes to the assessment stage.
    pub async fn decide(
        &self,
        claim_id: &str,
        facts: &FactSet,
        screening: &ScreeningResult,
    ) -> Result<DecisionRecord, AssessmentError> {
        if screening.auto_reject {
            tracing::info!(
                claim = %claim_id,
                hard_fails = ?screening.hard_fails,
                "Auto-rejecting claim, no assessment call"
            );
            return Ok(synthesize_rejection(claim_id, screening));
        }

        tracing::debug!(
            claim = %claim_id,
            checks_for_llm = ?screening.checks_for_llm,
            "Forwarding claim to assessment stage"
        );
        self.assessment
            .assess(&AssessmentContext {
                claim_id,
                facts,
                screening,
            })
            .await
    }
}

/// Build the deterministic rejection record from the screening result alone
fn synthesize_rejection(claim_id: &str, screening: &ScreeningResult) -> DecisionRecord {
    let failing: Vec<&crate::model::ScreeningCheck> = screening
        .checks
        .iter()
        .filter(|c| c.is_hard_fail && c.verdict == CheckVerdict::Fail)
        .collect();

    let reasons: Vec<String> = failing
        .iter()
        .map(|c| format!("[{}] {}", c.check_id, c.reason))
        .collect();
    let rationale = format!(
        "Claim rejected by deterministic screening. Hard-fail check(s) {} failed: {}",
        screening.hard_fails.join(", "),
        reasons.join("; ")
    );

    // One indicator per hard-fail check
    let fraud_indicators: Vec<FraudIndicator> = failing
        .iter()
        .map(|c| FraudIndicator {
            indicator_type: format!("screening_check_{}", c.check_id),
            description: c.reason.clone(),
            severity: FraudSeverity::High,
        })
        .collect();

    let payout_calculable = screening
        .payout
        .as_ref()
        .is_some_and(|p| p.calculable);
    let payout = match &screening.payout {
        Some(p) if p.calculable => PayoutBreakdown::from_precalc(p),
        _ => PayoutBreakdown::zeroed("EUR"),
    };

    // The nine checks in the canonical schema plus the two synthesized ones
    let mut checks: Vec<DecisionCheck> = screening
        .checks
        .iter()
        .map(|c| DecisionCheck {
            check_id: c.check_id.clone(),
            name: c.check_name.clone(),
            result: c.verdict,
            details: c.reason.clone(),
        })
        .collect();
    checks.push(DecisionCheck {
        check_id: "payout".to_string(),
        name: "payout_calculable".to_string(),
        result: if payout_calculable {
            CheckVerdict::Pass
        } else {
            CheckVerdict::Fail
        },
        details: if payout_calculable {
            "payout pre-calculation available".to_string()
        } else {
            "payout could not be pre-calculated".to_string()
        },
    });
    checks.push(DecisionCheck {
        check_id: "auto_reject".to_string(),
        name: "auto_reject_triggered".to_string(),
        result: CheckVerdict::Fail,
        details: screening
            .auto_reject_reason
            .clone()
            .unwrap_or_else(|| "auto-reject triggered".to_string()),
    });

    DecisionRecord {
        claim_id: claim_id.to_string(),
        decision: Decision::Reject,
        confidence: 1.0,
        rationale,
        checks,
        payout,
        fraud_indicators,
        model: None,
        tokens_spent: 0,
        generated_at: Utc::now(),
    }
}
