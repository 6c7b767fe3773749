//! Converters from extracted LLM models to the canonical decision record

use chrono::Utc;

use crate::model::assessment::{
    ExtractedCheck, ExtractedCheckResult, ExtractedDecision, ExtractedFraudIndicator,
    ExtractedPayout, ExtractedSeverity, ExtractedVerdict,
};
use crate::model::{
    CheckVerdict, Decision, DecisionCheck, DecisionRecord, FraudIndicator, FraudSeverity,
    PayoutBreakdown,
};

/// Convert the extracted decision into the canonical record
pub fn convert_decision(
    claim_id: &str,
    extracted: ExtractedDecision,
    model: &str,
    tokens_spent: u64,
) -> DecisionRecord {
    let decision = match extracted.decision {
        ExtractedVerdict::Approve => Decision::Approve,
        ExtractedVerdict::Reject => Decision::Reject,
        ExtractedVerdict::Refer => Decision::Refer,
    };

    let checks = extracted.checks.into_iter().map(convert_check).collect();
    let fraud_indicators = extracted
        .fraud_indicators
        .into_iter()
        .map(convert_fraud_indicator)
        .collect();
    let payout = match extracted.payout {
        Some(p) => convert_payout(p),
        None => PayoutBreakdown::zeroed("EUR"),
    };

    DecisionRecord {
        claim_id: claim_id.to_string(),
        decision,
        confidence: extracted.confidence.clamp(0.0, 1.0),
        rationale: extracted.rationale,
        checks,
        payout,
        fraud_indicators,
        model: Some(model.to_string()),
        tokens_spent,
        generated_at: Utc::now(),
    }
}

fn convert_check(extracted: ExtractedCheck) -> DecisionCheck {
    let result = match extracted.result {
        ExtractedCheckResult::Pass => CheckVerdict::Pass,
        ExtractedCheckResult::Fail => CheckVerdict::Fail,
        ExtractedCheckResult::Inconclusive => CheckVerdict::Inconclusive,
        ExtractedCheckResult::Skipped => CheckVerdict::Skipped,
    };
    DecisionCheck {
        check_id: extracted.check_id,
        name: extracted.name,
        result,
        details: extracted.details,
    }
}

fn convert_fraud_indicator(extracted: ExtractedFraudIndicator) -> FraudIndicator {
    let severity = match extracted.severity {
        ExtractedSeverity::Low => FraudSeverity::Low,
        ExtractedSeverity::Medium => FraudSeverity::Medium,
        ExtractedSeverity::High => FraudSeverity::High,
    };
    FraudIndicator {
        indicator_type: extracted.indicator_type,
        description: extracted.description,
        severity,
    }
}

fn convert_payout(extracted: ExtractedPayout) -> PayoutBreakdown {
    PayoutBreakdown {
        total_claimed: extracted.total_claimed,
        covered_amount: extracted.covered_amount,
        deductible: extracted.deductible,
        payout_amount: extracted.payout_amount,
        currency: extracted.currency,
        calculable: true,
    }
}
