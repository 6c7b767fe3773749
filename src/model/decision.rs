//! Canonical decision record produced for every claim run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::screening::{CheckVerdict, PayoutPrecalc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
    Refer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudIndicator {
    pub indicator_type: String,
    pub description: String,
    pub severity: FraudSeverity,
}

/// Canonical check schema shared by the deterministic and LLM decision paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionCheck {
    pub check_id: String,
    pub name: String,
    pub result: CheckVerdict,
    pub details: String,
}

/// Canonical payout schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutBreakdown {
    pub total_claimed: f64,
    pub covered_amount: f64,
    pub deductible: f64,
    pub payout_amount: f64,
    pub currency: String,
    pub calculable: bool,
}

impl PayoutBreakdown {
    pub fn zeroed(currency: &str) -> Self {
        Self {
            total_claimed: 0.0,
            covered_amount: 0.0,
            deductible: 0.0,
            payout_amount: 0.0,
            currency: currency.to_string(),
            calculable: false,
        }
    }

    pub fn from_precalc(precalc: &PayoutPrecalc) -> Self {
        Self {
            total_claimed: precalc.total_claimed,
            covered_amount: precalc.covered_amount,
            deductible: precalc.deductible,
            payout_amount: precalc.payout_amount,
            currency: precalc.currency.clone(),
            calculable: precalc.calculable,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub claim_id: String,
    pub decision: Decision,
    pub confidence: f64,
    pub rationale: String,
    pub checks: Vec<DecisionCheck>,
    pub payout: PayoutBreakdown,
    pub fraud_indicators: Vec<FraudIndicator>,
    /// Model that produced the decision; `None` on the deterministic path
    pub model: Option<String>,
    /// Estimated tokens spent on external calls; 0 when no call was made
    pub tokens_spent: u64,
    pub generated_at: DateTime<Utc>,
}
