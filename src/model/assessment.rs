//! LLM-extractable models for the assessment stage

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured decision returned by the assessment model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedDecision {
    pub decision: ExtractedVerdict,
    /// Model's own confidence in the decision, 0..1
    pub confidence: f64,
    pub rationale: String,
    pub checks: Vec<ExtractedCheck>,
    pub payout: Option<ExtractedPayout>,
    pub fraud_indicators: Vec<ExtractedFraudIndicator>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedVerdict {
    Approve,
    Reject,
    Refer,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedCheck {
    pub check_id: String,
    pub name: String,
    pub result: ExtractedCheckResult,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedCheckResult {
    Pass,
    Fail,
    Inconclusive,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedPayout {
    pub total_claimed: f64,
    pub covered_amount: f64,
    pub deductible: f64,
    pub payout_amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedFraudIndicator {
    pub indicator_type: String,
    pub description: String,
    pub severity: ExtractedSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedSeverity {
    Low,
    Medium,
    High,
}
