//! Validation of LLM-extracted decisions
//!
//! Ensures the structured response is usable before it becomes the claim's
//! decision record.

use crate::model::assessment::ExtractedDecision;

/// Meta-commentary phrases that should NOT appear in rationales
const META_PHRASES: &[&str] = &[
    "as an ai",
    "this suggests",
    "the screening result indicates",
    "based on the provided json",
    "i cannot",
];

/// Result of decision validation
#[derive(Debug)]
pub struct DecisionValidationResult {
    /// Whether the decision passed validation
    pub is_valid: bool,
    /// Critical errors that indicate invalid output
    pub errors: Vec<String>,
    /// Warnings that indicate potential quality issues
    pub warnings: Vec<String>,
}

impl DecisionValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Validate an extracted decision
///
/// Checks:
/// 1. Confidence lies within [0, 1]
/// 2. Payout amounts are non-negative
/// 3. Rationale is substantive (>= 20 characters, warning otherwise)
/// 4. Rationale is free of meta-commentary (warning)
/// 5. At least one check verdict was echoed (warning)
pub fn validate_extracted_decision(decision: &ExtractedDecision) -> DecisionValidationResult {
    let mut result = DecisionValidationResult::valid();

    if !(0.0..=1.0).contains(&decision.confidence) || !decision.confidence.is_finite() {
        result.add_error(format!(
            "confidence {} outside [0, 1]",
            decision.confidence
        ));
    }

    if let Some(ref payout) = decision.payout {
        let amounts = [
            ("total_claimed", payout.total_claimed),
            ("covered_amount", payout.covered_amount),
            ("deductible", payout.deductible),
            ("payout_amount", payout.payout_amount),
        ];
        for (name, amount) in amounts {
            if amount < 0.0 || !amount.is_finite() {
                result.add_error(format!("payout field {name} is negative or non-finite"));
            }
        }
    }

    if decision.rationale.trim().len() < 20 {
        result.add_warning(format!(
            "rationale is too short (< 20 chars): '{}'",
            decision.rationale
        ));
    }

    let rationale_lower = decision.rationale.to_lowercase();
    for phrase in META_PHRASES {
        if rationale_lower.contains(phrase) {
            result.add_warning(format!("rationale contains meta-commentary '{phrase}'"));
            break;
        }
    }

    if decision.checks.is_empty() {
        result.add_warning("no check verdicts echoed in the decision".to_string());
    }

    result
}
