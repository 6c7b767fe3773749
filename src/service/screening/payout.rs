//! Deterministic payout pre-calculation from the coverage result

use crate::model::fact_names;
use crate::model::{CoverageAnalysis, CoverageStatus, FactSet, PayoutPrecalc, ScreeningConfig};
use crate::service::screening::parse::parse_amount;

/// Covered amount minus the policy deductible, floored at zero. `None`
/// without a coverage result; `calculable = false` when the result carries
/// no line items to price.
pub fn precalculate(
    facts: &FactSet,
    coverage: Option<&CoverageAnalysis>,
    config: &ScreeningConfig,
) -> Option<PayoutPrecalc> {
    let coverage = coverage?;

    let total_claimed: f64 = coverage.items.iter().map(|i| i.amount).sum();
    let covered_amount: f64 = coverage
        .items
        .iter()
        .filter(|i| i.status == CoverageStatus::Covered)
        .map(|i| i.amount)
        .sum();

    let deductible = facts
        .resolve_text(fact_names::DEDUCTIBLE)
        .as_deref()
        .and_then(parse_amount)
        .unwrap_or(0.0);

    let calculable = !coverage.items.is_empty();
    let payout_amount = if calculable {
        (covered_amount - deductible).max(0.0)
    } else {
        0.0
    };

    Some(PayoutPrecalc {
        total_claimed,
        covered_amount,
        deductible,
        payout_amount,
        currency: config.currency.clone(),
        calculable,
    })
}
