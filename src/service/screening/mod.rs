//! Deterministic screening of reconciled claims
//!
//! Runs the fixed sequence of nine business checks and derives the
//! auto-reject verdict. Every check runs even when an earlier one already
//! forces rejection, so evidence is always complete.

mod checks;
mod parse;
mod payout;

use regex::Regex;

use crate::model::{
    CoverageAnalysis, FactConflict, FactSet, LineItem, ScreeningConfig, ScreeningResult,
};

const VIN_FACT_PATTERN: &str = r"(?i)vin|chassis|fahrgestell";

/// Inputs for one screening run, all borrowed from the claim's artifacts
pub struct ScreeningInput<'a> {
    pub claim_id: &'a str,
    pub facts: &'a FactSet,
    pub line_items: &'a [LineItem],
    pub coverage: Option<&'a CoverageAnalysis>,
    pub conflicts: Option<&'a [FactConflict]>,
}

/// Screening stage interface; tests substitute their own implementation
pub trait Screener: Send + Sync {
    fn screen(&self, input: &ScreeningInput<'_>) -> ScreeningResult;
}

pub struct ScreeningEngine {
    config: ScreeningConfig,
    vin_pattern: Regex,
}

impl ScreeningEngine {
    pub fn new(config: ScreeningConfig) -> Self {
        Self {
            config,
            vin_pattern: Regex::new(VIN_FACT_PATTERN).unwrap(),
        }
    }
}

impl Screener for ScreeningEngine {
    fn screen(&self, input: &ScreeningInput<'_>) -> ScreeningResult {
        let checks = vec![
            checks::policy_validity(input.facts),
            checks::damage_date_validity(input.facts),
            checks::vin_consistency(input.conflicts, &self.vin_pattern),
            checks::owner_name_match(input.facts),
            checks::mileage_compliance(input.facts, &self.config),
            checks::shop_authorization(input.facts, &self.config),
            checks::service_history_compliance(input.facts, &self.config),
            checks::primary_component_coverage(input.coverage),
            checks::assistance_items(input.line_items, &self.config),
        ];

        let payout = payout::precalculate(input.facts, input.coverage, &self.config);
        let result = ScreeningResult::from_checks(input.claim_id.to_string(), checks, payout);

        tracing::info!(
            claim = %input.claim_id,
            passed = result.checks_passed,
            failed = result.checks_failed,
            inconclusive = result.checks_inconclusive,
            skipped = result.skipped_count(),
            auto_reject = result.auto_reject,
            "Screening complete"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AggregatedFact, CheckVerdict, ConflictValue, CoverageItem, CoverageStatus, FactProvenance,
        SelectionReason,
    };
    use chrono::Utc;

    fn fact(name: &str, value: &str) -> AggregatedFact {
        AggregatedFact {
            name: name.to_string(),
            value: serde_json::Value::String(value.to_string()),
            normalized_value: None,
            confidence: 0.9,
            selected_from: FactProvenance {
                document_id: "doc-1".to_string(),
                document_type: "policy".to_string(),
                run_id: "run-1".to_string(),
                quote: Some(value.to_string()),
            },
        }
    }

    fn base_facts() -> FactSet {
        let mut facts = FactSet::default();
        facts.insert(fact("policy.start_date", "2025-01-01"));
        facts.insert(fact("policy.end_date", "2026-12-31"));
        facts.insert(fact("claim_date", "2026-06-15"));
        facts.insert(fact("damage_date", "2026-06-10"));
        facts.insert(fact("vehicle.mileage", "74359"));
        facts.insert(fact("policy.mileage_limit", "150000"));
        facts.insert(fact("owner_name", "Max Mustermann"));
        facts.insert(fact("policyholder_name", "Max Mustermann"));
        facts
    }

    fn covered_coverage() -> CoverageAnalysis {
        CoverageAnalysis {
            claim_id: "claim-1".to_string(),
            items: vec![CoverageItem {
                description: "Turbocharger replacement".to_string(),
                amount: 1800.0,
                status: CoverageStatus::Covered,
                matched_component: Some("turbocharger".to_string()),
                matched_category: None,
                match_method: None,
                match_confidence: Some(0.95),
            }],
            analyzed_at: Utc::now(),
        }
    }

    fn engine() -> ScreeningEngine {
        ScreeningEngine::new(ScreeningConfig::default())
    }

    fn find<'a>(result: &'a ScreeningResult, id: &str) -> &'a crate::model::ScreeningCheck {
        result.checks.iter().find(|c| c.check_id == id).unwrap()
    }

    #[test]
    fn test_verdict_counts_always_cover_all_nine_checks() {
        let facts = base_facts();
        let coverage = covered_coverage();
        let line_items = coverage.line_items();
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &line_items,
            coverage: Some(&coverage),
            conflicts: Some(&[]),
        });

        assert_eq!(result.checks.len(), 9);
        assert_eq!(
            result.checks_passed
                + result.checks_failed
                + result.checks_inconclusive
                + result.skipped_count(),
            9
        );
    }

    #[test]
    fn test_valid_claim_passes_all_hard_fail_checks() {
        let facts = base_facts();
        let coverage = covered_coverage();
        let line_items = coverage.line_items();
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &line_items,
            coverage: Some(&coverage),
            conflicts: Some(&[]),
        });

        for check in result.checks.iter().filter(|c| c.is_hard_fail) {
            assert_eq!(check.verdict, CheckVerdict::Pass, "check {}", check.check_id);
        }
        assert!(!result.auto_reject);
        assert!(result.hard_fails.is_empty());
    }

    #[test]
    fn test_expired_policy_auto_rejects_via_check_1() {
        let mut facts = base_facts();
        facts.insert(fact("policy.end_date", "2025-12-31"));
        // No damage date reported; check 1b is skipped, not failed
        facts.insert(fact("damage_date", ""));
        let coverage = covered_coverage();
        let line_items = coverage.line_items();
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &line_items,
            coverage: Some(&coverage),
            conflicts: Some(&[]),
        });

        assert_eq!(find(&result, "1").verdict, CheckVerdict::Fail);
        assert_eq!(find(&result, "1b").verdict, CheckVerdict::Skipped);
        assert!(result.auto_reject);
        assert_eq!(result.hard_fails, vec!["1"]);
    }

    #[test]
    fn test_missing_policy_dates_skip_date_checks() {
        let mut facts = base_facts();
        facts.insert(fact("policy.start_date", "not a date"));
        let coverage = covered_coverage();
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &[],
            coverage: Some(&coverage),
            conflicts: Some(&[]),
        });

        assert_eq!(find(&result, "1").verdict, CheckVerdict::Skipped);
        assert_eq!(find(&result, "1b").verdict, CheckVerdict::Skipped);
        assert!(!result.auto_reject);
    }

    #[test]
    fn test_vin_conflict_flags_llm_without_auto_reject() {
        let facts = base_facts();
        let coverage = covered_coverage();
        let line_items = coverage.line_items();
        let conflicts = vec![FactConflict {
            fact_name: "vehicle.vin".to_string(),
            values: vec![
                ConflictValue {
                    value: "WVWZZZAUZHW146216".to_string(),
                    sources: vec![],
                },
                ConflictValue {
                    value: "WAUZZZF24KN016070".to_string(),
                    sources: vec![],
                },
            ],
            selected_value: "WVWZZZAUZHW146216".to_string(),
            selected_confidence: 0.95,
            selection_reason: SelectionReason::HighestConfidence,
        }];
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &line_items,
            coverage: Some(&coverage),
            conflicts: Some(&conflicts),
        });

        let check = find(&result, "2");
        assert_eq!(check.verdict, CheckVerdict::Fail);
        assert!(!check.is_hard_fail);
        assert!(check.requires_llm);
        assert!(result.checks_for_llm.contains(&"2".to_string()));
        assert!(!result.auto_reject);
    }

    #[test]
    fn test_no_coverage_result_skips_check_5() {
        let facts = base_facts();
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &[],
            coverage: None,
            conflicts: Some(&[]),
        });

        assert_eq!(find(&result, "5").verdict, CheckVerdict::Skipped);
        assert!(result.payout.is_none());
        assert!(!result.auto_reject);
    }

    #[test]
    fn test_nothing_covered_fails_check_5() {
        let facts = base_facts();
        let coverage = CoverageAnalysis {
            claim_id: "claim-1".to_string(),
            items: vec![CoverageItem {
                description: "Cosmetic repair".to_string(),
                amount: 400.0,
                status: CoverageStatus::NotCovered,
                matched_component: None,
                matched_category: None,
                match_method: None,
                match_confidence: None,
            }],
            analyzed_at: Utc::now(),
        };
        let line_items = coverage.line_items();
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &line_items,
            coverage: Some(&coverage),
            conflicts: Some(&[]),
        });

        assert_eq!(find(&result, "5").verdict, CheckVerdict::Fail);
        assert!(result.auto_reject);
        assert!(result.hard_fails.contains(&"5".to_string()));
    }

    #[test]
    fn test_mileage_over_cap_fails_hard() {
        let mut facts = base_facts();
        facts.insert(fact("vehicle.mileage", "161.000 km"));
        let coverage = covered_coverage();
        let line_items = coverage.line_items();
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &line_items,
            coverage: Some(&coverage),
            conflicts: Some(&[]),
        });

        let check = find(&result, "3");
        assert_eq!(check.verdict, CheckVerdict::Fail);
        assert!(check.is_hard_fail);
        assert!(result.auto_reject);
    }

    #[test]
    fn test_owner_substring_match_passes() {
        let mut facts = base_facts();
        facts.insert(fact("owner_name", "Mustermann"));
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &[],
            coverage: None,
            conflicts: Some(&[]),
        });

        assert_eq!(find(&result, "2b").verdict, CheckVerdict::Pass);
    }

    #[test]
    fn test_owner_mismatch_is_inconclusive() {
        let mut facts = base_facts();
        facts.insert(fact("owner_name", "Erika Musterfrau"));
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &[],
            coverage: None,
            conflicts: Some(&[]),
        });

        let check = find(&result, "2b");
        assert_eq!(check.verdict, CheckVerdict::Inconclusive);
        assert!(check.requires_llm);
    }

    #[test]
    fn test_stale_service_history_fails_soft() {
        let mut facts = base_facts();
        facts.insert(fact("service_history.last_service_date", "2022-01-10"));
        facts.insert(fact("service_history.document_date", "2026-06-15"));
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &[],
            coverage: None,
            conflicts: Some(&[]),
        });

        let check = find(&result, "4b");
        assert_eq!(check.verdict, CheckVerdict::Fail);
        assert!(!check.is_hard_fail);
        assert!(!result.auto_reject);
    }

    #[test]
    fn test_rental_line_item_is_inconclusive() {
        let facts = base_facts();
        let line_items = vec![
            LineItem {
                description: "Turbocharger replacement".to_string(),
                amount: 1800.0,
            },
            LineItem {
                description: "Mietwagen 3 Tage".to_string(),
                amount: 180.0,
            },
        ];
        let result = engine().screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &line_items,
            coverage: None,
            conflicts: Some(&[]),
        });

        assert_eq!(find(&result, "5b").verdict, CheckVerdict::Inconclusive);
    }

    #[test]
    fn test_authorized_shop_passes() {
        let mut config = ScreeningConfig::default();
        config.authorized_partners = vec!["Autohaus Schmidt".to_string()];
        let mut facts = base_facts();
        facts.insert(fact("invoice.repair_shop", "Autohaus Schmidt GmbH"));

        let engine = ScreeningEngine::new(config);
        let result = engine.screen(&ScreeningInput {
            claim_id: "claim-1",
            facts: &facts,
            line_items: &[],
            coverage: None,
            conflicts: Some(&[]),
        });

        assert_eq!(find(&result, "4a").verdict, CheckVerdict::Pass);
    }
}
