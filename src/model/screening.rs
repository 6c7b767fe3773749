//! Screening checks and the per-claim screening result

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckVerdict {
    Pass,
    Fail,
    Inconclusive,
    Skipped,
}

/// One deterministic business check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningCheck {
    /// Stable identifier ("1", "1b", "2", "2b", "3", "4a", "4b", "5", "5b")
    pub check_id: String,
    pub check_name: String,
    pub verdict: CheckVerdict,
    pub reason: String,
    /// Concrete values the check compared
    pub evidence: BTreeMap<String, String>,
    /// Fixed per check type; a FAIL on a hard-fail check auto-rejects the claim
    pub is_hard_fail: bool,
    /// Set when a non-hard-fail check did not cleanly pass
    pub requires_llm: bool,
}

impl ScreeningCheck {
    pub fn new(
        check_id: &str,
        check_name: &str,
        is_hard_fail: bool,
        verdict: CheckVerdict,
        reason: impl Into<String>,
        evidence: BTreeMap<String, String>,
    ) -> Self {
        let requires_llm =
            !is_hard_fail && matches!(verdict, CheckVerdict::Fail | CheckVerdict::Inconclusive);
        Self {
            check_id: check_id.to_string(),
            check_name: check_name.to_string(),
            verdict,
            reason: reason.into(),
            evidence,
            is_hard_fail,
            requires_llm,
        }
    }
}

/// Deterministic payout estimate derived from the coverage result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutPrecalc {
    pub total_claimed: f64,
    pub covered_amount: f64,
    pub deductible: f64,
    pub payout_amount: f64,
    pub currency: String,
    pub calculable: bool,
}

/// Outcome of one screening run: the nine checks plus derived verdicts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub claim_id: String,
    pub checks: Vec<ScreeningCheck>,
    pub checks_passed: usize,
    pub checks_failed: usize,
    pub checks_inconclusive: usize,
    /// Ids of checks flagged for LLM review
    pub checks_for_llm: Vec<String>,
    pub auto_reject: bool,
    pub auto_reject_reason: Option<String>,
    /// Ids of hard-fail checks that failed
    pub hard_fails: Vec<String>,
    pub payout: Option<PayoutPrecalc>,
}

impl ScreeningResult {
    /// Derive counts and the auto-reject verdict. Runs after every check so
    /// that evidence from all of them is recorded even when an early check
    /// already forces rejection.
    pub fn from_checks(
        claim_id: String,
        checks: Vec<ScreeningCheck>,
        payout: Option<PayoutPrecalc>,
    ) -> Self {
        let mut checks_passed = 0;
        let mut checks_failed = 0;
        let mut checks_inconclusive = 0;
        let mut checks_for_llm = Vec::new();
        let mut hard_fails = Vec::new();

        for check in &checks {
            match check.verdict {
                CheckVerdict::Pass => checks_passed += 1,
                CheckVerdict::Fail => checks_failed += 1,
                CheckVerdict::Inconclusive => checks_inconclusive += 1,
                CheckVerdict::Skipped => {}
            }
            if check.is_hard_fail && check.verdict == CheckVerdict::Fail {
                hard_fails.push(check.check_id.clone());
            }
            if check.requires_llm {
                checks_for_llm.push(check.check_id.clone());
            }
        }

        let auto_reject = !hard_fails.is_empty();
        let auto_reject_reason = auto_reject
            .then(|| format!("hard-fail check(s) failed: {}", hard_fails.join(", ")));

        Self {
            claim_id,
            checks,
            checks_passed,
            checks_failed,
            checks_inconclusive,
            checks_for_llm,
            auto_reject,
            auto_reject_reason,
            hard_fails,
            payout,
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.verdict == CheckVerdict::Skipped)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: &str, hard: bool, verdict: CheckVerdict) -> ScreeningCheck {
        ScreeningCheck::new(id, "check", hard, verdict, "reason", BTreeMap::new())
    }

    #[test]
    fn test_auto_reject_iff_hard_fail_failed() {
        let result = ScreeningResult::from_checks(
            "claim-1".to_string(),
            vec![
                check("1", true, CheckVerdict::Pass),
                check("2", false, CheckVerdict::Fail),
                check("3", true, CheckVerdict::Fail),
            ],
            None,
        );

        assert!(result.auto_reject);
        assert_eq!(result.hard_fails, vec!["3"]);
        assert!(result.auto_reject_reason.unwrap().contains("3"));
    }

    #[test]
    fn test_no_hard_fail_means_no_auto_reject() {
        let result = ScreeningResult::from_checks(
            "claim-1".to_string(),
            vec![
                check("1", true, CheckVerdict::Pass),
                check("2", false, CheckVerdict::Fail),
                check("2b", false, CheckVerdict::Inconclusive),
            ],
            None,
        );

        assert!(!result.auto_reject);
        assert!(result.hard_fails.is_empty());
        assert!(result.auto_reject_reason.is_none());
    }

    #[test]
    fn test_skipped_excluded_from_counts() {
        let result = ScreeningResult::from_checks(
            "claim-1".to_string(),
            vec![
                check("1", true, CheckVerdict::Pass),
                check("1b", true, CheckVerdict::Skipped),
                check("2b", false, CheckVerdict::Inconclusive),
            ],
            None,
        );

        assert_eq!(result.checks_passed, 1);
        assert_eq!(result.checks_failed, 0);
        assert_eq!(result.checks_inconclusive, 1);
        assert_eq!(result.skipped_count(), 1);
    }

    #[test]
    fn test_requires_llm_only_for_soft_non_pass() {
        assert!(check("2", false, CheckVerdict::Fail).requires_llm);
        assert!(check("2b", false, CheckVerdict::Inconclusive).requires_llm);
        assert!(!check("2b", false, CheckVerdict::Pass).requires_llm);
        assert!(!check("2b", false, CheckVerdict::Skipped).requires_llm);
        assert!(!check("1", true, CheckVerdict::Fail).requires_llm);
    }
}
