//! The nine deterministic screening checks
//!
//! Each check is pure given its inputs and produces exactly one
//! [`ScreeningCheck`]. A check that cannot be evaluated for lack of input is
//! SKIPPED, never failed.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;

use crate::model::fact_names;
use crate::model::{
    CheckVerdict, CoverageAnalysis, FactConflict, FactSet, LineItem, ScreeningCheck,
    ScreeningConfig,
};
use crate::service::screening::parse::{parse_date, parse_odometer};

type Evidence = BTreeMap<String, String>;

fn evidence(pairs: &[(&str, String)]) -> Evidence {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn date_fact(facts: &FactSet, name: &str) -> Option<NaiveDate> {
    facts.resolve_text(name).as_deref().and_then(parse_date)
}

/// Check 1: the claim date must fall within the policy period
pub fn policy_validity(facts: &FactSet) -> ScreeningCheck {
    date_window_check("1", "policy_validity", facts, fact_names::CLAIM_DATE)
}

/// Check 1b: the damage date must fall within the policy period
pub fn damage_date_validity(facts: &FactSet) -> ScreeningCheck {
    date_window_check("1b", "damage_date_validity", facts, fact_names::DAMAGE_DATE)
}

fn date_window_check(
    check_id: &str,
    check_name: &str,
    facts: &FactSet,
    date_name: &str,
) -> ScreeningCheck {
    let start = date_fact(facts, fact_names::POLICY_START_DATE);
    let end = date_fact(facts, fact_names::POLICY_END_DATE);
    let date = date_fact(facts, date_name);

    let (Some(start), Some(end), Some(date)) = (start, end, date) else {
        let missing: Vec<&str> = [
            (start.is_none(), fact_names::POLICY_START_DATE),
            (end.is_none(), fact_names::POLICY_END_DATE),
            (date.is_none(), date_name),
        ]
        .iter()
        .filter(|(absent, _)| *absent)
        .map(|(_, name)| *name)
        .collect();
        return ScreeningCheck::new(
            check_id,
            check_name,
            true,
            CheckVerdict::Skipped,
            format!("date(s) absent or unparseable: {}", missing.join(", ")),
            Evidence::new(),
        );
    };

    let ev = evidence(&[
        ("policy_start", start.to_string()),
        ("policy_end", end.to_string()),
        (date_name, date.to_string()),
    ]);

    if date >= start && date <= end {
        ScreeningCheck::new(
            check_id,
            check_name,
            true,
            CheckVerdict::Pass,
            format!("{date_name} {date} within policy period"),
            ev,
        )
    } else {
        ScreeningCheck::new(
            check_id,
            check_name,
            true,
            CheckVerdict::Fail,
            format!("{date_name} {date} outside policy period {start}..{end}"),
            ev,
        )
    }
}

/// Check 2: conflicting VIN/chassis values across documents
pub fn vin_consistency(
    conflicts: Option<&[FactConflict]>,
    vin_pattern: &Regex,
) -> ScreeningCheck {
    let Some(conflicts) = conflicts else {
        return ScreeningCheck::new(
            "2",
            "vin_consistency",
            false,
            CheckVerdict::Skipped,
            "no reconciliation conflict report available",
            Evidence::new(),
        );
    };

    let vin_conflicts: Vec<&FactConflict> = conflicts
        .iter()
        .filter(|c| vin_pattern.is_match(&c.fact_name))
        .collect();

    if vin_conflicts.is_empty() {
        return ScreeningCheck::new(
            "2",
            "vin_consistency",
            false,
            CheckVerdict::Pass,
            "no conflicting vehicle identifiers across documents",
            Evidence::new(),
        );
    }

    let ev: Evidence = vin_conflicts
        .iter()
        .map(|c| {
            let values: Vec<&str> = c.values.iter().map(|v| v.value.as_str()).collect();
            (c.fact_name.clone(), values.join(" / "))
        })
        .collect();
    let names: Vec<&str> = vin_conflicts.iter().map(|c| c.fact_name.as_str()).collect();

    ScreeningCheck::new(
        "2",
        "vin_consistency",
        false,
        CheckVerdict::Fail,
        format!("documents disagree on vehicle identifier(s): {}", names.join(", ")),
        ev,
    )
}

/// Check 2b: vehicle owner vs policyholder name
pub fn owner_name_match(facts: &FactSet) -> ScreeningCheck {
    let owner = facts.resolve_text(fact_names::OWNER_NAME);
    let holder = facts.resolve_text(fact_names::POLICYHOLDER_NAME);

    let (Some(owner), Some(holder)) = (owner, holder) else {
        return ScreeningCheck::new(
            "2b",
            "owner_name_match",
            false,
            CheckVerdict::Skipped,
            "owner or policyholder name missing",
            Evidence::new(),
        );
    };

    let ev = evidence(&[("owner_name", owner.clone()), ("policyholder_name", holder.clone())]);
    let owner_lower = owner.to_lowercase();
    let holder_lower = holder.to_lowercase();

    if owner_lower.contains(&holder_lower) || holder_lower.contains(&owner_lower) {
        ScreeningCheck::new(
            "2b",
            "owner_name_match",
            false,
            CheckVerdict::Pass,
            "owner matches policyholder",
            ev,
        )
    } else {
        ScreeningCheck::new(
            "2b",
            "owner_name_match",
            false,
            CheckVerdict::Inconclusive,
            format!("owner '{owner}' does not match policyholder '{holder}'"),
            ev,
        )
    }
}

/// Check 3: odometer reading against the policy mileage cap
pub fn mileage_compliance(facts: &FactSet, config: &ScreeningConfig) -> ScreeningCheck {
    let odometer = facts
        .resolve_text(fact_names::MILEAGE)
        .as_deref()
        .and_then(parse_odometer);

    let Some(odometer) = odometer else {
        return ScreeningCheck::new(
            "3",
            "mileage_compliance",
            true,
            CheckVerdict::Skipped,
            "odometer reading missing or unparseable",
            Evidence::new(),
        );
    };

    let policy_cap = facts
        .resolve_text(fact_names::MILEAGE_LIMIT)
        .as_deref()
        .and_then(parse_odometer);
    let (cap, cap_source) = match policy_cap {
        Some(cap) => (cap, "policy"),
        None => (config.mileage_cap_km, "default"),
    };

    let ev = evidence(&[
        ("odometer", odometer.to_string()),
        ("mileage_cap", cap.to_string()),
        ("cap_source", cap_source.to_string()),
    ]);

    if odometer <= cap {
        ScreeningCheck::new(
            "3",
            "mileage_compliance",
            true,
            CheckVerdict::Pass,
            format!("odometer {odometer} within cap {cap}"),
            ev,
        )
    } else {
        ScreeningCheck::new(
            "3",
            "mileage_compliance",
            true,
            CheckVerdict::Fail,
            format!("odometer {odometer} exceeds cap {cap}"),
            ev,
        )
    }
}

/// Check 4a: repair shop against the authorized-partner list
pub fn shop_authorization(facts: &FactSet, config: &ScreeningConfig) -> ScreeningCheck {
    let Some(shop) = facts.resolve_text(fact_names::REPAIR_SHOP) else {
        return ScreeningCheck::new(
            "4a",
            "shop_authorization",
            false,
            CheckVerdict::Skipped,
            "no repair shop name extracted",
            Evidence::new(),
        );
    };

    let shop_lower = shop.to_lowercase();
    let matched = config
        .authorized_partners
        .iter()
        .find(|p| {
            let partner = p.to_lowercase();
            shop_lower.contains(&partner) || partner.contains(&shop_lower)
        });

    match matched {
        Some(partner) => ScreeningCheck::new(
            "4a",
            "shop_authorization",
            false,
            CheckVerdict::Pass,
            format!("shop '{shop}' matches authorized partner '{partner}'"),
            evidence(&[("repair_shop", shop.clone()), ("partner", partner.clone())]),
        ),
        None => ScreeningCheck::new(
            "4a",
            "shop_authorization",
            false,
            CheckVerdict::Inconclusive,
            format!("shop '{shop}' not found in authorized partner list"),
            evidence(&[("repair_shop", shop.clone())]),
        ),
    }
}

/// Check 4b: gap between the newest service entry and the claim document date
pub fn service_history_compliance(facts: &FactSet, config: &ScreeningConfig) -> ScreeningCheck {
    let last_service = date_fact(facts, fact_names::LAST_SERVICE_DATE);
    let document_date = date_fact(facts, fact_names::DOCUMENT_DATE);

    let (Some(last_service), Some(document_date)) = (last_service, document_date) else {
        return ScreeningCheck::new(
            "4b",
            "service_history_compliance",
            false,
            CheckVerdict::Skipped,
            "no parseable service dates",
            Evidence::new(),
        );
    };

    let gap_days = (document_date - last_service).num_days();
    let ev = evidence(&[
        ("last_service_date", last_service.to_string()),
        ("document_date", document_date.to_string()),
        ("gap_days", gap_days.to_string()),
        ("max_gap_days", config.service_gap_days.to_string()),
    ]);

    if gap_days <= config.service_gap_days {
        ScreeningCheck::new(
            "4b",
            "service_history_compliance",
            false,
            CheckVerdict::Pass,
            format!("service gap of {gap_days} days within limit"),
            ev,
        )
    } else {
        ScreeningCheck::new(
            "4b",
            "service_history_compliance",
            false,
            CheckVerdict::Fail,
            format!(
                "service gap of {gap_days} days exceeds limit of {} days",
                config.service_gap_days
            ),
            ev,
        )
    }
}

/// Check 5: at least one line item must be covered
pub fn primary_component_coverage(coverage: Option<&CoverageAnalysis>) -> ScreeningCheck {
    let Some(coverage) = coverage else {
        return ScreeningCheck::new(
            "5",
            "primary_component_coverage",
            true,
            CheckVerdict::Skipped,
            "no coverage analysis result available",
            Evidence::new(),
        );
    };

    let covered = coverage.covered_count();
    let not_covered = coverage.not_covered_count();
    let review_needed = coverage.review_needed_count();
    let ev = evidence(&[
        ("covered", covered.to_string()),
        ("not_covered", not_covered.to_string()),
        ("review_needed", review_needed.to_string()),
    ]);

    if covered > 0 {
        ScreeningCheck::new(
            "5",
            "primary_component_coverage",
            true,
            CheckVerdict::Pass,
            format!("{covered} covered line item(s)"),
            ev,
        )
    } else if not_covered > 0 {
        ScreeningCheck::new(
            "5",
            "primary_component_coverage",
            true,
            CheckVerdict::Fail,
            "no covered line items",
            ev,
        )
    } else {
        ScreeningCheck::new(
            "5",
            "primary_component_coverage",
            true,
            CheckVerdict::Inconclusive,
            "coverage undetermined, review-needed items only",
            ev,
        )
    }
}

/// Check 5b: rental-car and towing items need a separate assistance review
pub fn assistance_items(line_items: &[LineItem], config: &ScreeningConfig) -> ScreeningCheck {
    if line_items.is_empty() {
        return ScreeningCheck::new(
            "5b",
            "assistance_items",
            false,
            CheckVerdict::Skipped,
            "no line items available",
            Evidence::new(),
        );
    }

    let hits: Vec<&LineItem> = line_items
        .iter()
        .filter(|item| {
            let description = item.description.to_lowercase();
            config
                .assistance_keywords
                .iter()
                .any(|kw| description.contains(&kw.to_lowercase()))
        })
        .collect();

    if hits.is_empty() {
        ScreeningCheck::new(
            "5b",
            "assistance_items",
            false,
            CheckVerdict::Pass,
            "no assistance items among line items",
            Evidence::new(),
        )
    } else {
        let descriptions: Vec<&str> = hits.iter().map(|i| i.description.as_str()).collect();
        ScreeningCheck::new(
            "5b",
            "assistance_items",
            false,
            CheckVerdict::Inconclusive,
            format!("{} assistance item(s) detected", hits.len()),
            evidence(&[("items", descriptions.join("; "))]),
        )
    }
}
