//! Per-claim pipeline runner
//!
//! Each claim runs strictly sequentially: reconcile, gate, screen, decide,
//! collect signals, score. Across claims the stages share no mutable state,
//! so claims fan out under a bounded concurrency limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures::{StreamExt, stream};
use thiserror::Error;

use crate::model::{
    CompositeConfidence, Config, CriticalFieldSpec, DecisionRecord, DocumentExtraction,
    FailedClaim, ReconciliationReport, RunSummary, ScreeningResult, SignalSnapshot,
};
use crate::service::assessment::AssessmentError;
use crate::service::decision::DecisionBroker;
use crate::service::quality::QualityGate;
use crate::service::reconciliation::FactReconciler;
use crate::service::report::build_run_summary;
use crate::service::screening::{Screener, ScreeningInput};
use crate::service::signals::{CompositeScorer, SignalCollector, StageArtifacts};
use crate::service::store::{ArtifactStore, StoreError};

/// Hard error that aborts processing for a single claim. Recorded as a
/// failed-claim entry; never propagated to other claims.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("no extraction data for claim {0}")]
    MissingExtractions(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("assessment failed: {0}")]
    Assessment(#[from] AssessmentError),
}

/// Cooperative cancellation, checked between claims only. In-flight claims
/// complete; no new claim begins once set.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything produced for one completed claim run
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub claim_id: String,
    pub report: ReconciliationReport,
    pub screening: ScreeningResult,
    pub decision: DecisionRecord,
    pub signals: Vec<SignalSnapshot>,
    pub composite: CompositeConfidence,
}

pub struct Pipeline {
    store: Arc<ArtifactStore>,
    reconciler: FactReconciler,
    gate: QualityGate,
    screener: Arc<dyn Screener>,
    broker: DecisionBroker,
    collector: SignalCollector,
    scorer: CompositeScorer,
    max_concurrent_claims: usize,
}

impl Pipeline {
    /// The screening and assessment stages are injected; the deterministic
    /// stages are built from configuration.
    pub fn new(
        config: &Config,
        store: Arc<ArtifactStore>,
        screener: Arc<dyn Screener>,
        broker: DecisionBroker,
    ) -> Self {
        Self {
            store,
            reconciler: FactReconciler::new(),
            gate: QualityGate::new(config.gate.clone()),
            screener,
            broker,
            collector: SignalCollector::new(),
            scorer: CompositeScorer::new(config.scoring.clone()),
            max_concurrent_claims: config.concurrency.max_concurrent_claims.max(1),
        }
    }

    /// Run the pipeline over every claim in the workspace and persist the
    /// run summary. Failed claims are recorded in the summary; only a
    /// workspace-level store error aborts the run itself.
    pub async fn run(
        &self,
        run_id: &str,
        force: bool,
        cancel: &CancelFlag,
    ) -> Result<RunSummary, StoreError> {
        let critical_fields = self.store.load_critical_fields()?;
        let claim_ids = self.store.claim_ids()?;
        let claims_total = claim_ids.len();

        tracing::info!(
            run = %run_id,
            claims = claims_total,
            force = force,
            "Pipeline run starting"
        );

        let results: Vec<(String, Option<Result<ClaimOutcome, ClaimError>>)> =
            stream::iter(claim_ids)
                .map(|claim_id| {
                    let critical_fields = &critical_fields;
                    async move {
                        if cancel.is_cancelled() {
                            tracing::info!(claim = %claim_id, "Cancelled before claim started");
                            return (claim_id, None);
                        }
                        let result = self
                            .process_claim(&claim_id, run_id, force, critical_fields)
                            .await;
                        (claim_id, Some(result))
                    }
                })
                .buffer_unordered(self.max_concurrent_claims)
                .collect()
                .await;

        let mut outcomes = Vec::new();
        let mut failed_claims = Vec::new();
        for (claim_id, result) in results {
            match result {
                Some(Ok(outcome)) => outcomes.push(outcome),
                Some(Err(e)) => {
                    tracing::error!(claim = %claim_id, error = %e, "Claim failed");
                    failed_claims.push(FailedClaim {
                        claim_id,
                        error: e.to_string(),
                    });
                }
                None => {}
            }
        }

        let summary = build_run_summary(run_id, &outcomes, claims_total, failed_claims);
        self.store.save_summary(run_id, &summary)?;

        tracing::info!(
            run = %run_id,
            completed = summary.claims_completed,
            failed = summary.claims_failed,
            auto_rejected = summary.auto_rejected,
            "Pipeline run finished"
        );

        Ok(summary)
    }

    /// Process one claim through every stage in order
    async fn process_claim(
        &self,
        claim_id: &str,
        run_id: &str,
        force: bool,
        critical_fields: &CriticalFieldSpec,
    ) -> Result<ClaimOutcome, ClaimError> {
        let extractions = self
            .store
            .load_extractions(claim_id)?
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ClaimError::MissingExtractions(claim_id.to_string()))?;
        let coverage = self.store.load_coverage(claim_id)?;

        let report = self.reconcile(claim_id, run_id, force, &extractions, critical_fields)?;

        // A dedicated line-item document wins over the coverage-derived view
        let line_items = match self.store.load_line_items(claim_id)? {
            Some(items) => items,
            None => coverage
                .as_ref()
                .map(|c| c.line_items())
                .unwrap_or_default(),
        };

        let screening = self.screener.screen(&ScreeningInput {
            claim_id,
            facts: &report.facts,
            line_items: &line_items,
            coverage: coverage.as_ref(),
            conflicts: Some(&report.conflicts),
        });
        self.store.save_screening(claim_id, run_id, &screening)?;

        let decision = self
            .broker
            .decide(claim_id, &report.facts, &screening)
            .await?;
        self.store.save_decision(claim_id, run_id, &decision)?;

        let signals = self.collector.collect(&StageArtifacts {
            extractions: Some(&extractions),
            reconciliation: Some(&report),
            coverage: coverage.as_ref(),
            screening: Some(&screening),
            decision: Some(&decision),
        });
        let composite = self.scorer.score(&signals);

        tracing::info!(
            claim = %claim_id,
            decision = ?decision.decision,
            confidence = composite.score,
            band = ?composite.band,
            "Claim processed"
        );

        Ok(ClaimOutcome {
            claim_id: claim_id.to_string(),
            report,
            screening,
            decision,
            signals,
            composite,
        })
    }

    /// Reconcile the claim's extractions, reusing an existing report for the
    /// same claim and run unless `force` discards it
    fn reconcile(
        &self,
        claim_id: &str,
        run_id: &str,
        force: bool,
        extractions: &[DocumentExtraction],
        critical_fields: &CriticalFieldSpec,
    ) -> Result<ReconciliationReport, ClaimError> {
        if !force && let Some(existing) = self.store.load_reconciliation(claim_id, run_id)? {
            tracing::debug!(claim = %claim_id, run = %run_id, "Reusing existing reconciliation");
            return Ok(existing);
        }

        let reconciled = self.reconciler.reconcile(extractions);
        let observed_types: Vec<&str> = extractions
            .iter()
            .map(|e| e.document_type.as_str())
            .collect();
        let critical = critical_fields.critical_for(observed_types);
        let gate = self
            .gate
            .evaluate(&reconciled.facts, &reconciled.conflicts, &critical);

        if !gate.reasons.is_empty() {
            tracing::warn!(
                claim = %claim_id,
                status = ?gate.status,
                reasons = ?gate.reasons,
                "Quality gate raised concerns"
            );
        }

        let report = ReconciliationReport {
            claim_id: claim_id.to_string(),
            run_id: run_id.to_string(),
            facts: reconciled.facts,
            conflicts: reconciled.conflicts,
            gate,
            document_runs: reconciled.document_runs,
            generated_at: Utc::now(),
        };
        self.store.save_reconciliation(&report)?;
        Ok(report)
    }
}
