//! LLM-backed claim assessment
//!
//! Turns the reconciled facts plus the screening snapshot into a structured
//! decision. The production caller runs under a bounded-concurrency limiter
//! and retries rate-limit/timeout failures with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::providers::openai;
use tokio::sync::Semaphore;

use crate::model::assessment::ExtractedDecision;
use crate::model::{
    ConcurrencyConfig, Decision, DecisionCheck, DecisionRecord, FactSet, PayoutBreakdown,
    ScreeningResult,
};

pub mod converters;
pub mod error;
pub mod prompts;
pub mod validation;

pub use error::AssessmentError;

/// Environment variable for the assessment model (defaults to gpt-4o-mini if not set)
const ENV_ASSESSMENT_MODEL: &str = "ASSESSMENT_MODEL";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Default model for claim assessment
const DEFAULT_MODEL: &str = openai::GPT_4O_MINI;

/// Context handed to the assessment stage for one claim
pub struct AssessmentContext<'a> {
    pub claim_id: &'a str,
    pub facts: &'a FactSet,
    pub screening: &'a ScreeningResult,
}

/// Assessment stage interface; tests substitute an in-memory implementation
#[async_trait]
pub trait AssessmentCaller: Send + Sync {
    async fn assess(&self, context: &AssessmentContext<'_>)
    -> Result<DecisionRecord, AssessmentError>;
}

/// Production assessment caller backed by the OpenAI API
pub struct LlmAssessmentCaller {
    client: openai::Client,
    model: String,
    limiter: Arc<Semaphore>,
    max_retries: usize,
    backoff_ms: u64,
}

impl LlmAssessmentCaller {
    /// Create a new assessment caller with the provided API key.
    /// Optionally uses the ASSESSMENT_MODEL env var.
    pub fn new(api_key: &str, concurrency: &ConcurrencyConfig) -> Result<Self, AssessmentError> {
        let client = openai::Client::new(api_key);
        let model =
            std::env::var(ENV_ASSESSMENT_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        tracing::info!(
            model = %model,
            max_concurrent = concurrency.max_concurrent_assessments,
            "Assessment caller initialized"
        );

        Ok(Self {
            client,
            model,
            limiter: Arc::new(Semaphore::new(concurrency.max_concurrent_assessments.max(1))),
            max_retries: concurrency.assessment_max_retries,
            backoff_ms: concurrency.assessment_backoff_ms,
        })
    }

    /// Build from OPENAI_API_KEY; `None` when the key is absent or invalid
    pub fn from_env(concurrency: &ConcurrencyConfig) -> Option<Self> {
        let api_key = std::env::var(ENV_OPENAI_API_KEY).ok()?;
        match Self::new(&api_key, concurrency) {
            Ok(caller) => Some(caller),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to initialize assessment caller");
                None
            }
        }
    }

    async fn call_once(&self, prompt: &str) -> Result<ExtractedDecision, AssessmentError> {
        // temperature=0.0 and a fixed seed for reproducible decisions
        let extractor = self
            .client
            .extractor::<ExtractedDecision>(&self.model)
            .preamble(prompts::ASSESSMENT_SYSTEM_PROMPT)
            .additional_params(serde_json::json!({
                "temperature": 0.0,
                "seed": 42
            }))
            .build();

        extractor.extract(prompt).await.map_err(AssessmentError::classify)
    }
}

#[async_trait]
impl AssessmentCaller for LlmAssessmentCaller {
    async fn assess(
        &self,
        context: &AssessmentContext<'_>,
    ) -> Result<DecisionRecord, AssessmentError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| AssessmentError::Configuration("assessment limiter closed".to_string()))?;

        let prompt = prompts::build_assessment_prompt(context.claim_id, context.facts, context.screening);
        let prompt_length = prompt.len();
        let start_time = std::time::Instant::now();

        tracing::debug!(
            claim = %context.claim_id,
            model = %self.model,
            prompt_length = prompt_length,
            "Initiating assessment API call"
        );

        let mut attempt = 0;
        let extracted = loop {
            attempt += 1;
            match self.call_once(&prompt).await {
                Ok(result) => break result,
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    let delay = self.backoff_ms.saturating_mul(1 << (attempt - 1));
                    tracing::warn!(
                        claim = %context.claim_id,
                        attempt = attempt,
                        delay_ms = delay,
                        error = %e,
                        "Assessment call failed, backing off before retry"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    tracing::error!(
                        claim = %context.claim_id,
                        model = %self.model,
                        elapsed_ms = start_time.elapsed().as_millis(),
                        error = %e,
                        "Assessment call failed"
                    );
                    return Err(e);
                }
            }
        };

        tracing::info!(
            claim = %context.claim_id,
            model = %self.model,
            elapsed_ms = start_time.elapsed().as_millis(),
            prompt_length = prompt_length,
            "Assessment call completed"
        );

        let validation_result = validation::validate_extracted_decision(&extracted);
        if !validation_result.is_valid {
            tracing::error!(
                claim = %context.claim_id,
                errors = ?validation_result.errors,
                "Assessment response failed validation"
            );
            return Err(AssessmentError::InvalidResponse(
                validation_result.errors.join("; "),
            ));
        }
        if !validation_result.warnings.is_empty() {
            tracing::warn!(
                claim = %context.claim_id,
                warnings = ?validation_result.warnings,
                "Assessment response produced quality warnings"
            );
        }

        Ok(converters::convert_decision(
            context.claim_id,
            extracted,
            &self.model,
            prompts::estimate_tokens(&prompt),
        ))
    }
}

/// Deterministic stand-in used when no LLM credentials are configured:
/// every claim that reaches the assessment stage is referred to a human
/// reviewer, echoing the screening evidence.
pub struct ReferralAssessmentCaller;

#[async_trait]
impl AssessmentCaller for ReferralAssessmentCaller {
    async fn assess(
        &self,
        context: &AssessmentContext<'_>,
    ) -> Result<DecisionRecord, AssessmentError> {
        let screening = context.screening;
        let checks: Vec<DecisionCheck> = screening
            .checks
            .iter()
            .map(|c| DecisionCheck {
                check_id: c.check_id.clone(),
                name: c.check_name.clone(),
                result: c.verdict,
                details: c.reason.clone(),
            })
            .collect();

        let rationale = if screening.checks_for_llm.is_empty() {
            "No assessment backend configured; referred for manual review.".to_string()
        } else {
            format!(
                "No assessment backend configured; check(s) {} require review.",
                screening.checks_for_llm.join(", ")
            )
        };

        let payout = match &screening.payout {
            Some(p) if p.calculable => PayoutBreakdown::from_precalc(p),
            _ => PayoutBreakdown::zeroed("EUR"),
        };

        Ok(DecisionRecord {
            claim_id: context.claim_id.to_string(),
            decision: Decision::Refer,
            confidence: 0.5,
            rationale,
            checks,
            payout,
            fraud_indicators: Vec::new(),
            model: None,
            tokens_spent: 0,
            generated_at: chrono::Utc::now(),
        })
    }
}
