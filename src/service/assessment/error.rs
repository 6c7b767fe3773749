//! Error types for the assessment stage

use thiserror::Error;

/// Error type for claim assessment calls
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("Assessment provider rate limited the call: {0}")]
    RateLimited(String),

    #[error("Assessment call timed out: {0}")]
    Timeout(String),

    #[error("Assessment provider rejected credentials: {0}")]
    Authentication(String),

    #[error("Assessment configuration error: {0}")]
    Configuration(String),

    #[error("Assessment response failed validation: {0}")]
    InvalidResponse(String),

    #[error("Assessment call failed: {0}")]
    CallFailed(String),
}

impl AssessmentError {
    /// Rate-limit and timeout errors are retried with backoff; credential
    /// and configuration errors never are
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Timeout(_))
    }

    /// Classify a provider error by its message
    pub fn classify(err: impl std::fmt::Display) -> Self {
        let text = err.to_string();
        let lower = text.to_lowercase();

        if lower.contains("429") || lower.contains("rate limit") || lower.contains("overloaded") {
            Self::RateLimited(text)
        } else if lower.contains("timed out") || lower.contains("timeout") {
            Self::Timeout(text)
        } else if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("api key")
        {
            Self::Authentication(text)
        } else {
            Self::CallFailed(text)
        }
    }
}
