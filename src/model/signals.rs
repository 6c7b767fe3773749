//! Normalized confidence signals and the composite score

use serde::{Deserialize, Serialize};

/// Pipeline stage a signal was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStage {
    Extraction,
    Reconciliation,
    Coverage,
    Screening,
    Assessment,
    Decision,
}

/// One normalized trust signal. Never mutated after creation; the collector
/// only appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSnapshot {
    /// Dotted namespace, e.g. `coverage.avg_match_confidence`
    pub signal_name: String,
    pub raw_value: f64,
    /// Always within [0, 1]
    pub normalized_value: f64,
    pub source_stage: SourceStage,
    pub description: String,
}

impl SignalSnapshot {
    /// The only constructor; clamps the normalized value into [0, 1] and
    /// maps non-finite input to 0.0.
    pub fn new(
        signal_name: impl Into<String>,
        raw_value: f64,
        normalized_value: f64,
        source_stage: SourceStage,
        description: impl Into<String>,
    ) -> Self {
        let normalized_value = if normalized_value.is_finite() {
            normalized_value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            signal_name: signal_name.into(),
            raw_value,
            normalized_value,
            source_stage,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

/// Aggregate trust score over all collected signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeConfidence {
    pub score: f64,
    pub band: ConfidenceBand,
    pub signal_count: usize,
}
