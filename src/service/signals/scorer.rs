//! Weighted aggregation of signal snapshots into a composite confidence

use crate::model::{
    CompositeConfidence, ConfidenceBand, ScoringConfig, SignalSnapshot, SourceStage,
};

pub struct CompositeScorer {
    config: ScoringConfig,
}

impl CompositeScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Weighted mean of the normalized signal values, banded for triage.
    /// An empty signal list scores 0.0 so that claims with no collected
    /// evidence surface as low-trust.
    pub fn score(&self, signals: &[SignalSnapshot]) -> CompositeConfidence {
        if signals.is_empty() {
            return CompositeConfidence {
                score: 0.0,
                band: ConfidenceBand::Low,
                signal_count: 0,
            };
        }

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for signal in signals {
            let weight = self.stage_weight(signal.source_stage).max(0.0);
            weighted_sum += signal.normalized_value * weight;
            weight_total += weight;
        }

        let score = if weight_total > 0.0 {
            (weighted_sum / weight_total).clamp(0.0, 1.0)
        } else {
            0.0
        };

        CompositeConfidence {
            score,
            band: self.band(score),
            signal_count: signals.len(),
        }
    }

    fn band(&self, score: f64) -> ConfidenceBand {
        if score >= self.config.high_threshold {
            ConfidenceBand::High
        } else if score >= self.config.medium_threshold {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    fn stage_weight(&self, stage: SourceStage) -> f64 {
        let weights = &self.config.stage_weights;
        match stage {
            SourceStage::Extraction => weights.extraction,
            SourceStage::Reconciliation => weights.reconciliation,
            SourceStage::Coverage => weights.coverage,
            SourceStage::Screening => weights.screening,
            SourceStage::Assessment => weights.assessment,
            SourceStage::Decision => weights.decision,
        }
    }
}
