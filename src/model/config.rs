use serde::Deserialize;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "CLAIM_INTEL_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Quality gate thresholds, workspace-overridable
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    pub missing_critical_warn: usize,
    pub missing_critical_fail: usize,
    pub conflict_warn: usize,
    pub conflict_fail: usize,
    pub token_warn: usize,
    pub token_fail: usize,
    /// Divisor of the chars-based token estimate
    pub chars_per_token: usize,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            missing_critical_warn: 2,
            missing_critical_fail: 2,
            conflict_warn: 2,
            conflict_fail: 2,
            token_warn: 40_000,
            token_fail: 60_000,
            chars_per_token: 4,
        }
    }
}

/// Business constants used by the screening checks. Overridable rather than
/// hard-coded; the defaults reflect current policy terms.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Fallback mileage cap when the policy facts carry none
    pub mileage_cap_km: u64,
    /// Maximum allowed gap between the newest service entry and the claim document date
    pub service_gap_days: i64,
    /// Line-item terms that indicate rental-car or towing assistance
    pub assistance_keywords: Vec<String>,
    /// Authorized repair partners, matched case-insensitively
    pub authorized_partners: Vec<String>,
    pub currency: String,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            mileage_cap_km: 150_000,
            service_gap_days: 1095,
            assistance_keywords: [
                "rental",
                "rental car",
                "towing",
                "mietwagen",
                "leihwagen",
                "ersatzwagen",
                "abschlepp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            authorized_partners: Vec::new(),
            currency: "EUR".to_string(),
        }
    }
}

/// Per-stage weights applied by the composite scorer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StageWeights {
    pub extraction: f64,
    pub reconciliation: f64,
    pub coverage: f64,
    pub screening: f64,
    pub assessment: f64,
    pub decision: f64,
}

impl Default for StageWeights {
    fn default() -> Self {
        Self {
            extraction: 1.0,
            reconciliation: 1.0,
            coverage: 1.0,
            screening: 1.0,
            assessment: 1.0,
            decision: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub stage_weights: StageWeights,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            stage_weights: StageWeights::default(),
            high_threshold: 0.75,
            medium_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub max_concurrent_claims: usize,
    pub max_concurrent_assessments: usize,
    pub assessment_max_retries: usize,
    pub assessment_backoff_ms: u64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_claims: 4,
            max_concurrent_assessments: 2,
            assessment_max_retries: 3,
            assessment_backoff_ms: 500,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub gate: GateThresholds,
    pub screening: ScreeningConfig,
    pub scoring: ScoringConfig,
    pub concurrency: ConcurrencyConfig,
}

/// Application configuration, loaded once at startup and passed into each
/// component's constructor
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub gate: GateThresholds,
    pub screening: ScreeningConfig,
    pub scoring: ScoringConfig,
    pub concurrency: ConcurrencyConfig,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self {
            gate: file.gate,
            screening: file.screening,
            scoring: file.scoring,
            concurrency: file.concurrency,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }
}
