//! Consumed contract: line-item coverage analysis produced by the matching collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Covered,
    NotCovered,
    ReviewNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Synonym,
    Category,
    Llm,
}

/// One invoice line item with its coverage determination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageItem {
    pub description: String,
    pub amount: f64,
    pub status: CoverageStatus,
    pub matched_component: Option<String>,
    pub matched_category: Option<String>,
    pub match_method: Option<MatchMethod>,
    pub match_confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageAnalysis {
    pub claim_id: String,
    pub items: Vec<CoverageItem>,
    pub analyzed_at: DateTime<Utc>,
}

impl CoverageAnalysis {
    pub fn covered_count(&self) -> usize {
        self.count(CoverageStatus::Covered)
    }

    pub fn not_covered_count(&self) -> usize {
        self.count(CoverageStatus::NotCovered)
    }

    pub fn review_needed_count(&self) -> usize {
        self.count(CoverageStatus::ReviewNeeded)
    }

    fn count(&self, status: CoverageStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }

    /// Structured line-item view for screening when no standalone line-item
    /// document was supplied
    pub fn line_items(&self) -> Vec<LineItem> {
        self.items
            .iter()
            .map(|i| LineItem {
                description: i.description.clone(),
                amount: i.amount,
            })
            .collect()
    }
}

/// Minimal line-item view handed to the screening checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}
