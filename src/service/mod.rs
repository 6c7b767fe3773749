pub mod assessment;
pub mod decision;
pub mod pipeline;
pub mod quality;
pub mod reconciliation;
pub mod report;
pub mod screening;
pub mod signals;
pub mod store;

pub use assessment::{AssessmentCaller, LlmAssessmentCaller, ReferralAssessmentCaller};
pub use decision::DecisionBroker;
pub use pipeline::{CancelFlag, Pipeline};
pub use quality::QualityGate;
pub use reconciliation::FactReconciler;
pub use screening::{Screener, ScreeningEngine};
pub use signals::{CompositeScorer, SignalCollector};
pub use store::ArtifactStore;
