pub mod assessment;
pub mod config;
pub mod coverage;
pub mod decision;
pub mod extraction;
pub mod facts;
pub mod gate;
pub mod report;
pub mod screening;
pub mod signals;

pub use config::{
    ConcurrencyConfig, Config, GateThresholds, ScoringConfig, ScreeningConfig, StageWeights,
};
pub use coverage::*;
pub use decision::*;
pub use extraction::*;
pub use facts::*;
pub use gate::*;
pub use report::*;
pub use screening::*;
pub use signals::*;
