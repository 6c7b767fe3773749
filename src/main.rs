use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod model;
mod service;

use model::Config;
use service::{
    ArtifactStore, AssessmentCaller, CancelFlag, DecisionBroker, LlmAssessmentCaller, Pipeline,
    ReferralAssessmentCaller, Screener, ScreeningEngine,
};

const ENV_WORKSPACE: &str = "CLAIM_INTEL_WORKSPACE";

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let force = args.iter().any(|a| a == "--force");
    let workspace = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .or_else(|| std::env::var(ENV_WORKSPACE).ok())
        .unwrap_or_else(|| ".".to_string());

    let config = Config::from_env();

    let store = Arc::new(ArtifactStore::new(&workspace));
    let screener: Arc<dyn Screener> = Arc::new(ScreeningEngine::new(config.screening.clone()));
    let assessment: Arc<dyn AssessmentCaller> =
        match LlmAssessmentCaller::from_env(&config.concurrency) {
            Some(caller) => Arc::new(caller),
            None => {
                tracing::warn!(
                    "No assessment backend configured; claims needing review will be referred"
                );
                Arc::new(ReferralAssessmentCaller)
            }
        };
    let broker = DecisionBroker::new(assessment);
    let pipeline = Pipeline::new(&config, store, screener, broker);

    let run_id = uuid::Uuid::new_v4().to_string();
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received; in-flight claims will finish");
                cancel.cancel();
            }
        });
    }

    tracing::info!(workspace = %workspace, run = %run_id, "Starting claim adjudication run");

    match pipeline.run(&run_id, force, &cancel).await {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to render run summary"),
        },
        Err(e) => {
            tracing::error!(error = %e, "Pipeline run failed");
            std::process::exit(1);
        }
    }
}
