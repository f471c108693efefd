//! Insight query server
//!
//! Holds course and room datasets in memory and answers pseudo-English
//! query sentences over HTTP.

use std::sync::Arc;

use tracing::info;

mod config;
mod facade;
mod http;
mod logging;

use config::Config;
use facade::InsightFacade;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("INSIGHT_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path)?;
    config.apply_logging_env();
    logging::init();

    info!(
        config = %config_path,
        max_sentence_bytes = config.limits.max_sentence_bytes,
        max_dataset_records = config.limits.max_dataset_records,
        "configuration loaded"
    );

    let facade = Arc::new(InsightFacade::new(config.limits.clone()));
    http::serve(&config.bind_address(), facade).await?;

    Ok(())
}
