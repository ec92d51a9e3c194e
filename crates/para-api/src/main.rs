//! Para API Server
//!
//! REST API server for the ParaInvestigate platform.
//!
//! Author: hephaex@gmail.com

use para_api::{create_router, state::AppState};
use para_core::config::{AppConfig, LoggingConfig};
use para_extractor::Analyzer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "para_api={level},para_store={level},para_extractor={level},tower_http=debug",
            level = logging.level
        )
        .into()
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("PARA_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    let store = para_store::create_store(&config.database).await?;

    let analyzer = if config.llm.is_configured() {
        let llm = para_llm::create_llm_client(&config.llm)?;
        tracing::info!(model = %llm.model(), "Language model configured");
        Analyzer::new(llm)
    } else {
        tracing::warn!("No language model configured; analysis will use fallback values");
        Analyzer::disabled()
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config, store, analyzer));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("ParaInvestigate API starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
