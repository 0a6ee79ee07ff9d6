mod api;
mod artifacts;
mod classifier;
mod config;
mod corpus;
mod error;
mod lemmatizer;
mod ml;
mod preprocess;
mod stopwords;
mod ui;
mod vectorizer;

use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

use crate::artifacts::ModelContext;
use crate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut settings = Settings::from_env()?;
    settings.nlp_data_dir = corpus::prepare(&settings).await;

    // Artifacts are loaded before binding: a broken model never serves traffic.
    let context = ModelContext::shared(&settings).context("failed to load model artifacts")?;
    let state = Arc::new(api::AppState { context });

    let app = api::router(state, &settings.static_dir);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
