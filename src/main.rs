use anyhow::{Context, Result};
use std::sync::Arc;

use refeed::cache::FeedCache;
use refeed::config::Config;
use refeed::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Arc::new(Config::from_env().context("Failed to load configuration")?);

    let client = reqwest::Client::builder()
        .user_agent(concat!("refeed/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let cache = Arc::new(FeedCache::new(Arc::clone(&config), client));
    let state = AppState {
        cache,
        config: Arc::clone(&config),
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, source = %config.source_feed_url, "Serving normalized feeds");

    axum::serve(listener, router(state).into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
