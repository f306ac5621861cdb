//! HTTP surface: liveness report and the two feed endpoints.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::cache::{FeedCache, Snapshot};
use crate::config::Config;

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<FeedCache>,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/zen.xml", get(rich_feed))
        .route("/telegram.xml", get(restricted_feed))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthReport {
    ok: bool,
    source: String,
    /// UNIX timestamp of the last successful build; 0 before the first.
    updated: i64,
}

/// Liveness report. Never triggers a refresh, so it stays cheap even when
/// the upstream is down.
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let updated = state
        .cache
        .snapshot()
        .await
        .map(|snapshot| snapshot.built_at.timestamp())
        .unwrap_or(0);
    Json(HealthReport {
        ok: true,
        source: state.config.source_feed_url.clone(),
        updated,
    })
}

async fn rich_feed(State(state): State<AppState>) -> Response {
    serve_document(&state, |snapshot| snapshot.rich.clone()).await
}

async fn restricted_feed(State(state): State<AppState>) -> Response {
    serve_document(&state, |snapshot| snapshot.restricted.clone()).await
}

async fn serve_document(
    state: &AppState,
    pick: impl Fn(&Snapshot) -> Vec<u8>,
) -> Response {
    if let Err(e) = state.cache.ensure_fresh(false).await {
        tracing::error!(error = %e, "Feed refresh failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Feed generation failed: {e}"),
        )
            .into_response();
    }

    match state.cache.snapshot().await {
        Some(snapshot) => (
            [(header::CONTENT_TYPE, RSS_CONTENT_TYPE)],
            pick(&snapshot),
        )
            .into_response(),
        // Unreachable after a successful ensure_fresh, but a missing
        // snapshot must not panic a request handler.
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Feed cache is empty after refresh".to_string(),
        )
            .into_response(),
    }
}
