//! TTL-gated cache of the two serialized output documents.
//!
//! One refresh covers both profiles: fetch, parse, build rich, build
//! restricted, then swap the snapshot in a single store. The two documents
//! therefore always come from the same upstream fetch.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::feed::{fetch_feed, parse_source_feed, FetchError, ParseError};
use crate::output::{build_restricted_feed, build_rich_feed};

/// Errors surfaced by a refresh attempt. Either way the previous snapshot
/// is left untouched.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The upstream feed could not be fetched or yielded no entries.
    #[error("Source feed unavailable: {0}")]
    SourceUnavailable(String),
    /// Building an output document failed after a successful fetch.
    #[error("Feed build failed: {0}")]
    Build(String),
}

impl From<FetchError> for RefreshError {
    fn from(e: FetchError) -> Self {
        RefreshError::SourceUnavailable(e.to_string())
    }
}

impl From<ParseError> for RefreshError {
    fn from(e: ParseError) -> Self {
        RefreshError::SourceUnavailable(e.to_string())
    }
}

/// One complete build: both documents plus the instant they were built.
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Debug)]
pub struct Snapshot {
    pub rich: Vec<u8>,
    pub restricted: Vec<u8>,
    pub built_at: DateTime<Utc>,
}

/// Process-wide cache with an idempotent "ensure fresh" operation.
pub struct FeedCache {
    config: Arc<Config>,
    client: reqwest::Client,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    /// Serializes the fetch-parse-build-store sequence so overlapping
    /// stale callers trigger at most one upstream fetch.
    refresh_gate: Mutex<()>,
}

impl FeedCache {
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        FeedCache {
            config,
            client,
            snapshot: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Current snapshot, if any refresh has ever succeeded.
    ///
    /// Readers only hold the lock long enough to clone the `Arc`; a
    /// refresh in progress never blocks serving the previous documents.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Refresh the cache unless it is already fresh.
    ///
    /// Callers that arrive while a refresh is in flight wait on the gate
    /// and then re-check freshness, so a burst of stale requests performs
    /// one upstream fetch, not one each.
    pub async fn ensure_fresh(&self, force: bool) -> Result<(), RefreshError> {
        if !force && self.has_fresh_snapshot().await {
            return Ok(());
        }

        let _gate = self.refresh_gate.lock().await;
        if !force && self.has_fresh_snapshot().await {
            // Someone else refreshed while this caller waited.
            return Ok(());
        }
        self.refresh().await
    }

    async fn has_fresh_snapshot(&self) -> bool {
        self.snapshot
            .read()
            .await
            .as_deref()
            .is_some_and(|snapshot| self.is_fresh(snapshot))
    }

    fn is_fresh(&self, snapshot: &Snapshot) -> bool {
        let age = Utc::now().signed_duration_since(snapshot.built_at);
        age < chrono::Duration::seconds(self.config.cache_ttl_secs as i64)
    }

    async fn refresh(&self) -> Result<(), RefreshError> {
        let started = std::time::Instant::now();

        let bytes = fetch_feed(&self.client, &self.config.source_feed_url).await?;
        let entries = parse_source_feed(&bytes)?;

        let rich = build_rich_feed(&entries, &self.config)
            .map_err(|e| RefreshError::Build(format!("{e:#}")))?;
        let restricted = build_restricted_feed(&entries, &self.config)
            .map_err(|e| RefreshError::Build(format!("{e:#}")))?;

        let snapshot = Arc::new(Snapshot {
            rich,
            restricted,
            built_at: Utc::now(),
        });
        *self.snapshot.write().await = Some(snapshot);

        tracing::info!(
            entries = entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rebuilt output documents"
        );
        Ok(())
    }
}
