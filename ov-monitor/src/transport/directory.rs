//! Stop directory with a 24-hour freshness window.
//!
//! Lookup order: in-process snapshot, then durable store, then network.
//! Each tier is gated by the same TTL against the same clock. Network
//! failure degrades to the last known-good in-process value (possibly
//! empty) rather than propagating the error.

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{StopArea, now_ms};
use crate::ovapi::StopAreaSource;

use super::store::{DirectoryStore, StoredDirectory};

/// Directory freshness window: 24 hours.
const DIRECTORY_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Maximum number of search results.
const SEARCH_LIMIT: usize = 15;

/// Minimum query length for a search; shorter queries return nothing.
const MIN_QUERY_LEN: usize = 2;

struct Snapshot {
    fetched_at_ms: i64,
    force_refresh: bool,
    stops: Vec<StopArea>,
}

/// Two-tier cached stop directory.
pub struct StopDirectory<F, S> {
    fetcher: F,
    store: S,
    snapshot: RwLock<Snapshot>,
    ttl_ms: i64,
}

impl<F, S> StopDirectory<F, S>
where
    F: StopAreaSource,
    S: DirectoryStore,
{
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher,
            store,
            snapshot: RwLock::new(Snapshot {
                fetched_at_ms: 0,
                force_refresh: false,
                stops: Vec::new(),
            }),
            ttl_ms: DIRECTORY_TTL_MS,
        }
    }

    /// Override the freshness window (for tests).
    pub fn with_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// The current stop-area collection, refreshed if stale.
    ///
    /// Callers must tolerate an empty result: on network failure the last
    /// known-good snapshot is returned, which may be empty on a cold start.
    pub async fn fetch(&self) -> Vec<StopArea> {
        let now = now_ms();

        {
            let snap = self.snapshot.read().await;
            if !snap.force_refresh && now - snap.fetched_at_ms < self.ttl_ms {
                return snap.stops.clone();
            }
        }

        // Durable tier, gated by the same TTL. Skipped after an explicit
        // invalidation.
        let skip_durable = self.snapshot.read().await.force_refresh;
        if !skip_durable
            && let Some(stored) = self.store.load()
            && now - stored.fetched_at_ms < self.ttl_ms
        {
            let mut snap = self.snapshot.write().await;
            snap.fetched_at_ms = stored.fetched_at_ms;
            snap.stops = stored.stops;
            return snap.stops.clone();
        }

        match self.fetcher.stop_areas().await {
            Ok(stops) => {
                let stored = StoredDirectory {
                    fetched_at_ms: now,
                    stops: stops.clone(),
                };
                if let Err(e) = self.store.save(&stored) {
                    warn!(error = %e, "failed to persist stop directory");
                }

                info!(count = stops.len(), "refreshed stop directory");

                let mut snap = self.snapshot.write().await;
                snap.fetched_at_ms = now;
                snap.force_refresh = false;
                snap.stops = stops.clone();
                stops
            }
            Err(e) => {
                warn!(error = %e, "stop directory fetch failed, serving last known-good");
                self.snapshot.read().await.stops.clone()
            }
        }
    }

    /// Search stop areas by case-insensitive substring over name, town,
    /// and code. Queries under two characters return nothing; at most 15
    /// results are returned.
    pub async fn search(&self, query: &str) -> Vec<StopArea> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let query_lower = query.to_lowercase();
        self.fetch()
            .await
            .into_iter()
            .filter(|stop| stop.matches(&query_lower))
            .take(SEARCH_LIMIT)
            .collect()
    }

    /// Force a network refresh on the next fetch, bypassing both tiers.
    pub async fn invalidate(&self) {
        let mut snap = self.snapshot.write().await;
        snap.fetched_at_ms = 0;
        snap.force_refresh = true;
    }
}
