//! Per-station departure cache.
//!
//! Departure boards change every few seconds, so entries live for 30
//! seconds and expire independently per station. Fetch failures are logged
//! and converted to an empty sequence: a single upstream outage must not
//! break trigger evaluation or condition checks.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::warn;

use crate::domain::{Departure, StopCode};
use crate::ovapi::PassSource;
use crate::rules::{self, DepartureInfo};

use super::DepartureSource;

/// Departure cache TTL.
const DEPARTURE_TTL: Duration = Duration::from_secs(30);

/// Maximum number of cached station boards.
const MAX_CACHED_STATIONS: u64 = 500;

/// Default number of departures returned to callers.
pub const DEFAULT_DEPARTURE_LIMIT: usize = 10;

/// How many upcoming departures the destination listing scans.
const DESTINATION_SCAN_LIMIT: usize = 50;

/// A destination with a representative line number, for display.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DestinationEntry {
    pub destination: String,
    /// Line of the first departure seen for this destination.
    pub line: String,
}

/// Cache-backed departure board client.
pub struct DepartureBoard<F> {
    fetcher: F,
    cache: MokaCache<StopCode, Arc<Vec<Departure>>>,
}

impl<F> DepartureBoard<F>
where
    F: PassSource + Send + Sync,
{
    pub fn new(fetcher: F) -> Self {
        Self::with_ttl(fetcher, DEPARTURE_TTL)
    }

    /// Create a board with a custom cache TTL (for tests).
    pub fn with_ttl(fetcher: F, ttl: Duration) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(MAX_CACHED_STATIONS)
            .build();

        Self { fetcher, cache }
    }

    /// The full cached departure list for a station.
    ///
    /// On a cache miss the upstream is queried; failures are logged and
    /// yield an uncached empty list, so the next call retries.
    async fn all_departures(&self, station: &StopCode) -> Arc<Vec<Departure>> {
        if let Some(hit) = self.cache.get(station).await {
            return hit;
        }

        match self.fetcher.departures(station).await {
            Ok(departures) => {
                let entry = Arc::new(departures);
                self.cache.insert(station.clone(), entry.clone()).await;
                entry
            }
            Err(e) => {
                warn!(station = %station, error = %e, "departure fetch failed, serving empty board");
                Arc::new(Vec::new())
            }
        }
    }

    /// Current departures for a station, ascending by timestamp, truncated
    /// to `limit`.
    pub async fn departures(&self, station: &StopCode, limit: usize) -> Vec<Departure> {
        let all = self.all_departures(station).await;
        all.iter().take(limit).cloned().collect()
    }

    /// Unique destinations among the next 50 departures, in first-seen
    /// order, each annotated with a representative line.
    pub async fn list_destinations(&self, station: &StopCode) -> Vec<DestinationEntry> {
        let all = self.all_departures(station).await;

        let mut entries: Vec<DestinationEntry> = Vec::new();
        for dep in all.iter().take(DESTINATION_SCAN_LIMIT) {
            if entries.iter().any(|e| e.destination == dep.destination) {
                continue;
            }
            entries.push(DestinationEntry {
                destination: dep.destination.clone(),
                line: dep.line.clone(),
            });
        }

        entries
    }

    /// Normalized projection of the first departure matching an optional
    /// destination filter, or the all-empty placeholder when none match.
    pub async fn departure_info(
        &self,
        station: &StopCode,
        destination: Option<&str>,
    ) -> DepartureInfo {
        let all = self.all_departures(station).await;

        rules::first_matching(&all, destination)
            .map(DepartureInfo::from_departure)
            .unwrap_or_default()
    }

    /// Drop all cached boards.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<F> DepartureSource for DepartureBoard<F>
where
    F: PassSource + Send + Sync,
{
    async fn departures(&self, station: &StopCode, limit: usize) -> Vec<Departure> {
        DepartureBoard::departures(self, station, limit).await
    }
}
