//! Caching fetch layer over the OVapi client.
//!
//! Two tiers: a long-lived stop directory (volatile snapshot backed by an
//! injectable durable store, 24 h TTL) and a short-lived per-station
//! departure cache (30 s TTL). Failures never cross this boundary; callers
//! see last-known-good or empty results.

use std::future::Future;

use crate::domain::{Departure, StopCode};

mod departures;
mod directory;
mod store;

pub use departures::{DEFAULT_DEPARTURE_LIMIT, DepartureBoard, DestinationEntry};
pub use directory::StopDirectory;
pub use store::{DirectoryStore, DiskDirectoryStore, StoreError, StoredDirectory};

/// Cache-backed, fail-soft source of canonical departures, as consumed by
/// the trigger engine and condition evaluation.
pub trait DepartureSource {
    /// Current departures for a station, ascending by timestamp, truncated
    /// to `limit`. Never fails: upstream errors yield an empty sequence.
    fn departures(
        &self,
        station: &StopCode,
        limit: usize,
    ) -> impl Future<Output = Vec<Departure>> + Send;
}
