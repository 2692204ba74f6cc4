//! Canonical departure model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::stop::StopCode;

/// Lifecycle status of a departure, reduced from the upstream
/// `TripStopStatus` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepartureStatus {
    Planned,
    Passed,
    Cancelled,
    Unknown,
}

impl DepartureStatus {
    /// Map a raw upstream status string. Unrecognized input is `Unknown`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PLANNED" | "DRIVING" | "ARRIVED" => DepartureStatus::Planned,
            "PASSED" => DepartureStatus::Passed,
            "CANCEL" | "CANCELLED" => DepartureStatus::Cancelled,
            _ => DepartureStatus::Unknown,
        }
    }
}

/// Vehicle type of a departure. Unrecognized upstream input defaults to bus,
/// the dominant mode in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    #[default]
    Bus,
    Tram,
    Metro,
    Train,
    Ferry,
}

impl TransportType {
    /// Map a raw upstream transport-type string.
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "TRAM" => TransportType::Tram,
            "METRO" => TransportType::Metro,
            "TRAIN" => TransportType::Train,
            "FERRY" | "BOAT" => TransportType::Ferry,
            _ => TransportType::Bus,
        }
    }

    /// Lowercase display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Bus => "bus",
            TransportType::Tram => "tram",
            TransportType::Metro => "metro",
            TransportType::Train => "train",
            TransportType::Ferry => "ferry",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single real-time transit event at a stop, reduced to the canonical
/// schema.
///
/// Departures are ephemeral: produced fresh per cache-refresh cycle, never
/// mutated, replaced wholesale on the next refresh. `timestamp_ms` is the
/// canonical sort and comparison key; `uid` is the dedup key and is stable
/// across polls for the same physical departure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    /// Line code as published (e.g. "12", "397").
    pub line: String,

    /// Destination headsign.
    pub destination: String,

    pub status: DepartureStatus,

    /// Planned departure as a local-clock "HH:MM" display string.
    pub planned_time: String,

    /// Expected (real-time) departure as a local-clock "HH:MM" string.
    pub expected_time: String,

    /// Expected minus planned, in whole minutes. May be negative for early
    /// running, though the feed rarely reports it.
    pub delay_minutes: i64,

    pub transport_type: TransportType,

    /// Operator code as published.
    pub operator: String,

    /// Expected departure as an absolute instant (ms since epoch).
    pub timestamp_ms: i64,

    /// Deterministic dedup key; see [`Departure::uid_for`].
    pub uid: String,
}

impl Departure {
    /// Build the dedup key for a departure.
    ///
    /// Composed of station code, line, destination, and the planned instant.
    /// Identical across repeated fetches of the same real-world departure;
    /// distinct for genuinely distinct departures. The planned instant is
    /// the final `:`-separated segment so cleanup can recover it.
    pub fn uid_for(station: &StopCode, line: &str, destination: &str, planned_ms: i64) -> String {
        format!("{}:{}:{}:{}", station.as_str(), line, destination, planned_ms)
    }

    /// Whole minutes until this departure, never negative.
    pub fn minutes_until(&self, now_ms: i64) -> i64 {
        let mins = ((self.timestamp_ms - now_ms) as f64 / 60_000.0).round() as i64;
        mins.max(0)
    }
}
