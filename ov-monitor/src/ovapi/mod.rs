//! OVapi HTTP client.
//!
//! This module provides an HTTP client for the OVapi public-transport feed,
//! which serves real-time departure information for Dutch stops.
//!
//! Key characteristics of the feed:
//! - Departure times are naive local-clock strings (CET/CEST, no offset)
//! - Records are inconsistently shaped: most fields may be absent, and the
//!   destination appears under either `DestinationName50` or
//!   `DestinationName`
//! - The upstream TLS certificate chain is broken, so certificate
//!   validation is disabled for this client by design

use std::future::Future;

use crate::domain::{Departure, StopArea, StopCode};

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{OvApiClient, OvApiConfig};
pub use convert::{convert_departures, convert_stop_areas};
pub use error::OvApiError;
pub use mock::MockOvApi;
pub use types::{RawPass, RawStopArea, RawTimingPoint, StopAreaDetail, StopAreaDirectory};

/// Source of the stop-area directory.
pub trait StopAreaSource {
    /// Fetch the full stop-area directory, converted to domain types.
    fn stop_areas(&self) -> impl Future<Output = Result<Vec<StopArea>, OvApiError>> + Send;
}

/// Source of per-station departure records.
pub trait PassSource {
    /// Fetch current departures for a station, converted and sorted
    /// ascending by timestamp.
    fn departures(
        &self,
        station: &StopCode,
    ) -> impl Future<Output = Result<Vec<Departure>, OvApiError>> + Send;
}
