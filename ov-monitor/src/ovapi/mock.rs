//! Mock OVapi client for testing without network access.
//!
//! Holds canned stop areas and per-station departures in memory and serves
//! them through the same source traits as the real client. A board can also
//! be marked as failing to exercise the fail-soft paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Departure, StopArea, StopCode};

use super::error::OvApiError;
use super::{PassSource, StopAreaSource};

/// In-memory OVapi stand-in.
#[derive(Clone, Default)]
pub struct MockOvApi {
    inner: Arc<RwLock<MockState>>,
}

#[derive(Default)]
struct MockState {
    stop_areas: Vec<StopArea>,
    boards: HashMap<StopCode, Vec<Departure>>,
    failing: HashSet<StopCode>,
    directory_failing: bool,
}

impl MockOvApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canned stop-area directory.
    pub async fn set_stop_areas(&self, stops: Vec<StopArea>) {
        self.inner.write().await.stop_areas = stops;
    }

    /// Replace the canned departures for a station.
    pub async fn set_board(&self, station: StopCode, departures: Vec<Departure>) {
        let mut state = self.inner.write().await;
        state.failing.remove(&station);
        state.boards.insert(station, departures);
    }

    /// Make departure fetches for a station fail.
    pub async fn fail_board(&self, station: StopCode) {
        self.inner.write().await.failing.insert(station);
    }

    /// Make directory fetches fail.
    pub async fn fail_directory(&self, failing: bool) {
        self.inner.write().await.directory_failing = failing;
    }
}

impl StopAreaSource for MockOvApi {
    async fn stop_areas(&self) -> Result<Vec<StopArea>, OvApiError> {
        let state = self.inner.read().await;
        if state.directory_failing {
            return Err(OvApiError::Api {
                status: 503,
                message: "mock directory failure".to_string(),
            });
        }
        Ok(state.stop_areas.clone())
    }
}

impl PassSource for MockOvApi {
    async fn departures(&self, station: &StopCode) -> Result<Vec<Departure>, OvApiError> {
        let state = self.inner.read().await;
        if state.failing.contains(station) {
            return Err(OvApiError::Api {
                status: 503,
                message: "mock board failure".to_string(),
            });
        }
        Ok(state.boards.get(station).cloned().unwrap_or_default())
    }
}
