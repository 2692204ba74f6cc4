//! OVapi HTTP client.
//!
//! Provides async methods for querying the OVapi feed. Responses are
//! converted to domain types before they leave this module.

use std::time::Duration;

use crate::domain::{Departure, StopArea, StopCode};

use super::convert::{convert_departures, convert_stop_areas};
use super::error::OvApiError;
use super::types::{StopAreaDetail, StopAreaDirectory};
use super::{PassSource, StopAreaSource};

/// Default base URL for the OVapi feed.
const DEFAULT_BASE_URL: &str = "https://v0.ovapi.nl";

/// Default timeout for departure requests, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default timeout for the (much larger) directory request, in seconds.
const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 30;

/// Configuration for the OVapi client.
#[derive(Debug, Clone)]
pub struct OvApiConfig {
    /// Base URL for the feed
    pub base_url: String,
    /// Request timeout for departure requests, in seconds
    pub timeout_secs: u64,
    /// Request timeout for the directory request, in seconds
    pub directory_timeout_secs: u64,
}

impl OvApiConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            directory_timeout_secs: DEFAULT_DIRECTORY_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the departure request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OvApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// OVapi feed client.
#[derive(Debug, Clone)]
pub struct OvApiClient {
    http: reqwest::Client,
    base_url: String,
    directory_timeout: Duration,
}

impl OvApiClient {
    /// Create a new OVapi client with the given configuration.
    pub fn new(config: OvApiConfig) -> Result<Self, OvApiError> {
        // The upstream's certificate chain is broken; validation is
        // disabled for this host as a documented upstream quirk.
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            directory_timeout: Duration::from_secs(config.directory_timeout_secs),
        })
    }

    /// Fetch the raw stop-area directory.
    pub async fn fetch_stop_areas_raw(&self) -> Result<StopAreaDirectory, OvApiError> {
        let url = format!("{}/stopareacode/", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(self.directory_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OvApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| OvApiError::Json {
            message: e.to_string(),
            body: body.chars().take(500).collect(),
        })
    }

    /// Fetch the raw departure records for a stop area.
    pub async fn fetch_departures_raw(
        &self,
        station: &StopCode,
    ) -> Result<StopAreaDetail, OvApiError> {
        let url = format!("{}/stopareacode/{}", self.base_url, station.as_str());

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OvApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| OvApiError::Json {
            message: e.to_string(),
            body: body.chars().take(500).collect(),
        })
    }
}

impl StopAreaSource for OvApiClient {
    async fn stop_areas(&self) -> Result<Vec<StopArea>, OvApiError> {
        let raw = self.fetch_stop_areas_raw().await?;
        Ok(convert_stop_areas(raw))
    }
}

impl PassSource for OvApiClient {
    async fn departures(&self, station: &StopCode) -> Result<Vec<Departure>, OvApiError> {
        let raw = self.fetch_departures_raw(station).await?;
        Ok(convert_departures(station, &raw))
    }
}
