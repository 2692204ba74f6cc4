use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ov_monitor::domain::StopCode;
use ov_monitor::ovapi::{OvApiClient, OvApiConfig};
use ov_monitor::transport::{DepartureBoard, DiskDirectoryStore, StopDirectory};
use ov_monitor::trigger::{
    POLL_INTERVAL, RuleInstance, TracingSink, TriggerEngine, TriggerKind, TriggerMode,
};

/// Default path for the durable stop-directory snapshot.
const DEFAULT_DIRECTORY_CACHE: &str = "stop_directory_cache.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let station = match std::env::var("OV_STATION") {
        Ok(raw) => match StopCode::parse(&raw) {
            Ok(code) => code,
            Err(e) => {
                error!(station = %raw, error = %e, "OV_STATION is not a valid stop-area code");
                std::process::exit(1);
            }
        },
        Err(_) => {
            error!("OV_STATION not set; set it to the stop-area code to monitor");
            std::process::exit(1);
        }
    };

    let mut config = OvApiConfig::new();
    if let Ok(base_url) = std::env::var("OVAPI_BASE_URL") {
        config = config.with_base_url(base_url);
    }

    let client = match OvApiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create OVapi client");
            std::process::exit(1);
        }
    };

    // Warm the stop directory in the background; failure is logged and
    // never propagated to startup.
    let cache_path = std::env::var("OV_DIRECTORY_CACHE")
        .unwrap_or_else(|_| DEFAULT_DIRECTORY_CACHE.to_string());
    let directory = Arc::new(StopDirectory::new(
        client.clone(),
        DiskDirectoryStore::new(cache_path),
    ));
    let prefetch = directory.clone();
    tokio::spawn(async move {
        let stops = prefetch.fetch().await;
        if stops.is_empty() {
            warn!("stop directory pre-fetch returned no stops");
        } else {
            info!(count = stops.len(), "stop directory warmed");
        }
    });

    let board = DepartureBoard::new(client);

    let destination = std::env::var("OV_DESTINATION").ok();
    let threshold: i64 = std::env::var("OV_THRESHOLD_MINS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);
    let mode = match std::env::var("OV_TRIGGER_MODE").as_deref() {
        Ok("always") => TriggerMode::Always,
        _ => TriggerMode::Once,
    };

    let mut engine = TriggerEngine::new(board, TracingSink);
    for kind in [TriggerKind::Soon, TriggerKind::Delayed] {
        let mut instance =
            RuleInstance::new(kind, station.clone()).with_threshold(threshold).with_mode(mode);
        if let Some(dest) = &destination {
            instance = instance.with_destination(dest.clone());
        }
        engine.add_instance(instance);
    }

    info!(
        station = %station,
        destination = destination.as_deref().unwrap_or("(any)"),
        threshold,
        "monitoring departures"
    );

    let poll = tokio::spawn(engine.run(POLL_INTERVAL));

    // Teardown must cancel the recurring poll timer.
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    poll.abort();
    info!("shut down");
}
