//! Trigger engine: stateful, deduplicated event detection across polls.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Departure, StopCode, now_ms};
use crate::rules;
use crate::transport::{DEFAULT_DEPARTURE_LIMIT, DepartureSource};

use super::dedup::TriggeredSet;

/// Poll interval for trigger evaluation.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default threshold, in minutes, for both trigger kinds.
const DEFAULT_THRESHOLD_MINS: i64 = 5;

/// The two trigger kinds exposed outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// A departure leaves within the threshold.
    Soon,
    /// A departure is delayed beyond the threshold.
    Delayed,
}

/// Firing discipline for a rule instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    /// Each distinct physical departure fires at most once.
    #[default]
    Once,
    /// Re-fire on every qualifying poll.
    Always,
}

/// A configured trigger rule.
#[derive(Debug, Clone)]
pub struct RuleInstance {
    pub kind: TriggerKind,
    pub station: StopCode,
    /// Optional case-insensitive destination substring filter.
    pub destination: Option<String>,
    pub threshold_minutes: i64,
    pub mode: TriggerMode,
}

impl RuleInstance {
    pub fn new(kind: TriggerKind, station: StopCode) -> Self {
        Self {
            kind,
            station,
            destination: None,
            threshold_minutes: DEFAULT_THRESHOLD_MINS,
            mode: TriggerMode::Once,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_threshold(mut self, minutes: i64) -> Self {
        self.threshold_minutes = minutes;
        self
    }

    pub fn with_mode(mut self, mode: TriggerMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Token payload delivered with a fired event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTokens {
    pub line: String,
    pub destination: String,
    pub planned_time: String,
    pub expected_time: String,
    /// Minutes-until for soon triggers, delay-minutes for delayed triggers.
    pub minutes: i64,
}

/// Matching-state payload used to re-validate which configured rule
/// instances a firing applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventState {
    pub station: String,
    pub destination: Option<String>,
}

/// A raised trigger event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    pub tokens: EventTokens,
    pub state: EventState,
}

/// Outward event surface the engine fires into.
pub trait EventSink {
    fn fire(&self, event: &TriggerEvent);
}

/// Sink that logs fired events, for standalone operation.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn fire(&self, event: &TriggerEvent) {
        info!(
            kind = ?event.kind,
            station = %event.state.station,
            line = %event.tokens.line,
            destination = %event.tokens.destination,
            minutes = event.tokens.minutes,
            "trigger fired"
        );
    }
}

/// The trigger-evaluation engine.
///
/// Owns the dedup state exclusively. Each tick evaluates every configured
/// instance sequentially; one instance's evaluation never affects the
/// others, and the fetch path is fail-soft, so a tick cannot abort halfway.
pub struct TriggerEngine<B, E> {
    board: B,
    sink: E,
    instances: Vec<RuleInstance>,
    triggered: TriggeredSet,
}

impl<B, E> TriggerEngine<B, E>
where
    B: DepartureSource,
    E: EventSink,
{
    pub fn new(board: B, sink: E) -> Self {
        Self {
            board,
            sink,
            instances: Vec::new(),
            triggered: TriggeredSet::new(),
        }
    }

    pub fn add_instance(&mut self, instance: RuleInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Evaluate all instances once against the current departures, then
    /// reclaim stale dedup state.
    pub async fn tick(&mut self, now_ms: i64) {
        for idx in 0..self.instances.len() {
            let instance = self.instances[idx].clone();
            self.evaluate(&instance, now_ms).await;
        }

        self.triggered.purge(now_ms);
    }

    /// Evaluate one instance: at most one event fires per call.
    async fn evaluate(&mut self, instance: &RuleInstance, now_ms: i64) {
        let departures = self
            .board
            .departures(&instance.station, DEFAULT_DEPARTURE_LIMIT)
            .await;

        let filtered: Vec<&Departure> = match instance.destination.as_deref() {
            Some(query) if !query.is_empty() => rules::filter_destination(&departures, query),
            _ => departures.iter().collect(),
        };

        // Walk in timestamp order; fire for the first qualifying departure
        // not already recorded, then stop.
        for dep in filtered {
            let minutes = match instance.kind {
                TriggerKind::Soon => dep.minutes_until(now_ms),
                TriggerKind::Delayed => dep.delay_minutes,
            };

            let qualifies = match instance.kind {
                TriggerKind::Soon => minutes <= instance.threshold_minutes,
                TriggerKind::Delayed => minutes > instance.threshold_minutes,
            };
            if !qualifies {
                continue;
            }

            if instance.mode == TriggerMode::Once
                && self.triggered.contains(instance.kind, &dep.uid)
            {
                debug!(uid = %dep.uid, "already fired, skipping");
                continue;
            }

            let event = TriggerEvent {
                kind: instance.kind,
                tokens: EventTokens {
                    line: dep.line.clone(),
                    destination: dep.destination.clone(),
                    planned_time: dep.planned_time.clone(),
                    expected_time: dep.expected_time.clone(),
                    minutes,
                },
                state: EventState {
                    station: instance.station.to_string(),
                    destination: instance.destination.clone(),
                },
            };

            self.sink.fire(&event);

            if instance.mode == TriggerMode::Once {
                self.triggered.insert(instance.kind, &dep.uid);
            }

            break;
        }
    }

    /// Poll forever on the given interval. The first tick runs after one
    /// full interval; abort the surrounding task to stop.
    pub async fn run(mut self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // First tick is immediate, skip it.
        loop {
            interval.tick().await;
            self.tick(now_ms()).await;
        }
    }
}
