//! Trigger evaluation engine.
//!
//! Polls configured rule instances on a fixed interval, evaluates each
//! against current departures, and raises events at most once per
//! qualifying occurrence.

mod dedup;
mod engine;

pub use dedup::TriggeredSet;
pub use engine::{
    EventSink, EventState, EventTokens, RuleInstance, TracingSink, TriggerEngine, TriggerEvent,
    TriggerKind, TriggerMode, POLL_INTERVAL,
};
