//! Deduplication state for once-mode triggers.
//!
//! A key's presence means "already fired for this exact departure". Keys
//! embed the departure's planned instant as the uid's trailing segment, so
//! the purge pass can drop entries once that instant is well in the past,
//! bounding growth over the process lifetime.

use std::collections::HashSet;

use super::TriggerKind;

/// How long after the planned instant a dedup key is retained.
const RETENTION_MS: i64 = 60 * 60 * 1000;

/// Fired-departure dedup state, one key set per trigger kind.
///
/// Owned exclusively by the trigger engine; mutation is explicit and
/// sequential within a poll tick.
#[derive(Debug, Default)]
pub struct TriggeredSet {
    soon: HashSet<String>,
    delayed: HashSet<String>,
}

impl TriggeredSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, kind: TriggerKind) -> &HashSet<String> {
        match kind {
            TriggerKind::Soon => &self.soon,
            TriggerKind::Delayed => &self.delayed,
        }
    }

    fn set_mut(&mut self, kind: TriggerKind) -> &mut HashSet<String> {
        match kind {
            TriggerKind::Soon => &mut self.soon,
            TriggerKind::Delayed => &mut self.delayed,
        }
    }

    fn key(kind: TriggerKind, uid: &str) -> String {
        match kind {
            TriggerKind::Soon => format!("soon_{uid}"),
            TriggerKind::Delayed => format!("delayed_{uid}"),
        }
    }

    /// Whether the given departure already fired for this kind.
    pub fn contains(&self, kind: TriggerKind, uid: &str) -> bool {
        self.set(kind).contains(&Self::key(kind, uid))
    }

    /// Record a firing for the given departure.
    pub fn insert(&mut self, kind: TriggerKind, uid: &str) {
        self.set_mut(kind).insert(Self::key(kind, uid));
    }

    /// Remove keys whose embedded planned instant is more than one hour in
    /// the past. Keys with an unparseable suffix are dropped too; they can
    /// never match a live uid.
    pub fn purge(&mut self, now_ms: i64) {
        let cutoff = now_ms - RETENTION_MS;
        let keep = |key: &String| matches!(planned_ms_of(key), Some(ms) if ms >= cutoff);

        self.soon.retain(keep);
        self.delayed.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.soon.len() + self.delayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.soon.is_empty() && self.delayed.is_empty()
    }
}

/// Extract the planned instant embedded as the key's final `:` segment.
fn planned_ms_of(key: &str) -> Option<i64> {
    key.rsplit(':').next()?.parse().ok()
}
