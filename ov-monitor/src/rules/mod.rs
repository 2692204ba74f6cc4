//! Stateless rule evaluation over canonical departure sequences.
//!
//! Shared by condition checks and the trigger engine. All functions are
//! pure: they return `false` or empty on no match, never an error. String
//! comparisons are case-insensitive substring for destinations and
//! case-insensitive exact for lines.

use serde::Serialize;

use crate::domain::Departure;

/// Keep departures whose destination contains `query`, case-insensitively.
pub fn filter_destination<'a>(departures: &'a [Departure], query: &str) -> Vec<&'a Departure> {
    let query_lower = query.to_lowercase();
    departures
        .iter()
        .filter(|d| d.destination.to_lowercase().contains(&query_lower))
        .collect()
}

/// Whether the first departure matches the given line and destination.
///
/// An empty line or destination argument acts as a wildcard.
pub fn next_departure_matches(departures: &[Departure], line: &str, destination: &str) -> bool {
    let Some(first) = departures.first() else {
        return false;
    };

    let line_ok = line.is_empty() || first.line.eq_ignore_ascii_case(line);
    let dest_ok = destination.is_empty()
        || first
            .destination
            .to_lowercase()
            .contains(&destination.to_lowercase());

    line_ok && dest_ok
}

/// Whether any departure leaves within `minutes` of `now_ms`.
pub fn departure_within(departures: &[Departure], now_ms: i64, minutes: i64) -> bool {
    departures.iter().any(|d| d.minutes_until(now_ms) <= minutes)
}

/// Whether any departure is delayed by strictly more than `minutes`.
pub fn any_delayed_more_than(departures: &[Departure], minutes: i64) -> bool {
    departures.iter().any(|d| d.delay_minutes > minutes)
}

/// First departure matching an optional destination filter.
pub fn first_matching<'a>(
    departures: &'a [Departure],
    destination: Option<&str>,
) -> Option<&'a Departure> {
    match destination {
        Some(query) if !query.is_empty() => {
            let query_lower = query.to_lowercase();
            departures
                .iter()
                .find(|d| d.destination.to_lowercase().contains(&query_lower))
        }
        _ => departures.first(),
    }
}

/// Normalized departure projection for info lookups.
///
/// `Default` is the all-empty/zero placeholder returned when nothing
/// matches.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DepartureInfo {
    pub line: String,
    pub destination: String,
    pub planned_time: String,
    pub expected_time: String,
    pub delay_minutes: i64,
    pub transport_type: String,
    pub operator: String,
}

impl DepartureInfo {
    pub fn from_departure(dep: &Departure) -> Self {
        Self {
            line: dep.line.clone(),
            destination: dep.destination.clone(),
            planned_time: dep.planned_time.clone(),
            expected_time: dep.expected_time.clone(),
            delay_minutes: dep.delay_minutes,
            transport_type: dep.transport_type.to_string(),
            operator: dep.operator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DepartureStatus, StopCode, TransportType};

    fn dep(line: &str, destination: &str, timestamp_ms: i64, delay: i64) -> Departure {
        let station = StopCode::parse("asdcs").unwrap();
        Departure {
            line: line.to_string(),
            destination: destination.to_string(),
            status: DepartureStatus::Planned,
            planned_time: "10:00".to_string(),
            expected_time: "10:00".to_string(),
            delay_minutes: delay,
            transport_type: TransportType::Bus,
            operator: "GVB".to_string(),
            timestamp_ms,
            uid: Departure::uid_for(&station, line, destination, timestamp_ms),
        }
    }

    #[test]
    fn filter_destination_is_case_insensitive_substring() {
        let deps = vec![
            dep("12", "Utrecht Centraal", 1000, 0),
            dep("13", "UTRECHT Overvecht", 2000, 0),
            dep("14", "Amsterdam Zuid", 3000, 0),
        ];

        let matched = filter_destination(&deps, "Utrecht");
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|d| d.destination.to_lowercase().contains("utrecht")));

        assert!(filter_destination(&deps, "den haag").is_empty());
    }

    #[test]
    fn next_departure_match_checks_first_only() {
        let deps = vec![
            dep("12", "Utrecht Centraal", 1000, 0),
            dep("13", "Amsterdam Zuid", 2000, 0),
        ];

        assert!(next_departure_matches(&deps, "12", "utrecht"));
        assert!(next_departure_matches(&deps, "12", ""));
        assert!(next_departure_matches(&deps, "", "centraal"));
        // Line 13 is second, not next.
        assert!(!next_departure_matches(&deps, "13", ""));
        assert!(!next_departure_matches(&deps, "12", "zuid"));
    }

    #[test]
    fn next_departure_match_on_empty_sequence_is_false() {
        assert!(!next_departure_matches(&[], "", ""));
    }

    #[test]
    fn departure_within_threshold() {
        let deps = vec![dep("12", "A", 10 * 60_000, 0)];

        assert!(departure_within(&deps, 0, 10));
        assert!(departure_within(&deps, 0, 15));
        assert!(!departure_within(&deps, 0, 9));
        assert!(departure_within(&deps, 6 * 60_000, 5));
        assert!(!departure_within(&[], 0, 60));
    }

    #[test]
    fn delay_threshold_is_strict() {
        let deps = vec![dep("12", "A", 1000, 5)];

        assert!(any_delayed_more_than(&deps, 4));
        assert!(!any_delayed_more_than(&deps, 5));
        assert!(!any_delayed_more_than(&[], 0));
    }

    #[test]
    fn first_matching_respects_filter() {
        let deps = vec![
            dep("12", "Amsterdam Zuid", 1000, 0),
            dep("13", "Utrecht Centraal", 2000, 0),
        ];

        assert_eq!(first_matching(&deps, None).unwrap().line, "12");
        assert_eq!(first_matching(&deps, Some("")).unwrap().line, "12");
        assert_eq!(first_matching(&deps, Some("utrecht")).unwrap().line, "13");
        assert!(first_matching(&deps, Some("den haag")).is_none());
        assert!(first_matching(&[], None).is_none());
    }

    #[test]
    fn info_placeholder_is_all_empty() {
        let info = DepartureInfo::default();
        assert!(info.line.is_empty());
        assert!(info.destination.is_empty());
        assert_eq!(info.delay_minutes, 0);
    }

    #[test]
    fn info_projection_copies_fields() {
        let d = dep("12", "Utrecht Centraal", 1000, 3);
        let info = DepartureInfo::from_departure(&d);
        assert_eq!(info.line, "12");
        assert_eq!(info.destination, "Utrecht Centraal");
        assert_eq!(info.delay_minutes, 3);
        assert_eq!(info.transport_type, "bus");
    }
}
