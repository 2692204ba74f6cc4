//! Conversion from OVapi DTOs to domain types.
//!
//! This module handles the transformation of raw feed records into the
//! canonical departure model, including timezone normalization and the
//! exclusion rules for passed and time-less records.

use tracing::{debug, warn};

use crate::domain::{
    Departure, DepartureStatus, StopArea, StopCode, TransportType, format_local_hhmm,
    parse_instant_ms,
};

use super::types::{RawPass, StopAreaDetail, StopAreaDirectory};

/// Convert the raw directory mapping to an ordered stop-area collection.
///
/// Entries with codes the domain rejects are skipped. Output is sorted by
/// name, then code, for a stable directory order.
pub fn convert_stop_areas(raw: StopAreaDirectory) -> Vec<StopArea> {
    let mut stops: Vec<StopArea> = raw
        .into_iter()
        .filter_map(|(code, record)| {
            let code = match StopCode::parse(&code) {
                Ok(code) => code,
                Err(e) => {
                    warn!(code = %code, error = %e, "skipping stop area with invalid code");
                    return None;
                }
            };

            Some(StopArea {
                code,
                name: record.name.unwrap_or_default(),
                town: record.town.unwrap_or_default(),
            })
        })
        .collect();

    stops.sort_by(|a, b| (a.name.as_str(), a.code.as_str()).cmp(&(b.name.as_str(), b.code.as_str())));
    stops
}

/// Convert the raw departure records for a stop area to canonical
/// departures, sorted ascending by timestamp.
///
/// Records with status `Passed` or an unresolvable planned time are
/// excluded entirely.
pub fn convert_departures(station: &StopCode, raw: &StopAreaDetail) -> Vec<Departure> {
    let mut departures: Vec<Departure> = raw
        .values()
        .flat_map(|timing_point| timing_point.passes.values())
        .filter_map(|pass| convert_pass(station, pass))
        .collect();

    departures.sort_by_key(|d| d.timestamp_ms);
    departures
}

/// Convert a single raw pass. Returns `None` for records the canonical
/// list excludes.
fn convert_pass(station: &StopCode, pass: &RawPass) -> Option<Departure> {
    let status = DepartureStatus::from_raw(pass.trip_stop_status.as_deref().unwrap_or(""));

    if status == DepartureStatus::Passed {
        return None;
    }

    let planned_ms = match pass.target_departure_time.as_deref().and_then(parse_instant_ms) {
        Some(ms) if ms != 0 => ms,
        _ => {
            debug!(
                line = pass.line_public_number.as_deref().unwrap_or(""),
                "skipping pass with unresolvable planned time"
            );
            return None;
        }
    };

    // Missing or malformed expected time falls back to planned: delay zero.
    let expected_ms = pass
        .expected_departure_time
        .as_deref()
        .and_then(parse_instant_ms)
        .unwrap_or(planned_ms);

    let delay_minutes = ((expected_ms - planned_ms) as f64 / 60_000.0).round() as i64;

    let line = pass.line_public_number.clone().unwrap_or_default();
    let destination = pass.destination().unwrap_or_default().to_string();
    let uid = Departure::uid_for(station, &line, &destination, planned_ms);

    Some(Departure {
        line,
        destination,
        status,
        planned_time: format_local_hhmm(planned_ms),
        expected_time: format_local_hhmm(expected_ms),
        delay_minutes,
        transport_type: TransportType::from_raw(pass.transport_type.as_deref().unwrap_or("")),
        operator: pass.operator_code.clone().unwrap_or_default(),
        timestamp_ms: expected_ms,
        uid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ovapi::types::RawTimingPoint;
    use std::collections::HashMap;

    fn station() -> StopCode {
        StopCode::parse("asdcs").unwrap()
    }

    fn make_pass(line: &str, destination: &str, target: &str, expected: &str) -> RawPass {
        RawPass {
            target_departure_time: Some(target.to_string()),
            expected_departure_time: Some(expected.to_string()),
            trip_stop_status: Some("PLANNED".to_string()),
            line_public_number: Some(line.to_string()),
            destination_name50: Some(destination.to_string()),
            destination_name: None,
            transport_type: Some("TRAM".to_string()),
            operator_code: Some("GVB".to_string()),
        }
    }

    fn detail_with(passes: Vec<(&str, RawPass)>) -> StopAreaDetail {
        let passes: HashMap<String, RawPass> = passes
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        HashMap::from([("30005093".to_string(), RawTimingPoint { passes })])
    }

    #[test]
    fn convert_simple_pass() {
        let detail = detail_with(vec![(
            "a",
            make_pass("12", "Amstelveen", "2025-06-14T13:31:00", "2025-06-14T13:33:00"),
        )]);

        let deps = convert_departures(&station(), &detail);
        assert_eq!(deps.len(), 1);

        let dep = &deps[0];
        assert_eq!(dep.line, "12");
        assert_eq!(dep.destination, "Amstelveen");
        assert_eq!(dep.status, DepartureStatus::Planned);
        assert_eq!(dep.planned_time, "13:31");
        assert_eq!(dep.expected_time, "13:33");
        assert_eq!(dep.delay_minutes, 2);
        assert_eq!(dep.transport_type, TransportType::Tram);
        assert_eq!(dep.operator, "GVB");
        // June is CEST: 13:33 local = 11:33 UTC.
        assert_eq!(dep.timestamp_ms, parse_instant_ms("2025-06-14T11:33:00Z").unwrap());
    }

    #[test]
    fn output_sorted_by_timestamp() {
        let detail = detail_with(vec![
            ("c", make_pass("3", "C", "2025-06-14T14:00:00", "2025-06-14T14:00:00")),
            ("a", make_pass("1", "A", "2025-06-14T13:00:00", "2025-06-14T13:00:00")),
            ("b", make_pass("2", "B", "2025-06-14T13:30:00", "2025-06-14T13:30:00")),
        ]);

        let deps = convert_departures(&station(), &detail);
        let timestamps: Vec<i64> = deps.iter().map(|d| d.timestamp_ms).collect();
        let mut sorted = timestamps.clone();
        sorted.sort();
        assert_eq!(timestamps, sorted);
        assert_eq!(deps[0].line, "1");
        assert_eq!(deps[2].line, "3");
    }

    #[test]
    fn passed_records_excluded() {
        let mut pass = make_pass("12", "A", "2025-06-14T13:31:00", "2025-06-14T13:31:00");
        pass.trip_stop_status = Some("PASSED".to_string());

        let detail = detail_with(vec![("a", pass)]);
        assert!(convert_departures(&station(), &detail).is_empty());
    }

    #[test]
    fn unresolvable_planned_time_excluded() {
        let mut pass = make_pass("12", "A", "garbage", "2025-06-14T13:31:00");
        pass.target_departure_time = Some("garbage".to_string());

        let detail = detail_with(vec![("a", pass)]);
        assert!(convert_departures(&station(), &detail).is_empty());

        let mut pass = make_pass("12", "A", "x", "x");
        pass.target_departure_time = None;
        let detail = detail_with(vec![("a", pass)]);
        assert!(convert_departures(&station(), &detail).is_empty());
    }

    #[test]
    fn missing_expected_defaults_delay_zero() {
        let mut pass = make_pass("12", "A", "2025-06-14T13:31:00", "");
        pass.expected_departure_time = None;

        let detail = detail_with(vec![("a", pass)]);
        let deps = convert_departures(&station(), &detail);

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].delay_minutes, 0);
        assert_eq!(deps[0].expected_time, deps[0].planned_time);
    }

    #[test]
    fn cancelled_records_kept_with_status() {
        let mut pass = make_pass("12", "A", "2025-06-14T13:31:00", "2025-06-14T13:31:00");
        pass.trip_stop_status = Some("CANCEL".to_string());

        let detail = detail_with(vec![("a", pass)]);
        let deps = convert_departures(&station(), &detail);

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].status, DepartureStatus::Cancelled);
    }

    #[test]
    fn uid_stable_across_repeated_conversion() {
        let detail = detail_with(vec![
            ("a", make_pass("12", "A", "2025-06-14T13:31:00", "2025-06-14T13:33:00")),
            ("b", make_pass("17", "B", "2025-06-14T13:40:00", "2025-06-14T13:40:00")),
        ]);

        let first = convert_departures(&station(), &detail);
        let second = convert_departures(&station(), &detail);

        let first_uids: Vec<&str> = first.iter().map(|d| d.uid.as_str()).collect();
        let second_uids: Vec<&str> = second.iter().map(|d| d.uid.as_str()).collect();
        assert_eq!(first_uids, second_uids);
    }

    #[test]
    fn unknown_transport_type_defaults_to_bus() {
        let mut pass = make_pass("12", "A", "2025-06-14T13:31:00", "2025-06-14T13:31:00");
        pass.transport_type = None;

        let detail = detail_with(vec![("a", pass)]);
        let deps = convert_departures(&station(), &detail);
        assert_eq!(deps[0].transport_type, TransportType::Bus);
    }

    #[test]
    fn convert_stop_areas_sorted_and_filtered() {
        let raw: StopAreaDirectory = HashMap::from([
            (
                "UTCS".to_string(),
                crate::ovapi::types::RawStopArea {
                    name: Some("Utrecht Centraal".to_string()),
                    town: Some("Utrecht".to_string()),
                },
            ),
            (
                "ASDCS".to_string(),
                crate::ovapi::types::RawStopArea {
                    name: Some("Amsterdam Centraal".to_string()),
                    town: Some("Amsterdam".to_string()),
                },
            ),
            (
                "bad code".to_string(),
                crate::ovapi::types::RawStopArea {
                    name: Some("Broken".to_string()),
                    town: None,
                },
            ),
        ]);

        let stops = convert_stop_areas(raw);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].name, "Amsterdam Centraal");
        assert_eq!(stops[1].name, "Utrecht Centraal");
    }
}
