//! OVapi response DTOs.
//!
//! These types map directly to the OVapi JSON responses. They use `Option`
//! liberally because the feed omits fields rather than sending null values
//! in many cases.

use std::collections::HashMap;

use serde::Deserialize;

/// Response from `GET {base}/stopareacode/`: stop-area code → record.
pub type StopAreaDirectory = HashMap<String, RawStopArea>;

/// Response from `GET {base}/stopareacode/{code}`: sub-stop (timing point)
/// code → record carrying the departures for that sub-stop.
pub type StopAreaDetail = HashMap<String, RawTimingPoint>;

/// A stop-area record from the directory endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStopArea {
    #[serde(rename = "Name")]
    pub name: Option<String>,

    #[serde(rename = "Town")]
    pub town: Option<String>,
}

/// A sub-stop within a stop area, carrying its departure passes.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTimingPoint {
    /// Raw departure records, keyed by an upstream-internal pass id.
    #[serde(rename = "Passes", default)]
    pub passes: HashMap<String, RawPass>,
}

/// A single raw departure record ("pass").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPass {
    /// Planned departure, naive local-clock timestamp.
    pub target_departure_time: Option<String>,

    /// Real-time expected departure, naive local-clock timestamp.
    pub expected_departure_time: Option<String>,

    /// Upstream status vocabulary: PLANNED, DRIVING, ARRIVED, PASSED,
    /// CANCEL, UNKNOWN.
    pub trip_stop_status: Option<String>,

    /// Published line code.
    pub line_public_number: Option<String>,

    /// Preferred destination field (50-character headsign).
    #[serde(rename = "DestinationName50")]
    pub destination_name50: Option<String>,

    /// Fallback destination field on older records.
    pub destination_name: Option<String>,

    /// BUS, TRAM, METRO, TRAIN, BOAT.
    pub transport_type: Option<String>,

    pub operator_code: Option<String>,
}

impl RawPass {
    /// Destination headsign, preferring the 50-character field.
    pub fn destination(&self) -> Option<&str> {
        self.destination_name50
            .as_deref()
            .or(self.destination_name.as_deref())
    }
}
