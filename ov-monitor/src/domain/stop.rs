//! Stop-area code and directory entry types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid stop-area code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop-area code: {reason}")]
pub struct InvalidStopCode {
    reason: &'static str,
}

/// A validated OVapi stop-area code.
///
/// Stop-area codes are short ASCII alphanumeric identifiers (e.g. "asdcs",
/// "utcs"). The upstream feed is inconsistent about casing, so codes are
/// normalized to uppercase; this type guarantees any `StopCode` value is
/// valid by construction.
///
/// # Examples
///
/// ```
/// use ov_monitor::domain::StopCode;
///
/// let code = StopCode::parse("asdcs").unwrap();
/// assert_eq!(code.as_str(), "ASDCS");
///
/// assert!(StopCode::parse("").is_err());
/// assert!(StopCode::parse("bad code").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopCode(String);

/// Maximum accepted code length; upstream codes are well under this.
const MAX_CODE_LEN: usize = 16;

impl StopCode {
    /// Parse a stop-area code from a string.
    ///
    /// The input must be 1-16 ASCII alphanumeric characters. Lowercase
    /// input is accepted and normalized to uppercase.
    pub fn parse(s: &str) -> Result<Self, InvalidStopCode> {
        if s.is_empty() {
            return Err(InvalidStopCode {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_CODE_LEN {
            return Err(InvalidStopCode {
                reason: "must be at most 16 characters",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidStopCode {
                reason: "must be ASCII letters or digits",
            });
        }

        Ok(StopCode(s.to_ascii_uppercase()))
    }

    /// Returns the normalized code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StopCode {
    type Error = InvalidStopCode;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        StopCode::parse(&s)
    }
}

impl From<StopCode> for String {
    fn from(code: StopCode) -> String {
        code.0
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.0)
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named physical transit location grouping one or more sub-stops.
///
/// The full collection is refreshed wholesale from the upstream directory
/// endpoint; entries are never patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopArea {
    /// Stable upstream identifier, unique within the directory.
    pub code: StopCode,

    /// Human-readable stop name.
    pub name: String,

    /// Town or municipality the stop belongs to.
    pub town: String,
}

impl StopArea {
    /// Case-insensitive substring match over name, town, and code.
    pub fn matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.town.to_lowercase().contains(query_lower)
            || self.code.as_str().to_lowercase().contains(query_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StopCode::parse("asdcs").is_ok());
        assert!(StopCode::parse("UTCS").is_ok());
        assert!(StopCode::parse("A1").is_ok());
        assert!(StopCode::parse("1234").is_ok());
    }

    #[test]
    fn normalizes_to_uppercase() {
        let code = StopCode::parse("asdcs").unwrap();
        assert_eq!(code.as_str(), "ASDCS");
    }

    #[test]
    fn reject_empty() {
        assert!(StopCode::parse("").is_err());
    }

    #[test]
    fn reject_too_long() {
        assert!(StopCode::parse("A".repeat(17).as_str()).is_err());
    }

    #[test]
    fn reject_non_alphanumeric() {
        assert!(StopCode::parse("AB CD").is_err());
        assert!(StopCode::parse("AB-CD").is_err());
        assert!(StopCode::parse("AB:CD").is_err());
        assert!(StopCode::parse("ÅBC").is_err());
    }

    #[test]
    fn equality_after_normalization() {
        let a = StopCode::parse("asdcs").unwrap();
        let b = StopCode::parse("ASDCS").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_roundtrip() {
        let code = StopCode::parse("asdcs").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"ASDCS\"");
        let back: StopCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<StopCode>("\"bad code\"").is_err());
    }

    #[test]
    fn stop_area_matches_name_town_code() {
        let area = StopArea {
            code: StopCode::parse("asdcs").unwrap(),
            name: "Amsterdam Centraal".to_string(),
            town: "Amsterdam".to_string(),
        };

        assert!(area.matches("amst"));
        assert!(area.matches("centraal"));
        assert!(area.matches("asdcs"));
        assert!(!area.matches("utrecht"));
    }
}
