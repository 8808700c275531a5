/// Core data types for the station high-temperature watcher.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no external state — only types, the error enum,
/// and the unit conversion.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single temperature observation from an NWS station.
///
/// Corresponds to the `properties` object of one feature in an
/// api.weather.gov observation response. The temperature may be absent
/// when the sensor did not report a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Observation time, UTC.
    pub timestamp: DateTime<Utc>,
    /// Air temperature in degrees Celsius; `None` when the station
    /// reported no value for this reading.
    pub temperature_c: Option<f64>,
}

/// The highest temperature recorded so far, in Fahrenheit, together with
/// when it was observed.
///
/// There is no day-rollover: the watermark is monotonic for as long as the
/// note file persists, so in practice it is an all-time high across
/// restarts. Recovery at startup reads the last recorded value from the
/// note file and never appends a lower one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighWatermark {
    pub value_f: f64,
    pub observed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Unit conversion
// ---------------------------------------------------------------------------

/// Converts Celsius to Fahrenheit. Unknown input stays unknown.
pub fn celsius_to_fahrenheit(celsius: Option<f64>) -> Option<f64> {
    celsius.map(|c| c * 9.0 / 5.0 + 32.0)
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing NWS observation data.
///
/// Rate limiting (429) and not-modified (304) are *not* errors — they are
/// expected outcomes carried by `ingest::nws::LatestFetch`. This enum covers
/// the hard failures that abort a poll cycle.
#[derive(Debug)]
pub enum StationError {
    /// Non-2xx (and non-304/429) HTTP response from api.weather.gov.
    HttpError(u16),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The request itself failed (timeout, DNS, connection reset).
    RequestError(String),
}

impl std::fmt::Display for StationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationError::HttpError(code) => write!(f, "HTTP error: {}", code),
            StationError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            StationError::RequestError(msg) => write!(f, "Request failed: {}", msg),
        }
    }
}

impl std::error::Error for StationError {}

impl From<reqwest::Error> for StationError {
    fn from(err: reqwest::Error) -> Self {
        StationError::RequestError(err.to_string())
    }
}

impl From<serde_json::Error> for StationError {
    fn from(err: serde_json::Error) -> Self {
        StationError::ParseError(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit_known_points() {
        assert_eq!(celsius_to_fahrenheit(Some(0.0)), Some(32.0));
        assert_eq!(celsius_to_fahrenheit(Some(100.0)), Some(212.0));
        assert_eq!(celsius_to_fahrenheit(Some(-40.0)), Some(-40.0));
    }

    #[test]
    fn test_celsius_to_fahrenheit_fractional() {
        let f = celsius_to_fahrenheit(Some(21.7)).unwrap();
        assert!((f - 71.06).abs() < 1e-9, "21.7C should be 71.06F, got {}", f);
    }

    #[test]
    fn test_unknown_temperature_stays_unknown() {
        assert_eq!(celsius_to_fahrenheit(None), None);
    }

    #[test]
    fn test_error_display_formats() {
        assert_eq!(StationError::HttpError(500).to_string(), "HTTP error: 500");
        assert!(
            StationError::ParseError("bad json".to_string())
                .to_string()
                .contains("bad json")
        );
    }
}
