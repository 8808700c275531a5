/// NWS (National Weather Service) Observation API Client
///
/// Retrieves station observations from api.weather.gov for high-temperature
/// tracking. Two read operations: the latest observation (fetched
/// conditionally with an ETag to avoid re-downloading unchanged data) and a
/// small recent-observations window used to catch spikes between polls.
///
/// API Documentation: https://www.weather.gov/documentation/services-web-api
/// Latest observation: https://api.weather.gov/stations/{id}/observations/latest
///
/// The API expects a descriptive User-Agent; callers set it once on the
/// `reqwest` client rather than per request.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{ETAG, IF_NONE_MATCH, RETRY_AFTER};
use serde::Deserialize;

use crate::model::{Observation, StationError};

const NWS_BASE_URL: &str = "https://api.weather.gov";

/// Default backoff when a 429 carries no Retry-After header, seconds.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// ============================================================================
// NWS API Response Structures
// ============================================================================

/// Latest-observation response (a single GeoJSON feature).
#[derive(Debug, Deserialize)]
struct LatestResponse {
    properties: ObservationProperties,
}

/// Recent-observations response (a GeoJSON feature collection).
#[derive(Debug, Deserialize)]
struct RecentResponse {
    #[serde(default)]
    features: Vec<ObservationFeature>,
}

#[derive(Debug, Deserialize)]
struct ObservationFeature {
    properties: ObservationProperties,
}

#[derive(Debug, Deserialize)]
struct ObservationProperties {
    timestamp: DateTime<Utc>,
    #[serde(default)]
    temperature: Quantity,
}

/// A measured quantity; `value` is null when the sensor did not report.
#[derive(Debug, Default, Deserialize)]
struct Quantity {
    value: Option<f64>,
}

// ============================================================================
// Fetch results
// ============================================================================

/// Outcome of a conditional latest-observation fetch.
///
/// Not-modified and rate-limited are expected outcomes, not errors — the
/// scheduler dispatches on them. Hard failures (5xx, timeouts, bad JSON)
/// surface as `Err(StationError)` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum LatestFetch {
    /// 304: the cached ETag is still valid; nothing new upstream.
    NotModified,
    /// 429: back off for the given number of seconds and retry.
    RateLimited { retry_after_secs: u64 },
    /// 200: a (possibly) new observation. `etag` is the response entity
    /// tag when the server sent one; callers keep their previous token
    /// otherwise.
    New {
        timestamp: DateTime<Utc>,
        etag: Option<String>,
    },
}

// ============================================================================
// API Client Functions
// ============================================================================

/// URL of the latest-observation endpoint for a station.
pub fn latest_url(station_id: &str) -> String {
    format!("{}/stations/{}/observations/latest", NWS_BASE_URL, station_id)
}

/// URL of the recent-observations endpoint for a station.
pub fn recent_url(station_id: &str, limit: u32) -> String {
    format!("{}/stations/{}/observations?limit={}", NWS_BASE_URL, station_id, limit)
}

/// Conditionally fetch the latest observation for a station.
///
/// Sends `If-None-Match` when an ETag from a previous 200 is available.
/// Distinguishes 304 (not modified) and 429 (rate limited, with the
/// server's Retry-After hint or a 60s default) from hard errors.
pub fn fetch_latest(
    client: &reqwest::blocking::Client,
    station_id: &str,
    etag: Option<&str>,
) -> Result<LatestFetch, StationError> {
    let mut request = client.get(latest_url(station_id));
    if let Some(tag) = etag {
        request = request.header(IF_NONE_MATCH, tag);
    }
    let response = request.send()?;

    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            Ok(LatestFetch::RateLimited { retry_after_secs })
        }
        StatusCode::NOT_MODIFIED => Ok(LatestFetch::NotModified),
        status if !status.is_success() => Err(StationError::HttpError(status.as_u16())),
        _ => {
            let new_etag = response
                .headers()
                .get(ETAG)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let body = response.text()?;
            let observation = parse_latest_body(&body)?;
            Ok(LatestFetch::New {
                timestamp: observation.timestamp,
                etag: new_etag,
            })
        }
    }
}

/// Fetch the recent-observations window for a station, bounded to the most
/// recent `limit` readings. Unconditional; any non-2xx is a hard error.
pub fn fetch_recent(
    client: &reqwest::blocking::Client,
    station_id: &str,
    limit: u32,
) -> Result<Vec<Observation>, StationError> {
    let response = client.get(recent_url(station_id, limit)).send()?;

    if !response.status().is_success() {
        return Err(StationError::HttpError(response.status().as_u16()));
    }

    let body = response.text()?;
    parse_recent_body(&body)
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse a latest-observation body into our format.
pub fn parse_latest_body(body: &str) -> Result<Observation, StationError> {
    let response: LatestResponse = serde_json::from_str(body)?;
    Ok(Observation {
        timestamp: response.properties.timestamp,
        temperature_c: response.properties.temperature.value,
    })
}

/// Parse a recent-observations body. The API returns the window newest
/// first; that order is preserved.
pub fn parse_recent_body(body: &str) -> Result<Vec<Observation>, StationError> {
    let response: RecentResponse = serde_json::from_str(body)?;
    Ok(response
        .features
        .into_iter()
        .map(|feature| Observation {
            timestamp: feature.properties.timestamp,
            temperature_c: feature.properties.temperature.value,
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
