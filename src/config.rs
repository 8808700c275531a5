/// Service configuration, loaded from `station.toml`.
///
/// Every field has a built-in default matching the KNYC (Central Park)
/// deployment, so the service runs with no config file at all. Externalizing
/// these values does not change core behavior — the poll loop only ever sees
/// a `Config` by reference.

use serde::Deserialize;
use std::error::Error;
use std::path::Path;

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "station.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// NWS station identifier, e.g. "KNYC".
    pub station_id: String,
    /// Human-readable station name, used in the note file header.
    pub station_name: String,
    /// Path of the append-only note file.
    pub note_path: String,
    /// Contact string sent in the User-Agent header. api.weather.gov asks
    /// clients to identify themselves with a way to reach the operator.
    pub contact: String,
    /// How many recent observations to request when a new timestamp appears.
    pub recent_limit: u32,
    /// Per-request timeout, seconds.
    pub request_timeout_secs: u64,
    /// Cadence sleep near the top of the hour, seconds.
    pub fast_poll_secs: u64,
    /// Cadence sleep mid-hour, seconds.
    pub slow_poll_secs: u64,
    /// Sleep after an unexpected cycle failure, seconds.
    pub recovery_sleep_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            station_id: "KNYC".to_string(),
            station_name: "Central Park".to_string(),
            note_path: "daily_high.txt".to_string(),
            contact: "tempmon_service (contact: ops@example.com)".to_string(),
            recent_limit: 6,
            request_timeout_secs: 6,
            fast_poll_secs: 10,
            slow_poll_secs: 30,
            recovery_sleep_secs: 60,
        }
    }
}

impl Config {
    /// The User-Agent value for all api.weather.gov requests.
    pub fn user_agent(&self) -> &str {
        &self.contact
    }

    /// Station label for the note file header, e.g. "KNYC (Central Park)".
    pub fn station_label(&self) -> String {
        format!("{} ({})", self.station_id, self.station_name)
    }
}

/// Loads configuration from a TOML file.
pub fn load(path: &Path) -> Result<Config, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

/// Loads configuration, falling back to defaults if the file is absent.
///
/// A missing file is normal (defaults apply); an unreadable or invalid file
/// is reported to the caller so a typo does not silently revert the service
/// to defaults.
pub fn load_or_default(path: &Path) -> Result<Config, Box<dyn Error>> {
    if path.exists() {
        load(path)
    } else {
        Ok(Config::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_knyc_deployment() {
        let cfg = Config::default();
        assert_eq!(cfg.station_id, "KNYC");
        assert_eq!(cfg.recent_limit, 6);
        assert_eq!(cfg.request_timeout_secs, 6);
        assert_eq!(cfg.fast_poll_secs, 10);
        assert_eq!(cfg.slow_poll_secs, 30);
        assert_eq!(cfg.recovery_sleep_secs, 60);
    }

    #[test]
    fn test_partial_toml_keeps_defaults_for_missing_fields() {
        let cfg: Config = toml::from_str(r#"station_id = "KBOS""#).unwrap();
        assert_eq!(cfg.station_id, "KBOS");
        assert_eq!(cfg.slow_poll_secs, 30, "unset fields should keep defaults");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<Config, _> = toml::from_str("statoin_id = \"KNYC\"");
        assert!(result.is_err(), "typo'd field name should not be silently ignored");
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let cfg = load_or_default(Path::new("/nonexistent/station.toml")).unwrap();
        assert_eq!(cfg.station_id, "KNYC");
    }

    #[test]
    fn test_load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "station_id = \"KPIA\"").unwrap();
        writeln!(f, "note_path = \"/tmp/highs.txt\"").unwrap();

        let cfg = load(&path).unwrap();
        assert_eq!(cfg.station_id, "KPIA");
        assert_eq!(cfg.note_path, "/tmp/highs.txt");
    }

    #[test]
    fn test_station_label_format() {
        let cfg = Config::default();
        assert_eq!(cfg.station_label(), "KNYC (Central Park)");
    }
}
