//! High-temperature exceedance detection.
//!
//! Given the current watermark and a freshly fetched observation window,
//! decide which observations warrant a new record. Every intermediate new
//! high is recorded, not just the window maximum — the note file is a log
//! of record-setting moments, and two exceedances in one window are two
//! moments.

use crate::model::{HighWatermark, Observation, celsius_to_fahrenheit};

/// Scans a window in its natural order and returns each observation that
/// strictly exceeds the running watermark, as the watermark it establishes.
///
/// Observations with no temperature value are skipped. The returned
/// sequence is ordered and strictly increasing in value; the last entry
/// (if any) is the window's true maximum. A later lower value never
/// re-triggers: `watermark 70.0` against `[69.0, 72.0, 71.0]` yields
/// exactly one new record at `72.0`.
pub fn find_new_highs(window: &[Observation], current_high_f: f64) -> Vec<HighWatermark> {
    let mut high = current_high_f;
    let mut new_highs = Vec::new();

    for obs in window {
        if let Some(value_f) = celsius_to_fahrenheit(obs.temperature_c) {
            if value_f > high {
                high = value_f;
                new_highs.push(HighWatermark {
                    value_f,
                    observed_at: obs.timestamp,
                });
            }
        }
    }

    new_highs
}
