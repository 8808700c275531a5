/// Integration tests for watermark recovery across process restarts.
///
/// These tests exercise the store + detection pipeline end-to-end without
/// any network access: a first "process" records highs and exits, a second
/// one recovers the watermark from the note file and must not re-append a
/// duplicate record until a genuinely higher reading arrives.

use chrono::{DateTime, TimeZone, Utc};

use tempmon_service::detect;
use tempmon_service::model::Observation;
use tempmon_service::scheduler::PollState;
use tempmon_service::store::NoteStore;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 14, hour, 51, 0).unwrap()
}

fn obs_f(fahrenheit: f64, hour: u32) -> Observation {
    Observation {
        timestamp: at(hour),
        temperature_c: Some((fahrenheit - 32.0) * 5.0 / 9.0),
    }
}

/// Replays a fetched window against the store the way run_cycle does.
fn apply_window(store: &NoteStore, state: &mut PollState, window: &[Observation]) -> usize {
    let new_highs = detect::find_new_highs(window, state.high_f);
    for high in &new_highs {
        store.append_high(high.value_f, high.observed_at).expect("append should succeed");
        state.high_f = high.value_f;
    }
    new_highs.len()
}

#[test]
fn test_restart_recovers_watermark_and_suppresses_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daily_high.txt");

    // First process: records 75.2 and exits.
    {
        let store = NoteStore::new(&path, "KNYC (Central Park)");
        store.ensure_header().unwrap();
        let mut state = PollState::recover(&store);
        assert_eq!(state.high_f, f64::NEG_INFINITY);

        let appended = apply_window(&store, &mut state, &[obs_f(75.2, 14)]);
        assert_eq!(appended, 1);
    }

    // Second process: recovers 75.2 from the file.
    let store = NoteStore::new(&path, "KNYC (Central Park)");
    store.ensure_header().unwrap();
    let mut state = PollState::recover(&store);
    assert_eq!(state.high_f, 75.2);

    // The same reading comes around again — no duplicate record.
    let appended = apply_window(&store, &mut state, &[obs_f(75.2, 14)]);
    assert_eq!(appended, 0, "recovered watermark must suppress the old high");

    // A genuinely higher reading is recorded.
    let appended = apply_window(&store, &mut state, &[obs_f(76.0, 15)]);
    assert_eq!(appended, 1);
    assert_eq!(state.high_f, 76.0);

    // The file now holds exactly two data lines, in order.
    let contents = std::fs::read_to_string(&path).unwrap();
    let data_lines: Vec<&str> = contents.lines().skip(3).collect();
    assert_eq!(data_lines.len(), 2);
    assert!(data_lines[0].starts_with("75.2 °F"));
    assert!(data_lines[1].starts_with("76.0 °F"));
}

#[test]
fn test_watermark_survives_corrupted_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daily_high.txt");

    {
        let store = NoteStore::new(&path, "KNYC (Central Park)");
        store.ensure_header().unwrap();
        let mut state = PollState::recover(&store);
        apply_window(&store, &mut state, &[obs_f(71.5, 14)]);
    }

    // A crash mid-append leaves a torn line at the end of the file.
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "7").unwrap();
    drop(file);

    let store = NoteStore::new(&path, "KNYC (Central Park)");
    let state = PollState::recover(&store);
    // "7" alone parses as a value; the last parseable line wins. The
    // watermark only ever moves up from here, so a torn low value costs at
    // most one re-logged high, never a lost one.
    assert!(state.high_f.is_finite(), "recovery must not fail on a torn line");
}

#[test]
fn test_multi_day_run_is_monotonic_without_rollover() {
    // No day-rollover by design: a cooler second day appends nothing, and
    // the recovered value is still the all-time high.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daily_high.txt");

    let store = NoteStore::new(&path, "KNYC (Central Park)");
    store.ensure_header().unwrap();
    let mut state = PollState::recover(&store);

    // Day one: warm.
    apply_window(&store, &mut state, &[obs_f(80.0, 14), obs_f(84.0, 15)]);
    assert_eq!(state.high_f, 84.0);

    // Day two (simulated by a restart): cooler throughout.
    let mut state = PollState::recover(&store);
    assert_eq!(state.high_f, 84.0);
    let appended = apply_window(&store, &mut state, &[obs_f(70.0, 14), obs_f(72.0, 15)]);
    assert_eq!(appended, 0, "cooler day must not append below the all-time high");
    assert_eq!(store.read_last_high(), 84.0);
}
