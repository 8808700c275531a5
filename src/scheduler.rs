/// Poll scheduler: the unbounded fetch → detect → sleep loop.
///
/// Each pass through the loop is one *cycle*. A cycle produces either a
/// `CycleOutcome` or an error, and the loop dispatches on that result to
/// pick the next sleep: the server's Retry-After hint when rate limited, a
/// fixed recovery interval on failure, and the normal cadence otherwise.
/// The loop never terminates on error — failures surface as log lines and
/// the loop self-heals.
///
/// # Clock injection
/// Cadence decisions accept a `now` parameter rather than calling
/// `Local::now()` internally, keeping them deterministic in tests.

use chrono::{DateTime, Local, Timelike, Utc};
use std::error::Error;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::detect;
use crate::ingest::nws::{self, LatestFetch};
use crate::logging::{self, Source};
use crate::store::NoteStore;

// ---------------------------------------------------------------------------
// Loop state
// ---------------------------------------------------------------------------

/// Mutable loop state, threaded explicitly through each cycle.
///
/// Only `high_f` is durable (backed by the note file); the cache token and
/// seen timestamp are in-memory and lost on restart, which at worst costs
/// one redundant detail fetch after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    /// ETag from the last 200 latest-observation response.
    pub etag: Option<String>,
    /// Timestamp of the last latest-observation payload already processed.
    pub seen_timestamp: Option<DateTime<Utc>>,
    /// Current high watermark in Fahrenheit; NEG_INFINITY when no record
    /// exists yet.
    pub high_f: f64,
}

impl PollState {
    /// State for a fresh process, recovering the watermark from the store.
    pub fn recover(store: &NoteStore) -> Self {
        PollState {
            etag: None,
            seen_timestamp: None,
            high_f: store.read_last_high(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle results
// ---------------------------------------------------------------------------

/// What one poll cycle accomplished. The loop dispatches on this to pick
/// the next sleep.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A new observation arrived and `n` new highs were recorded.
    NewHighs(usize),
    /// A new observation arrived but nothing exceeded the watermark.
    NoNewHighs,
    /// 200 response, but the observation timestamp was already processed.
    Unchanged,
    /// 304: the cached ETag is still valid.
    NotModified,
    /// 429: retry the same cycle after this many seconds.
    RateLimited(u64),
}

/// How a latest-observation fetch result advances the loop state.
///
/// Pure state transition, separated from I/O so the suppression rules are
/// directly testable: only a 200 may replace the cache token, and a
/// rate-limit or not-modified response must leave the state untouched so
/// the retried cycle is identical.
#[derive(Debug, Clone, PartialEq)]
pub enum LatestDisposition {
    /// Back off and retry; state unchanged.
    Backoff(u64),
    /// Nothing new upstream; state unchanged.
    NothingNew,
    /// Same observation timestamp as last cycle; detail fetch suppressed.
    AlreadySeen,
    /// A genuinely new observation timestamp; fetch the recent window.
    Fresh(DateTime<Utc>),
}

/// Applies a latest-observation fetch result to the loop state.
pub fn apply_latest(latest: LatestFetch, state: &mut PollState) -> LatestDisposition {
    match latest {
        LatestFetch::RateLimited { retry_after_secs } => LatestDisposition::Backoff(retry_after_secs),
        LatestFetch::NotModified => LatestDisposition::NothingNew,
        LatestFetch::New { timestamp, etag } => {
            // Keep the previous token when the server omits the header.
            if let Some(tag) = etag {
                state.etag = Some(tag);
            }
            if state.seen_timestamp == Some(timestamp) {
                LatestDisposition::AlreadySeen
            } else {
                LatestDisposition::Fresh(timestamp)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// One cycle
// ---------------------------------------------------------------------------

/// Runs one poll cycle: conditional latest fetch, and on a genuinely new
/// observation timestamp, the recent-window fetch plus exceedance
/// detection, persisting each new high in window order.
///
/// The seen timestamp advances only after the window has been fetched and
/// all new highs persisted, so a failed detail fetch is retried next cycle.
pub fn run_cycle(
    client: &reqwest::blocking::Client,
    config: &Config,
    store: &NoteStore,
    state: &mut PollState,
) -> Result<CycleOutcome, Box<dyn Error>> {
    let latest = nws::fetch_latest(client, &config.station_id, state.etag.as_deref())?;

    let timestamp = match apply_latest(latest, state) {
        LatestDisposition::Backoff(secs) => return Ok(CycleOutcome::RateLimited(secs)),
        LatestDisposition::NothingNew => return Ok(CycleOutcome::NotModified),
        LatestDisposition::AlreadySeen => return Ok(CycleOutcome::Unchanged),
        LatestDisposition::Fresh(timestamp) => timestamp,
    };

    let window = nws::fetch_recent(client, &config.station_id, config.recent_limit)?;
    let new_highs = detect::find_new_highs(&window, state.high_f);
    for high in &new_highs {
        store.append_high(high.value_f, high.observed_at)?;
        state.high_f = high.value_f;
    }
    state.seen_timestamp = Some(timestamp);

    if new_highs.is_empty() {
        Ok(CycleOutcome::NoNewHighs)
    } else {
        Ok(CycleOutcome::NewHighs(new_highs.len()))
    }
}

// ---------------------------------------------------------------------------
// Sleep cadence
// ---------------------------------------------------------------------------

/// Normal cadence sleep: poll faster near the typical posting window
/// (the last and first ~10 minutes of the hour), slower otherwise.
pub fn cadence_delay(config: &Config, now: DateTime<Local>) -> Duration {
    let minute = now.minute();
    if minute >= 50 || minute <= 10 {
        Duration::from_secs(config.fast_poll_secs)
    } else {
        Duration::from_secs(config.slow_poll_secs)
    }
}

/// Sleep to take after a completed cycle.
pub fn delay_for(outcome: &CycleOutcome, config: &Config, now: DateTime<Local>) -> Duration {
    match outcome {
        CycleOutcome::RateLimited(secs) => Duration::from_secs(*secs),
        _ => cadence_delay(config, now),
    }
}

// ---------------------------------------------------------------------------
// The loop
// ---------------------------------------------------------------------------

/// Runs the poll loop forever. Returns only by process termination.
pub fn run_loop(
    client: &reqwest::blocking::Client,
    config: &Config,
    store: &NoteStore,
    mut state: PollState,
) -> ! {
    loop {
        let delay = match run_cycle(client, config, store, &mut state) {
            Ok(outcome) => {
                match &outcome {
                    CycleOutcome::NewHighs(n) => {
                        logging::info(
                            Source::System,
                            Some(&config.station_id),
                            &format!("{} new high(s) recorded", n),
                        );
                    }
                    CycleOutcome::RateLimited(secs) => {
                        logging::info(
                            Source::Nws,
                            Some(&config.station_id),
                            &format!("Rate limited - backing off {}s", secs),
                        );
                    }
                    CycleOutcome::NoNewHighs | CycleOutcome::Unchanged | CycleOutcome::NotModified => {
                        logging::debug(
                            Source::System,
                            Some(&config.station_id),
                            &format!("cycle complete: {:?}", outcome),
                        );
                    }
                }
                delay_for(&outcome, config, Local::now())
            }
            Err(err) => {
                logging::log_fetch_failure(&config.station_id, "poll cycle", err.as_ref());
                Duration::from_secs(config.recovery_sleep_secs)
            }
        };
        thread::sleep(delay);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
