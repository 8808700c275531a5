//! Station high-temperature watcher.
//!
//! Polls an NWS station's observation feed (api.weather.gov), detects new
//! observations, tracks the running maximum temperature, and appends each
//! new high to a durable note file. On restart the last recorded high is
//! recovered from that file.
//!
//! The loop is polite to the upstream API: the latest-observation endpoint
//! is fetched conditionally with an ETag, 429 responses are honored via
//! Retry-After, and polling is denser only around the station's typical
//! reporting window.

pub mod config;
pub mod detect;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod scheduler;
pub mod store;
