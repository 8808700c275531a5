use std::error::Error;
use std::path::Path;
use std::time::Duration;

use tempmon_service::config;
use tempmon_service::logging::{self, LogLevel, Source};
use tempmon_service::scheduler::{self, PollState};
use tempmon_service::store::NoteStore;

fn main() {
    logging::init_logger(LogLevel::Info, None);
    if let Err(e) = run() {
        logging::error(Source::System, None, &format!("startup failed: {}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = config::load_or_default(Path::new(config::DEFAULT_CONFIG_PATH))?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let store = NoteStore::new(&config.note_path, config.station_label());
    store.ensure_header()?;

    let state = PollState::recover(&store);
    if state.high_f.is_finite() {
        logging::info(
            Source::System,
            Some(&config.station_id),
            &format!("Starting watcher; recovered high {:.1}°F from {}", state.high_f, config.note_path),
        );
    } else {
        logging::info(
            Source::System,
            Some(&config.station_id),
            &format!("Starting watcher; no prior high in {}", config.note_path),
        );
    }

    scheduler::run_loop(&client, &config, &store, state)
}
