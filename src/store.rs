/// Append-only note file of high-temperature records.
///
/// The note file is the durability mechanism: every new high is appended and
/// synced before the in-memory watermark is considered updated, and restart
/// recovery re-reads the last recorded value from it. The running process
/// never truncates or rewrites the file.
///
/// There is deliberately no day-rollover — the recorded value is monotonic
/// for the lifetime of the file, so it behaves as an all-time high across
/// restarts. Start a fresh file to start a fresh record.

use chrono::{DateTime, Local, Utc};
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::logging::{self, Source};

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// Classification of a single note-file line during recovery.
///
/// Recovery must never fail: header, separator, and blank lines are
/// expected structure; anything whose leading token parses as a number is
/// data; everything else is malformed and skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Header, separator, or blank line — expected non-data structure.
    Header,
    /// A data line; carries the recorded value in Fahrenheit.
    Data(f64),
    /// An unrecognized line, skipped during recovery.
    Malformed,
}

/// Classifies one line of the note file.
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty()
        || trimmed.starts_with("Highest")
        || trimmed.starts_with("Format")
        || trimmed.starts_with("---")
    {
        return LineKind::Header;
    }
    match trimmed.split_whitespace().next().and_then(|tok| tok.parse::<f64>().ok()) {
        Some(value) => LineKind::Data(value),
        None => LineKind::Malformed,
    }
}

// ---------------------------------------------------------------------------
// Note store
// ---------------------------------------------------------------------------

/// The append-only high-watermark store backed by a plain-text note file.
pub struct NoteStore {
    path: PathBuf,
    station_label: String,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>, station_label: impl Into<String>) -> Self {
        NoteStore {
            path: path.into(),
            station_label: station_label.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the note file with its fixed 3-line header if it does not
    /// exist yet. Idempotent: an existing file is left untouched, whatever
    /// it contains.
    pub fn ensure_header(&self) -> io::Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&self.path)?;
        writeln!(file, "Highest temperatures observed at {}", self.station_label)?;
        writeln!(file, "Format: <temp °F>  (observed YYYY-MM-DD HH:MM:SS TZ)")?;
        writeln!(file, "-----------------------------------------------------")?;
        Ok(())
    }

    /// Returns the last recorded high from the note file, or negative
    /// infinity if the file is absent or contains no parseable data line.
    ///
    /// Last parseable line wins — not the maximum. The file is written
    /// monotonically, so under normal operation they coincide; after manual
    /// edits the trailing value is authoritative. This function never fails:
    /// malformed lines are skipped, and any I/O problem degrades to "no
    /// known high" so the process can always start.
    pub fn read_last_high(&self) -> f64 {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return f64::NEG_INFINITY,
        };
        let mut last = f64::NEG_INFINITY;
        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break, // unreadable tail; keep what we have
            };
            match classify_line(&line) {
                LineKind::Data(value) => last = value,
                LineKind::Header => {}
                LineKind::Malformed => {
                    logging::debug(
                        Source::Note,
                        None,
                        &format!("skipping malformed note line: {:?}", line),
                    );
                }
            }
        }
        last
    }

    /// Appends one high-temperature record and syncs it to disk before
    /// returning. Also emits a console notice with the new value and the
    /// local observation time.
    pub fn append_high(&self, value_f: f64, observed_at: DateTime<Utc>) -> io::Result<()> {
        let observed_local = observed_at.with_timezone(&Local);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{:.1} °F  (observed {})",
            value_f,
            observed_local.format("%Y-%m-%d %H:%M:%S %Z")
        )?;
        file.sync_all()?;

        logging::info(
            Source::Note,
            None,
            &format!(
                "NEW HIGH {:.1}°F  ({} local)",
                value_f,
                observed_local.format("%H:%M:%S")
            ),
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
