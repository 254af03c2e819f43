//! Import and chunking progress reporting.
//!
//! Progress is emitted on **stderr** so stdout stays parseable for scripts.
//! The human format rewrites a single line (`\r`) the way a long batch run
//! over tens of thousands of books wants it; JSON mode prints one object
//! per line.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Books stored so far. Total unknown while the mirror is being walked.
    Importing { n: u64 },
    /// Documents processed out of total.
    Chunking { n: u64, total: u64 },
    /// The current phase is over; human output ends its line.
    Finished,
}

/// Reports progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: `chunking  1,234 / 5,000 documents`.
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Importing { n } => {
                format!("\rimporting  {} books", format_number(*n))
            }
            ProgressEvent::Chunking { n, total } => format!(
                "\rchunking  {} / {} documents",
                format_number(*n),
                format_number(*total)
            ),
            ProgressEvent::Finished => "\n".to_string(),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Importing { n } => serde_json::json!({
                "event": "progress",
                "phase": "importing",
                "n": n
            }),
            ProgressEvent::Chunking { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "chunking",
                "n": n,
                "total": total
            }),
            ProgressEvent::Finished => return,
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    /// Human progress when stderr is a TTY, otherwise off.
    Auto,
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Resolve `Auto` against the current stderr.
    pub fn resolve(self) -> Self {
        match self {
            ProgressMode::Auto if atty::is(atty::Stream::Stderr) => ProgressMode::Human,
            ProgressMode::Auto => ProgressMode::Off,
            other => other,
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self.resolve() {
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
            ProgressMode::Auto | ProgressMode::Off => Box::new(NoProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(57_123), "57,123");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn explicit_modes_resolve_to_themselves() {
        assert_eq!(ProgressMode::Off.resolve(), ProgressMode::Off);
        assert_eq!(ProgressMode::Json.resolve(), ProgressMode::Json);
        assert_ne!(ProgressMode::Auto.resolve(), ProgressMode::Auto);
    }
}
