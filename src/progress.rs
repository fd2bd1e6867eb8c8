//! Build progress reporting.
//!
//! Reports observable progress during `corpus build` so users see which
//! repository/version is being fetched and how many documents remain.
//! Progress is emitted on **stderr** so stdout stays reserved for the
//! run summary.

use std::io::Write;

/// A single progress event for one repository/version pass.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// The checkout is being fetched. Total unknown.
    Fetching { label: String },
    /// Discovery finished with this many candidate documents.
    Discovered { label: String, total: u64 },
    /// `n` documents processed out of `total`.
    Converting { label: String, n: u64, total: u64 },
}

/// Reports build progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "tokio/v1.0  converting  12 / 340 files".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Fetching { label } => format!("{}  fetching...\n", label),
            ProgressEvent::Discovered { label, total } => {
                format!("{}  discovered  {} files\n", label, format_number(*total))
            }
            ProgressEvent::Converting { label, n, total } => format!(
                "{}  converting  {} / {} files\n",
                label,
                format_number(*n),
                format_number(*total)
            ),
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
            ProgressEvent::Fetching { label } => serde_json::json!({
                "event": "progress",
                "target": label,
                "phase": "fetching"
            }),
            ProgressEvent::Discovered { label, total } => serde_json::json!({
                "event": "progress",
                "target": label,
                "phase": "discovered",
                "total": total
            }),
            ProgressEvent::Converting { label, n, total } => serde_json::json!({
                "event": "progress",
                "target": label,
                "phase": "converting",
                "n": n,
                "total": total
            }),
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
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
