//! Grammar of the server's push messages and the rolling diagnostic log.

use std::collections::VecDeque;

use regex::Regex;

/// Keep-alive messages carry this marker; they are dropped without a trace.
pub const HEARTBEAT_MARKER: &str = "Heartbeat ";
/// Detail lines belonging to the previous message start with this prefix.
pub const CONTINUATION_PREFIX: &str = " - ";

const REFETCH_MARKERS: [&str; 3] = ["Download finished", "Generate thumbnails finished", " 0.0% complete"];

lazy_static::lazy_static! {
    static ref PERCENT_RE: Regex = Regex::new(r"(\d+\.\d+)% complete").expect("valid percent regex");
    static ref DOWNLOADING_RE: Regex = Regex::new(r"Downloading\.\.\.\[(\d+)\]").expect("valid downloading regex");
    static ref FAILED_RE: Regex = Regex::new(r"Download failed \[(\d+)\]").expect("valid failed regex");
}

/// What one push message means for the client state.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    Heartbeat,
    /// Detail of the previous line: logged, not interpreted.
    Continuation,
    Status(StatusUpdate),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    /// `(job id, percent)` from a `Downloading...[ID]` line; percent 0 when the line has none.
    pub progress: Option<(String, f64)>,
    /// Job id of a `Download failed [ID]` line.
    pub failed: Option<String>,
    /// The file list changed on the server.
    pub refetch: bool,
}

impl PushMessage {
    pub fn parse(text: &str) -> Self {
        if text.contains(HEARTBEAT_MARKER) {
            return PushMessage::Heartbeat;
        }
        if text.starts_with(CONTINUATION_PREFIX) {
            return PushMessage::Continuation;
        }
        PushMessage::Status(StatusUpdate::parse(text))
    }

    /// Whether the message belongs in the diagnostic log.
    pub fn is_logged(&self) -> bool {
        !matches!(self, PushMessage::Heartbeat)
    }
}

impl StatusUpdate {
    pub fn parse(text: &str) -> Self {
        let percent = PERCENT_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());
        let progress = DOWNLOADING_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|id| (id.as_str().to_string(), percent.unwrap_or(0.0)));
        let failed = FAILED_RE.captures(text).and_then(|c| c.get(1)).map(|id| id.as_str().to_string());
        let refetch = REFETCH_MARKERS.iter().any(|m| text.contains(m));
        Self { progress, failed, refetch }
    }

    pub fn is_empty(&self) -> bool {
        self.progress.is_none() && self.failed.is_none() && !self.refetch
    }
}

/// Most-recent-first log of accepted messages, capped; the oldest entry falls off.
#[derive(Debug, Clone)]
pub struct PushLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl PushLog {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity.min(1024)), capacity: capacity.max(1) }
    }

    /// Prefixes the local wall-clock time, e.g. `"14:03:07: Download finished"`.
    pub fn push(&mut self, text: &str) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.push_raw(format!("{}: {}", stamp, text));
    }

    pub fn push_raw(&mut self, line: String) {
        self.entries.push_front(line);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The whole feed as shown to the user, newest line first.
    pub fn render(&self) -> String {
        self.entries.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}
