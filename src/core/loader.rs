//! Loader message queue and the capped log it feeds.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::error::{XtuiError, XtuiResult};

pub const DEFAULT_MAX_MESSAGES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Success,
    Warning,
    Info,
}

impl Severity {
    /// Markers are checked in a fixed order: error, success, warning.
    pub fn classify(text: &str) -> Self {
        if text.contains("Error: ") {
            Severity::Error
        } else if text.contains("Success: ") {
            Severity::Success
        } else if text.contains("Warning: ") {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl FromStr for Severity {
    type Err = XtuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "success" => Ok(Severity::Success),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(XtuiError::InvalidInput(format!("unknown severity: {}", other))),
        }
    }
}

/// One item on the loader queue. Closing the queue ends the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    Content(String),
    Progress { current: u64, total: u64, label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderExit {
    Completed,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub severity: Severity,
}

/// Append-only log that drops its oldest entries past `capacity`.
#[derive(Debug, Clone)]
pub struct LoaderLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    progress: Option<(u64, u64, String)>,
}

impl LoaderLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            progress: None,
        }
    }

    pub fn apply(&mut self, event: LoaderEvent) {
        match event {
            LoaderEvent::Content(text) => self.push(text),
            LoaderEvent::Progress { current, total, label } => {
                self.progress = Some((current.min(total), total, label));
            }
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            severity: Severity::classify(&text),
            text,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ratio in `[0, 1]` plus the label of the latest progress event.
    pub fn progress(&self) -> Option<(f64, &str)> {
        self.progress.as_ref().map(|(current, total, label)| {
            let ratio = if *total == 0 {
                1.0
            } else {
                *current as f64 / *total as f64
            };
            (ratio, label.as_str())
        })
    }
}

impl Default for LoaderLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

/// Producer side of the loader queue.
#[derive(Debug, Clone)]
pub struct LoaderHandle {
    tx: mpsc::Sender<LoaderEvent>,
}

/// Consumer side, owned by the loader screen.
#[derive(Debug)]
pub struct LoaderInbox {
    rx: mpsc::Receiver<LoaderEvent>,
}

/// Bounded, ordered queue between a producer task and the loader screen.
pub fn channel(capacity: usize) -> (LoaderHandle, LoaderInbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (LoaderHandle { tx }, LoaderInbox { rx })
}

impl LoaderHandle {
    /// Waits for queue space. Fails only once the screen is gone.
    pub async fn send(&self, event: LoaderEvent) -> XtuiResult<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| XtuiError::InvalidInput("loader screen is no longer receiving".to_string()))
    }

    pub async fn message(&self, text: impl Into<String>) -> XtuiResult<()> {
        self.send(LoaderEvent::Content(text.into())).await
    }

    pub async fn progress(&self, current: u64, total: u64, label: impl Into<String>) -> XtuiResult<()> {
        self.send(LoaderEvent::Progress {
            current,
            total,
            label: label.into(),
        })
        .await
    }

    /// Send `messages` in order, `delay` apart, then close the queue.
    /// With `progress`, each message is followed by a count of how many were sent.
    pub async fn feed(self, messages: Vec<String>, delay: Duration, progress: bool) -> XtuiResult<()> {
        let total = messages.len() as u64;
        for (index, message) in messages.into_iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.message(message).await?;
            if progress {
                self.progress(index as u64 + 1, total, "messages").await?;
            }
        }
        self.close();
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Consume the handle. The screen completes once every clone is closed
    /// and the queue has drained.
    pub fn close(self) {
        debug!("Loader queue closed by producer");
        drop(self.tx);
    }
}

impl LoaderInbox {
    /// Next event in arrival order, or `None` once the queue is closed and drained.
    pub async fn recv(&mut self) -> Option<LoaderEvent> {
        self.rx.recv().await
    }

    /// Stop accepting new events; already queued events remain readable.
    pub fn shutdown(&mut self) {
        self.rx.close();
    }

    pub fn into_receiver(self) -> mpsc::Receiver<LoaderEvent> {
        self.rx
    }
}

/// Named spinner frame sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinnerKind {
    #[default]
    Dots,
    Line,
    Arc,
    Bounce,
}

impl SpinnerKind {
    pub fn frames(&self) -> &'static [&'static str] {
        match self {
            SpinnerKind::Dots => &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
            SpinnerKind::Line => &["|", "/", "-", "\\"],
            SpinnerKind::Arc => &["◜", "◠", "◝", "◞", "◡", "◟"],
            SpinnerKind::Bounce => &["⠁", "⠂", "⠄", "⠂"],
        }
    }

    pub fn frame(&self, tick: usize) -> &'static str {
        let frames = self.frames();
        frames[tick % frames.len()]
    }
}

impl FromStr for SpinnerKind {
    type Err = XtuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dots" | "dot" => Ok(SpinnerKind::Dots),
            "line" => Ok(SpinnerKind::Line),
            "arc" => Ok(SpinnerKind::Arc),
            "bounce" => Ok(SpinnerKind::Bounce),
            other => Err(XtuiError::InvalidInput(format!("unknown spinner: {}", other))),
        }
    }
}

impl fmt::Display for SpinnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpinnerKind::Dots => "dots",
            SpinnerKind::Line => "line",
            SpinnerKind::Arc => "arc",
            SpinnerKind::Bounce => "bounce",
        };
        write!(f, "{}", name)
    }
}
