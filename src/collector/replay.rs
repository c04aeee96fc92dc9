//! Replay collector: feeds recorded key events into a session.
//!
//! Input is JSON lines, one [`KeyEvent`] per line:
//!
//! ```text
//! {"kind":"press","key":{"char":"a"}}
//! {"kind":"release","key":{"char":"a"}}
//! {"timestamp":"2024-03-01T10:00:02Z","kind":"release","key":{"name":"esc"}}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Lines that do not
//! decode are logged and skipped. The channel disconnects once the input is
//! exhausted.

use crate::collector::types::KeyEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Collector settings.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Number of decoded events buffered ahead of the tracker
    pub channel_capacity: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 10_000,
        }
    }
}

/// Errors that can occur while starting collection.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    /// The input was already consumed by an earlier run
    SourceConsumed,
    SpawnFailed(String),
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::SourceConsumed => write!(f, "Replay input has already been consumed"),
            CollectorError::SpawnFailed(e) => write!(f, "Failed to spawn reader thread: {e}"),
        }
    }
}

impl std::error::Error for CollectorError {}

type Source = Box<dyn BufRead + Send>;

/// Reads key events from a line-oriented source on a background thread.
pub struct ReplayCollector {
    config: CollectorConfig,
    source: Option<Source>,
    sender: Option<Sender<KeyEvent>>,
    receiver: Receiver<KeyEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReplayCollector {
    /// Create a collector over any buffered reader.
    pub fn new<R>(config: CollectorConfig, source: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (sender, receiver) = bounded(config.channel_capacity.max(1));
        Self {
            config,
            source: Some(Box::new(source)),
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Create a collector reading from a file.
    pub fn from_path(config: CollectorConfig, path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(config, BufReader::new(file)))
    }

    /// Create a collector reading from standard input.
    pub fn stdin(config: CollectorConfig) -> Self {
        Self::new(config, BufReader::new(io::stdin()))
    }

    /// Start reading events.
    ///
    /// A replay collector can only be started once: the reader thread owns
    /// the input and the only sender, so the channel disconnects when the
    /// input runs out.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }

        let (source, sender) = match (self.source.take(), self.sender.take()) {
            (Some(source), Some(sender)) => (source, sender),
            _ => return Err(CollectorError::SourceConsumed),
        };

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = thread::Builder::new()
            .name("keyheat-replay".to_string())
            .spawn(move || {
                read_events(source, &sender, &running);
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                CollectorError::SpawnFailed(e.to_string())
            })?;

        tracing::debug!(
            capacity = self.config.channel_capacity,
            "replay collector started"
        );
        self.handle = Some(handle);
        Ok(())
    }

    /// Ask the reader thread to stop after the line it is currently on.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the reader thread is still producing events.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for key events.
    pub fn receiver(&self) -> &Receiver<KeyEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<KeyEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the reader thread to finish.
    ///
    /// Only call this once the receiver is being drained or has been
    /// dropped, otherwise a full channel keeps the reader blocked.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("replay reader thread panicked");
            }
        }
    }
}

impl Drop for ReplayCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_events(source: Source, sender: &Sender<KeyEvent>, running: &AtomicBool) {
    for (index, line) in source.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            tracing::debug!("replay stopped before end of input");
            return;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "replay input could not be read");
                return;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match serde_json::from_str::<KeyEvent>(trimmed) {
            Ok(event) => {
                // Receiver gone means nobody is listening any more.
                if sender.send(event).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "skipping undecodable event");
            }
        }
    }
    tracing::debug!("replay input exhausted");
}
