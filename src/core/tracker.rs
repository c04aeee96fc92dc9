//! Session tracking: per-key press counts and the exit gesture.
//!
//! Every press is counted. Releases drive the exit gesture: the session
//! ends once the termination key has been released `termination_threshold`
//! times in a row with no other key released in between.

use crate::collector::types::{KeyAction, KeyEvent, KeyId};
use crate::core::histogram::Histogram;
use crate::core::summary::{format_report, SessionSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key whose repeated release ends a session.
pub const DEFAULT_TERMINATION_KEY: &str = "esc";

/// Consecutive releases of the termination key needed to end a session.
pub const DEFAULT_TERMINATION_THRESHOLD: u32 = 5;

/// Exit gesture settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub termination_key: KeyId,
    pub termination_threshold: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            termination_key: KeyId::from(DEFAULT_TERMINATION_KEY),
            termination_threshold: DEFAULT_TERMINATION_THRESHOLD,
        }
    }
}

/// What the listener should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Stop,
}

/// A frozen session: final counts plus the summary computed from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedSession {
    pub histogram: Histogram,
    pub summary: SessionSummary,
}

impl FinishedSession {
    /// End-of-session statistics table.
    pub fn report(&self) -> String {
        format_report(&self.summary, &self.histogram)
    }
}

/// Accumulates press counts until the exit gesture is seen.
pub struct SessionTracker {
    config: TrackerConfig,
    histogram: Histogram,
    consecutive_releases: u32,
    last_released: Option<KeyId>,
    started_at: DateTime<Utc>,
    /// Set once the session has ended; no further events are applied
    summary: Option<SessionSummary>,
}

impl SessionTracker {
    /// Create a tracker whose session starts now.
    pub fn new(config: TrackerConfig) -> Self {
        Self::starting_at(config, Utc::now())
    }

    /// Create a tracker with an explicit session start.
    ///
    /// The termination key is normalized so that `"Esc"` matches released
    /// `esc` keys.
    pub fn starting_at(mut config: TrackerConfig, started_at: DateTime<Utc>) -> Self {
        config.termination_key = config.termination_key.normalized();
        Self {
            config,
            histogram: Histogram::new(),
            consecutive_releases: 0,
            last_released: None,
            started_at,
            summary: None,
        }
    }

    /// Dispatch an event to the press or release handler.
    pub fn handle(&mut self, event: &KeyEvent) -> Signal {
        match event.kind {
            KeyAction::Press => {
                self.on_key_press(event);
                if self.is_finished() {
                    Signal::Stop
                } else {
                    Signal::Continue
                }
            }
            KeyAction::Release => self.on_key_release(event),
        }
    }

    /// Count one press of the event's key.
    pub fn on_key_press(&mut self, event: &KeyEvent) {
        if self.is_finished() {
            tracing::debug!("ignoring press after session end");
            return;
        }
        self.histogram.record(event.key_id());
    }

    /// Advance the exit gesture. Returns [`Signal::Stop`] exactly when the
    /// threshold is reached, and for any event after that.
    pub fn on_key_release(&mut self, event: &KeyEvent) -> Signal {
        if self.is_finished() {
            tracing::debug!("ignoring release after session end");
            return Signal::Stop;
        }

        let key = event.key_id();
        if key == self.config.termination_key {
            if self.last_released.as_ref() == Some(&key) {
                self.consecutive_releases += 1;
            } else {
                self.consecutive_releases = 1;
            }
        } else {
            self.consecutive_releases = 0;
        }
        self.last_released = Some(key);

        if self.consecutive_releases >= self.config.termination_threshold {
            tracing::info!(
                releases = self.consecutive_releases,
                key = %self.config.termination_key,
                "exit gesture detected"
            );
            self.finalize(event.timestamp);
            return Signal::Stop;
        }

        Signal::Continue
    }

    /// End the session and hand over the frozen histogram.
    ///
    /// If the exit gesture already ended the session, its summary is kept
    /// and `ended_at` is ignored.
    pub fn finish(mut self, ended_at: DateTime<Utc>) -> FinishedSession {
        let summary = match self.summary.take() {
            Some(summary) => summary,
            None => SessionSummary::compute(&self.histogram, self.started_at, ended_at),
        };
        FinishedSession {
            histogram: self.histogram,
            summary,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Current length of the termination-key release streak.
    pub fn consecutive_releases(&self) -> u32 {
        self.consecutive_releases
    }

    fn finalize(&mut self, ended_at: DateTime<Utc>) {
        self.summary = Some(SessionSummary::compute(
            &self.histogram,
            self.started_at,
            ended_at,
        ));
    }
}
