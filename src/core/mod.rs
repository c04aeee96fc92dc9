//! Core functionality for keyheat.
//!
//! This module contains:
//! - The per-key histogram and the session tracker that fills it
//! - The listener loop that feeds the tracker from a collector
//! - Session summaries and the end-of-session report
//! - The heatmap colorizer

pub mod heatmap;
pub mod histogram;
pub mod listener;
pub mod summary;
pub mod tracker;

// Re-export commonly used types
pub use heatmap::{
    colorize, gradient, Color, ColorParseError, ColorStop, Heatmap, HeatmapError, KeyColor,
    KeyColorAssignment, Palette, DEFAULT_HIGH_COLOR, DEFAULT_LOW_COLOR,
};
pub use histogram::Histogram;
pub use listener::{drive, SessionEnd};
pub use summary::{format_report, ElapsedTime, SessionSummary};
pub use tracker::{
    FinishedSession, SessionTracker, Signal, TrackerConfig, DEFAULT_TERMINATION_KEY,
    DEFAULT_TERMINATION_THRESHOLD,
};
