//! keyheat - keyboard usage tracker and press-frequency heatmap.
//!
//! A session counts how often each key is pressed until the user releases
//! the termination key (Esc by default) five times in a row. The finished
//! counts are then mapped onto a two-color gradient and painted onto a
//! keyboard layout.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           keyheat                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Collector  │──▶│   Session   │──▶│   Heatmap   │       │
//! │  │  (events)   │   │   Tracker   │   │  Colorizer  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                           │                 │              │
//! │                           ▼                 ▼              │
//! │                    ┌─────────────┐   ┌─────────────┐       │
//! │                    │ Session Log │   │   Layout    │       │
//! │                    │   (JSON)    │   │   Painter   │       │
//! │                    └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use keyheat::collector::{KeyDescriptor, KeyEvent};
//! use keyheat::core::{colorize, Palette, SessionTracker, Signal, TrackerConfig};
//!
//! let mut tracker = SessionTracker::new(TrackerConfig::default());
//! tracker.handle(&KeyEvent::press(KeyDescriptor::character('a')));
//!
//! let esc = KeyEvent::release(KeyDescriptor::named("esc"));
//! let mut signal = Signal::Continue;
//! for _ in 0..5 {
//!     signal = tracker.handle(&esc);
//! }
//! assert_eq!(signal, Signal::Stop);
//!
//! let session = tracker.finish(chrono::Utc::now());
//! let heatmap = colorize(&session.histogram, &Palette::default()).unwrap();
//! assert_eq!(heatmap.assignment.len(), 1);
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod keylog;
pub mod layout;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorConfig, CollectorError, KeyEvent, KeyId};
pub use config::{Config, ConfigError};
pub use core::{
    colorize, Color, FinishedSession, Heatmap, HeatmapError, Histogram, Palette, SessionEnd,
    SessionSummary, SessionTracker, Signal, TrackerConfig,
};
pub use keylog::{save_session, KeylogError, SessionLog};
pub use layout::{paint, render_ansi, KeyboardLayout, PaintedLayout};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Usage hint shown when a recording session starts.
pub const SESSION_BANNER: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                     KEYHEAT - RECORDING                          ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  Every key press is counted until the session ends.              ║
║                                                                  ║
║  To finish: release the termination key repeatedly without       ║
║  touching any other key in between, as shown below.              ║
║                                                                  ║
║  Only per-key press counts are kept. Typed text is never         ║
║  reconstructed or stored.                                        ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_banner_contents() {
        assert!(SESSION_BANNER.contains("RECORDING"));
        assert!(SESSION_BANNER.contains("termination key"));
        // The configured gesture is printed after the banner.
        assert!(!SESSION_BANNER.contains("Esc x5"));
    }
}
