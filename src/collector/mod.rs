//! Event collection module for keyheat.
//!
//! Collectors turn some input source into an ordered stream of
//! [`KeyEvent`]s delivered over a channel. Capturing keys from the operating
//! system is left to external tools; the bundled collector replays recorded
//! events from a file or stdin.

pub mod replay;
pub mod types;

// Re-export commonly used types
pub use replay::{CollectorConfig, CollectorError, ReplayCollector};
pub use types::{KeyAction, KeyDescriptor, KeyEvent, KeyId, UNKNOWN_KEY};

/// Default collector type alias
pub type Collector = ReplayCollector;
