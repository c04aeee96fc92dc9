//! Persisted session logs.
//!
//! Each finished session can be written to a timestamped JSON file holding
//! the date, duration, total press count and the per-key counts.

pub mod record;

// Re-export commonly used types
pub use record::{list_logs, save_session, KeylogError, SessionLog};
