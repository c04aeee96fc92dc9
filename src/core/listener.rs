//! Drives a [`SessionTracker`] from a collector channel.

use crate::collector::types::KeyEvent;
use crate::core::tracker::{SessionTracker, Signal};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How long to wait for an event before re-checking the running flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why the listener returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The exit gesture was recognized; the tracker is finished.
    Gesture,
    /// The running flag was cleared (Ctrl+C).
    Interrupted,
    /// The event source disconnected before the gesture.
    SourceClosed,
}

/// Feed events to `tracker` in arrival order until it signals stop, the
/// source closes, or `running` is cleared.
///
/// No event is read after the tracker signals stop.
pub fn drive(
    tracker: &mut SessionTracker,
    receiver: &Receiver<KeyEvent>,
    running: &AtomicBool,
) -> SessionEnd {
    let mut processed: u64 = 0;

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                processed += 1;
                if tracker.handle(&event) == Signal::Stop {
                    tracing::info!(events = processed, "session ended by exit gesture");
                    return SessionEnd::Gesture;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!(events = processed, "event source closed");
                return SessionEnd::SourceClosed;
            }
        }
    }

    tracing::info!(events = processed, "session interrupted");
    SessionEnd::Interrupted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{KeyDescriptor, KeyId};
    use crate::core::tracker::TrackerConfig;
    use crossbeam_channel::unbounded;

    fn esc_tap() -> [KeyEvent; 2] {
        [
            KeyEvent::press(KeyDescriptor::named("esc")),
            KeyEvent::release(KeyDescriptor::named("esc")),
        ]
    }

    #[test]
    fn test_stops_on_gesture_and_leaves_rest_unread() {
        let (tx, rx) = unbounded();
        tx.send(KeyEvent::press(KeyDescriptor::character('a'))).unwrap();
        for _ in 0..5 {
            for event in esc_tap() {
                tx.send(event).unwrap();
            }
        }
        tx.send(KeyEvent::press(KeyDescriptor::character('b'))).unwrap();

        let mut tracker = SessionTracker::new(TrackerConfig::default());
        let running = AtomicBool::new(true);

        assert_eq!(drive(&mut tracker, &rx, &running), SessionEnd::Gesture);
        assert_eq!(tracker.histogram().get(&KeyId::from("b")), None);
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_source_closed() {
        let (tx, rx) = unbounded();
        tx.send(KeyEvent::press(KeyDescriptor::character('a'))).unwrap();
        drop(tx);

        let mut tracker = SessionTracker::new(TrackerConfig::default());
        let running = AtomicBool::new(true);

        assert_eq!(drive(&mut tracker, &rx, &running), SessionEnd::SourceClosed);
        assert_eq!(tracker.histogram().total(), 1);
        assert!(!tracker.is_finished());
    }

    #[test]
    fn test_interrupted() {
        let (_tx, rx) = unbounded::<KeyEvent>();
        let mut tracker = SessionTracker::new(TrackerConfig::default());
        let running = AtomicBool::new(false);

        assert_eq!(drive(&mut tracker, &rx, &running), SessionEnd::Interrupted);
    }
}
