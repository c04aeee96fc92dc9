//! Key event types delivered by collectors.
//!
//! An event carries what the source knows about the key (a printable
//! character, a symbolic name, a raw code) and is resolved into a single
//! [`KeyId`] once, when it reaches the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier given to events that carry no usable payload at all.
pub const UNKNOWN_KEY: &str = "<unknown>";

/// Canonical token for one physical key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Same key in the form [`KeyDescriptor::key_id`] produces for names:
    /// surrounding whitespace dropped, lowercased.
    pub fn normalized(&self) -> KeyId {
        KeyId(self.0.trim().to_lowercase())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for KeyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Everything a source reported about a key.
///
/// All three payloads are optional; [`KeyDescriptor::key_id`] picks the
/// first usable one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// Printable character produced by the key
    #[serde(rename = "char", default, skip_serializing_if = "Option::is_none")]
    pub character: Option<char>,
    /// Symbolic name for non-printable keys ("space", "esc", "shift")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque platform representation (scan code, virtual key, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl KeyDescriptor {
    pub fn character(c: char) -> Self {
        Self {
            character: Some(c),
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Resolve the identifier for this key.
    ///
    /// Precedence is printable character, then symbolic name, then the raw
    /// form. Characters and names are lowercased so that shifted and
    /// unshifted letters land on the same key. An empty descriptor resolves
    /// to [`UNKNOWN_KEY`] instead of failing.
    pub fn key_id(&self) -> KeyId {
        if let Some(c) = self.character.filter(|c| is_printable(*c)) {
            return KeyId(c.to_lowercase().collect());
        }

        if let Some(name) = non_blank(self.name.as_deref()) {
            return KeyId(name.to_lowercase());
        }

        if let Some(raw) = non_blank(self.raw.as_deref()) {
            return KeyId(raw.to_string());
        }

        KeyId(UNKNOWN_KEY.to_string())
    }
}

fn is_printable(c: char) -> bool {
    !c.is_control() && !c.is_whitespace()
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Whether the key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Press,
    Release,
}

/// A single key press or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// When the event occurred; defaults to the time it was decoded
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub kind: KeyAction,
    #[serde(default)]
    pub key: KeyDescriptor,
}

impl KeyEvent {
    pub fn press(key: KeyDescriptor) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: KeyAction::Press,
            key,
        }
    }

    pub fn release(key: KeyDescriptor) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: KeyAction::Release,
            key,
        }
    }

    /// Replace the timestamp, mostly useful when replaying recorded input.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn key_id(&self) -> KeyId {
        self.key.key_id()
    }
}
