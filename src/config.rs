//! Configuration for keyheat.

use crate::collector::types::KeyId;
use crate::core::heatmap::{Color, Palette};
use crate::core::tracker::{TrackerConfig, DEFAULT_TERMINATION_KEY, DEFAULT_TERMINATION_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key whose repeated release ends a session
    pub termination_key: KeyId,

    /// Consecutive releases of the termination key that end a session
    pub termination_threshold: u32,

    /// Gradient color for the least pressed keys
    pub low_color: Color,

    /// Gradient color for the most pressed keys
    pub high_color: Color,

    /// Color for keys never pressed
    pub unseen_color: Color,

    /// Directory for session logs
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyheat");
        let palette = Palette::default();

        Self {
            termination_key: KeyId::from(DEFAULT_TERMINATION_KEY),
            termination_threshold: DEFAULT_TERMINATION_THRESHOLD,
            low_color: palette.low,
            high_color: palette.high,
            unseen_color: Color::from_rgb8(0xbe, 0xbe, 0xbe),
            log_dir: data_dir.join("logs"),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let mut config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.termination_key = config.termination_key.normalized();
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyheat")
            .join("config.json")
    }

    /// Check values that would make a session impossible to end.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.termination_threshold == 0 {
            return Err(ConfigError::Invalid(
                "termination_threshold must be at least 1".to_string(),
            ));
        }
        if self.termination_key.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid(
                "termination_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            termination_key: self.termination_key.normalized(),
            termination_threshold: self.termination_threshold,
        }
    }

    pub fn palette(&self) -> Palette {
        Palette {
            low: self.low_color,
            high: self.high_color,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.termination_key, KeyId::from("esc"));
        assert_eq!(config.termination_threshold, 5);
        assert_eq!(config.low_color.to_hex(), "#929693");
        assert_eq!(config.high_color.to_hex(), "#32a852");
        assert_eq!(config.unseen_color.to_hex(), "#bebebe");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r##"{"termination_threshold": 3, "high_color": "#ff0000"}"##)
                .unwrap();
        assert_eq!(config.termination_threshold, 3);
        assert_eq!(config.high_color.to_hex(), "#ff0000");
        assert_eq!(config.termination_key, KeyId::from("esc"));
    }

    #[test]
    fn test_bad_color_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"low_color": "gray"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let config = Config {
            termination_threshold: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            termination_key: KeyId::from(" "),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mixed_case_termination_key_ends_session() {
        use crate::collector::types::{KeyDescriptor, KeyEvent};
        use crate::core::tracker::{SessionTracker, Signal};

        for configured in ["Esc", " esc", "ESC "] {
            let json = format!(r#"{{"termination_key": "{configured}"}}"#);
            let config: Config = serde_json::from_str(&json).unwrap();
            assert!(config.validate().is_ok());
            assert_eq!(config.tracker_config().termination_key, KeyId::from("esc"));

            let mut tracker = SessionTracker::new(config.tracker_config());
            let esc = KeyEvent::release(KeyDescriptor::named("Esc"));
            let signals: Vec<Signal> = (0..5).map(|_| tracker.handle(&esc)).collect();
            assert_eq!(signals[3], Signal::Continue);
            assert_eq!(signals[4], Signal::Stop);
        }
    }

    #[test]
    fn test_projections() {
        let config = Config::default();
        assert_eq!(config.tracker_config(), TrackerConfig::default());
        assert_eq!(config.palette(), Palette::default());
    }
}
