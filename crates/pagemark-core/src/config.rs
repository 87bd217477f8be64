//! Engine configuration.

use crate::history::MAX_HISTORY;
use crate::input::ModifierBindings;
use crate::snap::SnapSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default debounce window for save requests.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables for one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of undoable (past) history entries.
    pub max_history: usize,
    pub snap: SnapSettings,
    pub modifiers: ModifierBindings,
    /// Quiet period before a requested save is due.
    pub save_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY,
            snap: SnapSettings::default(),
            modifiers: ModifierBindings::default(),
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::Invalid {
                field: "max_history",
                reason: "must be at least 1",
            });
        }
        if !(self.snap.threshold.is_finite() && self.snap.threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "snap.threshold",
                reason: "must be a non-negative number",
            });
        }
        if !(self.snap.grid_size.is_finite() && self.snap.grid_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "snap.grid_size",
                reason: "must be positive",
            });
        }
        if !(self.snap.min_size.is_finite() && self.snap.min_size >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "snap.min_size",
                reason: "must be a non-negative number",
            });
        }
        if self.modifiers.axis_lock == self.modifiers.grid {
            return Err(ConfigError::Invalid {
                field: "modifiers",
                reason: "axis lock and grid snapping need different keys",
            });
        }
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ModifierKey;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_history, 100);
        assert_eq!(config.snap.threshold, 6.0);
        assert_eq!(config.snap.grid_size, 10.0);
        assert_eq!(config.modifiers.axis_lock, ModifierKey::Shift);
        assert_eq!(config.modifiers.grid, ModifierKey::Alt);
        assert_eq!(config.save_debounce(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"max_history": 20, "snap": {"threshold": 4.0}}"#).unwrap();
        assert_eq!(config.max_history, 20);
        assert_eq!(config.snap.threshold, 4.0);
        assert_eq!(config.snap.grid_size, 10.0);
        assert!(config.snap.guides);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"max_history": 0}"#),
            Err(ConfigError::Invalid { field: "max_history", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"snap": {"grid_size": 0.0}}"#),
            Err(ConfigError::Invalid { field: "snap.grid_size", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"modifiers": {"axis_lock": "alt"}}"#),
            Err(ConfigError::Invalid { field: "modifiers", .. })
        ));
        assert!(matches!(EngineConfig::from_json("not json"), Err(ConfigError::Parse(_))));
    }
}
