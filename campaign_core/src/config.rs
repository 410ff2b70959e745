//! Tunables for the scripting runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::environment::GameSpeed;
use crate::error::{CampaignError, Result};

/// Configuration for mission scripting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// How long a concluded objective stays on screen, in milliseconds.
    pub objective_hide_delay_ms: u64,

    /// Simulation speed forced while a cut-scene plays. `Normal` is the
    /// slowest setting.
    pub cutscene_speed: GameSpeed,

    /// Deliver continuations to missions that are currently not applicable.
    pub resume_inapplicable: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            objective_hide_delay_ms: 13_000,
            cutscene_speed: GameSpeed::Normal,
            resume_inapplicable: true,
        }
    }
}

impl ScriptConfig {
    /// Parse a configuration from TOML; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(CampaignError::ConfigParse)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CampaignError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScriptConfig::default();
        assert_eq!(config.objective_hide_delay_ms, 13_000);
        assert_eq!(config.cutscene_speed, GameSpeed::Normal);
        assert!(config.resume_inapplicable);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScriptConfig::from_toml_str("objective_hide_delay_ms = 500\n").unwrap();
        assert_eq!(config.objective_hide_delay_ms, 500);
        assert_eq!(config.cutscene_speed, GameSpeed::Normal);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let err = ScriptConfig::from_toml_str("objective_hide_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, CampaignError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ScriptConfig::from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CampaignError::ReadFailed { .. }));
    }
}
