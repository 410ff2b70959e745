//! Campaign data: the objective, message, view-limit and text definitions
//! missions refer to by id.

mod text;

pub use text::*;

use galaxy_rules::Rect;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{CampaignError, Result};

const BUILTIN_CAMPAIGN: &str = include_str!("campaign.toml");

/// Static definition of an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDef {
    pub id: String,
    /// Text key of the objective title.
    pub title: String,
    /// Whether the objective is shown from the start.
    #[serde(default)]
    pub visible: bool,
}

/// Static definition of an incoming message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    pub id: String,
    /// Text key of the message title.
    pub title: String,
    /// Video shown when the player opens the message.
    #[serde(default)]
    pub video: Option<String>,
}

/// Explorable starmap region for one campaign level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewLimitDef {
    pub level: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewLimitDef {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Everything a campaign's missions look up by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignData {
    #[serde(default)]
    pub objectives: Vec<ObjectiveDef>,
    #[serde(default)]
    pub messages: Vec<MessageDef>,
    #[serde(default)]
    pub view_limits: Vec<ViewLimitDef>,
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
}

impl CampaignData {
    /// The campaign shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CAMPAIGN)
    }

    /// Parse and validate campaign data from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let data: CampaignData = toml::from_str(source).map_err(CampaignError::DataParse)?;
        data.validate()?;
        Ok(data)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CampaignError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for objective in &self.objectives {
            if !seen.insert(objective.id.as_str()) {
                return Err(CampaignError::DuplicateId {
                    kind: "objective",
                    id: objective.id.clone(),
                });
            }
        }
        seen.clear();
        for message in &self.messages {
            if !seen.insert(message.id.as_str()) {
                return Err(CampaignError::DuplicateId {
                    kind: "message",
                    id: message.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn message(&self, id: &str) -> Option<&MessageDef> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn objective(&self, id: &str) -> Option<&ObjectiveDef> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// View limit for a level; `None` means the whole map is open.
    pub fn view_limit(&self, level: u32) -> Option<Rect> {
        self.view_limits
            .iter()
            .find(|v| v.level == level)
            .map(ViewLimitDef::rect)
    }

    /// Build a localization table from the embedded texts.
    pub fn text_catalog(&self) -> TextCatalog {
        TextCatalog::new(self.texts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_campaign_parses() {
        let data = CampaignData::builtin().unwrap();
        assert!(data.objective("Patrol.Reach").is_some());
        assert!(data.message("Msg.Escort").unwrap().video.is_some());
        assert!(data.message("Msg.EscortThanks").unwrap().video.is_none());
        assert_eq!(data.view_limit(1), Some(Rect::new(0.0, 0.0, 1000.0, 1000.0)));
        assert_eq!(data.view_limit(3), None);
    }

    #[test]
    fn test_duplicate_objective_rejected() {
        let source = r#"
[[objectives]]
id = "A"
title = "a"

[[objectives]]
id = "A"
title = "again"
"#;
        let err = CampaignData::from_toml_str(source).unwrap_err();
        assert!(matches!(err, CampaignError::DuplicateId { kind: "objective", .. }));
    }

    #[test]
    fn test_empty_document_is_valid() {
        let data = CampaignData::from_toml_str("").unwrap();
        assert!(data.objectives.is_empty());
        assert!(data.texts.is_empty());
    }
}
