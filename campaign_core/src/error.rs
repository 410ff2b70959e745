//! Error types for the campaign scripting core.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that cross the crate boundary: bad data files and bad saves.
///
/// Defects local to one mission are never raised as errors; they are recorded
/// in [`crate::Diagnostics`] so the remaining missions keep running.
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("failed to parse campaign data: {0}")]
    DataParse(#[source] toml::de::Error),

    #[error("failed to parse script config: {0}")]
    ConfigParse(#[source] toml::de::Error),

    #[error("duplicate {kind} id '{id}' in campaign data")]
    DuplicateId { kind: &'static str, id: String },

    #[error("failed to read {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode or decode campaign save: {0}")]
    Persist(#[from] serde_json::Error),

    #[error("mission '{mission}' has no stage named '{stage}'")]
    UnknownStage { mission: String, stage: String },
}

pub type Result<T> = std::result::Result<T, CampaignError>;
