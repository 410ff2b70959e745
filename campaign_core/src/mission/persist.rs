//! Mission save records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{MissionBase, PendingReveal};
use crate::error::{CampaignError, Result};

/// Persisted state of one mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub mission_id: String,
    pub stage: String,
    /// Mission-specific fields beyond the stage.
    #[serde(default)]
    pub aux: Map<String, Value>,
    #[serde(default)]
    pub pending_objectives: Vec<PendingReveal>,
    #[serde(default)]
    pub deferred: Vec<Value>,
}

/// Aux payload of missions whose stage says it all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoAux {}

/// The persisted name of a stage value.
pub fn stage_label<S: Serialize>(stage: &S) -> String {
    match serde_json::to_value(stage) {
        Ok(Value::String(label)) => label,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

/// Build a record from the shared base, a stage enum and an aux struct.
pub fn save_record<S: Serialize, A: Serialize>(
    base: &MissionBase,
    stage: &S,
    aux: &A,
) -> Result<MissionRecord> {
    let aux = match serde_json::to_value(aux)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(CampaignError::Persist(serde::ser::Error::custom(
                "mission state must serialize to a map",
            )))
        }
    };
    Ok(MissionRecord {
        mission_id: base.id().to_string(),
        stage: stage_label(stage),
        aux,
        pending_objectives: base.pending_objectives().to_vec(),
        deferred: base.deferred().to_vec(),
    })
}

/// Restore the shared base from a record and decode stage and aux.
///
/// The base is left untouched when the stage or aux cannot be decoded.
pub fn load_record<S: DeserializeOwned, A: DeserializeOwned>(
    base: &mut MissionBase,
    record: &MissionRecord,
) -> Result<(S, A)> {
    let stage = serde_json::from_value(Value::String(record.stage.clone())).map_err(|_| {
        CampaignError::UnknownStage {
            mission: record.mission_id.clone(),
            stage: record.stage.clone(),
        }
    })?;
    let aux = serde_json::from_value(Value::Object(record.aux.clone()))?;
    base.restore(record.pending_objectives.clone(), record.deferred.clone());
    Ok((stage, aux))
}
