use serde::{Deserialize, Serialize};

use crate::domain::ProjectId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderProjectRequest {
    pub new_index: i64,
}

/// Assignment written when a speaker is dropped on a column slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerUpdate {
    pub project_id: ProjectId,
    pub index: i64,
    pub is_absent: bool,
}

/// Collection-level change pushed by the store's change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    OfficesChanged,
    ProjectsChanged,
    SpeakersChanged,
}
