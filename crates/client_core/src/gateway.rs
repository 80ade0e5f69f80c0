//! Contract of the remote document store the view-models read from and write to.
//!
//! The store owns persistence and write ordering. Implementations push
//! collection-level [`GatewayEvent`]s so dependent views can refetch.

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Office, OfficeId, OfficeWorker, Project, Speaker, SpeakerId, Weekday},
    protocol::{GatewayEvent, SpeakerUpdate},
};
use tokio::sync::broadcast;

#[async_trait]
pub trait OfficeGateway: Send + Sync {
    async fn list_offices(&self) -> Result<Vec<Office>>;
    async fn add_office(&self, name: &str) -> Result<Office>;
    async fn delete_office(&self, office_id: &OfficeId) -> Result<()>;
    async fn add_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()>;
    async fn remove_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()>;
    async fn clear_all_presence(&self) -> Result<()>;
}

#[async_trait]
pub trait StandupGateway: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn add_project(&self, name: &str) -> Result<Project>;
    /// Moves `project` to `new_index` in display order; returns the stored project.
    async fn reorder_project(&self, project: &Project, new_index: i64) -> Result<Project>;
    async fn list_speakers(&self) -> Result<Vec<Speaker>>;
    async fn update_speaker(&self, speaker_id: &SpeakerId, update: &SpeakerUpdate)
        -> Result<Speaker>;
}

pub trait Gateway: OfficeGateway + StandupGateway {
    fn subscribe(&self) -> broadcast::Receiver<GatewayEvent>;
}
