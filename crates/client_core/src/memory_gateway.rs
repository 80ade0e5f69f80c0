//! In-process store with the same mutation semantics as the remote one.
//!
//! Backs `--offline` mode and the view-model tests. Writes are serialized
//! behind one lock and every mutation emits a [`GatewayEvent`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Office, OfficeId, OfficeWorker, Project, ProjectId, Speaker, SpeakerId, Weekday},
    protocol::{GatewayEvent, SpeakerUpdate},
};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::GatewayError,
    gateway::{Gateway, OfficeGateway, StandupGateway},
};

/// Serializable contents of a [`MemoryGateway`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub offices: Vec<Office>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
}

pub struct MemoryGateway {
    state: RwLock<Snapshot>,
    events: broadcast::Sender<GatewayEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnKey {
    Absent,
    Project(Option<ProjectId>),
}

impl ColumnKey {
    fn of(speaker: &Speaker) -> Self {
        if speaker.is_absent {
            ColumnKey::Absent
        } else {
            ColumnKey::Project(speaker.project_id.clone())
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn renumber_column(speakers: &mut [Speaker], key: &ColumnKey, order: &[SpeakerId]) {
    for (index, id) in order.iter().enumerate() {
        if let Some(speaker) = speakers
            .iter_mut()
            .find(|speaker| &speaker.id == id && &ColumnKey::of(speaker) == key)
        {
            speaker.index = index as i64;
        }
    }
}

fn column_order(speakers: &[Speaker], key: &ColumnKey, skip: Option<&SpeakerId>) -> Vec<SpeakerId> {
    let mut members: Vec<&Speaker> = speakers
        .iter()
        .filter(|speaker| &ColumnKey::of(speaker) == key && Some(&speaker.id) != skip)
        .collect();
    members.sort_by_key(|speaker| speaker.index);
    members.into_iter().map(|speaker| speaker.id.clone()).collect()
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            state: RwLock::new(snapshot),
            events,
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Inserts a speaker directly; the store's speaker creation is not part of the client contract.
    pub async fn insert_speaker(&self, speaker: Speaker) {
        self.state.write().await.speakers.push(speaker);
        self.emit(GatewayEvent::SpeakersChanged);
    }

    fn emit(&self, event: GatewayEvent) {
        let _ = self.events.send(event);
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfficeGateway for MemoryGateway {
    async fn list_offices(&self) -> Result<Vec<Office>> {
        Ok(self.state.read().await.offices.clone())
    }

    async fn add_office(&self, name: &str) -> Result<Office> {
        let office = Office {
            id: OfficeId::new(new_id()),
            name: name.to_string(),
            presence: Default::default(),
        };
        self.state.write().await.offices.push(office.clone());
        self.emit(GatewayEvent::OfficesChanged);
        Ok(office)
    }

    async fn delete_office(&self, office_id: &OfficeId) -> Result<()> {
        {
            let mut state = self.state.write().await;
            let before = state.offices.len();
            state.offices.retain(|office| &office.id != office_id);
            if state.offices.len() == before {
                return Err(GatewayError::OfficeNotFound(office_id.clone()).into());
            }
        }
        self.emit(GatewayEvent::OfficesChanged);
        Ok(())
    }

    async fn add_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()> {
        if person.slice().is_none() {
            return Err(GatewayError::NoAttendance {
                name: person.name.clone(),
            }
            .into());
        }
        {
            let mut state = self.state.write().await;
            let office = state
                .offices
                .iter_mut()
                .find(|office| &office.id == office_id)
                .ok_or_else(|| GatewayError::OfficeNotFound(office_id.clone()))?;
            let workers = office.presence.day_mut(day);
            if workers.iter().any(|worker| worker.same_attendance(person)) {
                debug!(office_id = %office_id, %day, "memory gateway: duplicate worker ignored");
            } else {
                workers.push(person.clone());
            }
        }
        self.emit(GatewayEvent::OfficesChanged);
        Ok(())
    }

    async fn remove_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()> {
        {
            let mut state = self.state.write().await;
            let office = state
                .offices
                .iter_mut()
                .find(|office| &office.id == office_id)
                .ok_or_else(|| GatewayError::OfficeNotFound(office_id.clone()))?;
            office
                .presence
                .day_mut(day)
                .retain(|worker| !worker.same_attendance(person));
        }
        self.emit(GatewayEvent::OfficesChanged);
        Ok(())
    }

    async fn clear_all_presence(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            for office in &mut state.offices {
                office.presence.clear();
            }
        }
        self.emit(GatewayEvent::OfficesChanged);
        Ok(())
    }
}

#[async_trait]
impl StandupGateway for MemoryGateway {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.state.read().await.projects.clone())
    }

    async fn add_project(&self, name: &str) -> Result<Project> {
        let project = {
            let mut state = self.state.write().await;
            let index = state
                .projects
                .iter()
                .map(|project| project.index + 1)
                .max()
                .unwrap_or(0);
            let project = Project {
                id: ProjectId::new(new_id()),
                name: name.to_string(),
                index,
            };
            state.projects.push(project.clone());
            project
        };
        self.emit(GatewayEvent::ProjectsChanged);
        Ok(project)
    }

    async fn reorder_project(&self, project: &Project, new_index: i64) -> Result<Project> {
        let moved = {
            let mut state = self.state.write().await;
            state.projects.sort_by_key(|project| project.index);
            let position = state
                .projects
                .iter()
                .position(|candidate| candidate.id == project.id)
                .ok_or_else(|| GatewayError::ProjectNotFound(project.id.clone()))?;
            let moved = state.projects.remove(position);
            let target = new_index.clamp(0, state.projects.len() as i64) as usize;
            state.projects.insert(target, moved);
            for (index, project) in state.projects.iter_mut().enumerate() {
                project.index = index as i64;
            }
            state.projects[target].clone()
        };
        self.emit(GatewayEvent::ProjectsChanged);
        Ok(moved)
    }

    async fn list_speakers(&self) -> Result<Vec<Speaker>> {
        Ok(self.state.read().await.speakers.clone())
    }

    async fn update_speaker(
        &self,
        speaker_id: &SpeakerId,
        update: &SpeakerUpdate,
    ) -> Result<Speaker> {
        let updated = {
            let mut state = self.state.write().await;
            let source = state
                .speakers
                .iter()
                .find(|speaker| &speaker.id == speaker_id)
                .map(ColumnKey::of)
                .ok_or_else(|| GatewayError::SpeakerNotFound(speaker_id.clone()))?;
            let destination = if update.is_absent {
                ColumnKey::Absent
            } else {
                ColumnKey::Project(Some(update.project_id.clone()))
            };

            let mut order = column_order(&state.speakers, &destination, Some(speaker_id));
            let slot = update.index.clamp(0, order.len() as i64) as usize;
            order.insert(slot, speaker_id.clone());

            if let Some(speaker) = state
                .speakers
                .iter_mut()
                .find(|speaker| &speaker.id == speaker_id)
            {
                speaker.project_id = Some(update.project_id.clone());
                speaker.is_absent = update.is_absent;
            }
            renumber_column(&mut state.speakers, &destination, &order);

            if source != destination {
                let remaining = column_order(&state.speakers, &source, None);
                renumber_column(&mut state.speakers, &source, &remaining);
            }

            state
                .speakers
                .iter()
                .find(|speaker| &speaker.id == speaker_id)
                .cloned()
                .ok_or_else(|| GatewayError::SpeakerNotFound(speaker_id.clone()))?
        };
        self.emit(GatewayEvent::SpeakersChanged);
        Ok(updated)
    }
}

impl Gateway for MemoryGateway {
    fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/memory_gateway_tests.rs"]
mod tests;
