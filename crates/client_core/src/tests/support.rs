//! Gateway double that records every call before delegating to a [`MemoryGateway`].

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Office, OfficeId, OfficeWorker, Project, ProjectId, Speaker, SpeakerId, Weekday},
    protocol::{GatewayEvent, SpeakerUpdate},
};
use tokio::sync::{broadcast, Mutex};

use crate::{
    gateway::{Gateway, OfficeGateway, StandupGateway},
    memory_gateway::{MemoryGateway, Snapshot},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddOffice(String),
    DeleteOffice(OfficeId),
    AddPerson {
        office_id: OfficeId,
        day: Weekday,
        person: OfficeWorker,
    },
    RemovePerson {
        office_id: OfficeId,
        day: Weekday,
        person: OfficeWorker,
    },
    ClearAllPresence,
    AddProject(String),
    ReorderProject {
        project_id: ProjectId,
        new_index: i64,
    },
    UpdateSpeaker {
        speaker_id: SpeakerId,
        update: SpeakerUpdate,
    },
}

pub struct RecordingGateway {
    pub inner: MemoryGateway,
    calls: Mutex<Vec<Call>>,
    speaker_lists: AtomicUsize,
    fail_speaker_lists: AtomicUsize,
    silent: Option<broadcast::Sender<GatewayEvent>>,
}

impl RecordingGateway {
    pub fn new(snapshot: Snapshot) -> Arc<Self> {
        Arc::new(Self::build(snapshot, false))
    }

    /// Change events are never delivered, so only polling observes updates.
    pub fn silent(snapshot: Snapshot) -> Arc<Self> {
        Arc::new(Self::build(snapshot, true))
    }

    fn build(snapshot: Snapshot, silent: bool) -> Self {
        Self {
            inner: MemoryGateway::from_snapshot(snapshot),
            calls: Mutex::new(Vec::new()),
            speaker_lists: AtomicUsize::new(0),
            fail_speaker_lists: AtomicUsize::new(0),
            silent: silent.then(|| broadcast::channel(4).0),
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub fn speaker_list_count(&self) -> usize {
        self.speaker_lists.load(Ordering::SeqCst)
    }

    /// The next `count` speaker list calls fail.
    pub fn fail_next_speaker_lists(&self, count: usize) {
        self.fail_speaker_lists.store(count, Ordering::SeqCst);
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl OfficeGateway for RecordingGateway {
    async fn list_offices(&self) -> Result<Vec<Office>> {
        self.inner.list_offices().await
    }

    async fn add_office(&self, name: &str) -> Result<Office> {
        self.record(Call::AddOffice(name.to_string())).await;
        self.inner.add_office(name).await
    }

    async fn delete_office(&self, office_id: &OfficeId) -> Result<()> {
        self.record(Call::DeleteOffice(office_id.clone())).await;
        self.inner.delete_office(office_id).await
    }

    async fn add_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()> {
        self.record(Call::AddPerson {
            office_id: office_id.clone(),
            day,
            person: person.clone(),
        })
        .await;
        self.inner.add_person(office_id, day, person).await
    }

    async fn remove_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()> {
        self.record(Call::RemovePerson {
            office_id: office_id.clone(),
            day,
            person: person.clone(),
        })
        .await;
        self.inner.remove_person(office_id, day, person).await
    }

    async fn clear_all_presence(&self) -> Result<()> {
        self.record(Call::ClearAllPresence).await;
        self.inner.clear_all_presence().await
    }
}

#[async_trait]
impl StandupGateway for RecordingGateway {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.inner.list_projects().await
    }

    async fn add_project(&self, name: &str) -> Result<Project> {
        self.record(Call::AddProject(name.to_string())).await;
        self.inner.add_project(name).await
    }

    async fn reorder_project(&self, project: &Project, new_index: i64) -> Result<Project> {
        self.record(Call::ReorderProject {
            project_id: project.id.clone(),
            new_index,
        })
        .await;
        self.inner.reorder_project(project, new_index).await
    }

    async fn list_speakers(&self) -> Result<Vec<Speaker>> {
        self.speaker_lists.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .fail_speaker_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(anyhow!("speaker list unavailable"));
        }
        self.inner.list_speakers().await
    }

    async fn update_speaker(
        &self,
        speaker_id: &SpeakerId,
        update: &SpeakerUpdate,
    ) -> Result<Speaker> {
        self.record(Call::UpdateSpeaker {
            speaker_id: speaker_id.clone(),
            update: update.clone(),
        })
        .await;
        self.inner.update_speaker(speaker_id, update).await
    }
}

impl Gateway for RecordingGateway {
    fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        match &self.silent {
            Some(tx) => tx.subscribe(),
            None => self.inner.subscribe(),
        }
    }
}
