//! Offices page view-model: per-weekday attendance slices and the presence toggle.

use std::sync::Arc;

use anyhow::Result;
use shared::domain::{CurrentUser, Office, OfficeId, OfficeWorker, Slice, Weekday};
use tracing::info;

use crate::{gateway::Gateway, notify, notify::Notifier};

/// One weekday list split into the three attendance slices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayPresence {
    pub full_day: Vec<OfficeWorker>,
    pub morning: Vec<OfficeWorker>,
    pub afternoon: Vec<OfficeWorker>,
}

impl DayPresence {
    pub fn from_workers(workers: &[OfficeWorker]) -> Self {
        let mut day = Self::default();
        for worker in workers {
            match worker.slice() {
                Some(Slice::FullDay) => day.full_day.push(worker.clone()),
                Some(Slice::Morning) => day.morning.push(worker.clone()),
                Some(Slice::Afternoon) => day.afternoon.push(worker.clone()),
                None => {}
            }
        }
        day
    }

    pub fn slice(&self, slice: Slice) -> &[OfficeWorker] {
        match slice {
            Slice::FullDay => &self.full_day,
            Slice::Morning => &self.morning,
            Slice::Afternoon => &self.afternoon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeDayView {
    pub office_id: OfficeId,
    pub office_name: String,
    /// Length of the stored weekday list, shown as a badge.
    pub headcount: usize,
    pub slices: DayPresence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayView {
    pub day: Weekday,
    pub offices: Vec<OfficeDayView>,
}

/// Everything the offices page renders, derived from the office list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceBoard {
    pub offices: Vec<(OfficeId, String)>,
    pub days: Vec<WeekdayView>,
}

impl PresenceBoard {
    pub fn new(offices: &[Office]) -> Self {
        let days = Weekday::ALL
            .into_iter()
            .map(|day| WeekdayView {
                day,
                offices: offices
                    .iter()
                    .map(|office| {
                        let workers = office.presence.day(day);
                        OfficeDayView {
                            office_id: office.id.clone(),
                            office_name: office.name.clone(),
                            headcount: workers.len(),
                            slices: DayPresence::from_workers(workers),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            offices: offices
                .iter()
                .map(|office| (office.id.clone(), office.name.clone()))
                .collect(),
            days,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.offices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    Add {
        office_id: OfficeId,
        day: Weekday,
        person: OfficeWorker,
    },
    Remove {
        office_id: OfficeId,
        day: Weekday,
        person: OfficeWorker,
    },
}

/// Add the user to `slice` of `day`, or remove them if that exact slice entry exists.
pub fn plan_toggle(office: &Office, day: Weekday, user: &CurrentUser, slice: Slice) -> PresenceChange {
    let person = OfficeWorker::new(user.username.clone(), user.photo_url.clone(), slice);
    let already_present = office
        .presence
        .day(day)
        .iter()
        .any(|worker| worker.same_attendance(&person));

    if already_present {
        PresenceChange::Remove {
            office_id: office.id.clone(),
            day,
            person,
        }
    } else {
        PresenceChange::Add {
            office_id: office.id.clone(),
            day,
            person,
        }
    }
}

pub struct PresenceController {
    gateway: Arc<dyn Gateway>,
    notifier: Notifier,
    user: CurrentUser,
}

impl PresenceController {
    pub fn new(gateway: Arc<dyn Gateway>, notifier: Notifier, user: CurrentUser) -> Self {
        Self {
            gateway,
            notifier,
            user,
        }
    }

    pub async fn offices(&self) -> Result<Vec<Office>> {
        self.gateway.list_offices().await
    }

    pub async fn board(&self) -> Result<PresenceBoard> {
        Ok(PresenceBoard::new(&self.offices().await?))
    }

    pub async fn toggle(&self, office: &Office, day: Weekday, slice: Slice) -> Result<PresenceChange> {
        let change = plan_toggle(office, day, &self.user, slice);
        self.apply(&change, &office.name).await?;
        Ok(change)
    }

    async fn apply(&self, change: &PresenceChange, office_name: &str) -> Result<()> {
        match change {
            PresenceChange::Add {
                office_id,
                day,
                person,
            } => {
                info!(office_id = %office_id, %day, name = %person.name, "presence: adding person");
                self.gateway.add_person(office_id, *day, person).await?;
                self.notifier
                    .success(notify::presence_added(office_name, day.wire_name()));
            }
            PresenceChange::Remove {
                office_id,
                day,
                person,
            } => {
                info!(office_id = %office_id, %day, name = %person.name, "presence: removing person");
                self.gateway.remove_person(office_id, *day, person).await?;
                self.notifier
                    .success(notify::presence_removed(office_name, day.wire_name()));
            }
        }
        Ok(())
    }

    /// Blank names are ignored without a mutation.
    pub async fn add_office(&self, name: &str) -> Result<Option<Office>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let office = self.gateway.add_office(name).await?;
        info!(office_id = %office.id, "presence: office created");
        self.notifier.success(notify::office_created(&office.name));
        Ok(Some(office))
    }

    pub async fn delete_office(&self, office_id: &OfficeId) -> Result<()> {
        self.gateway.delete_office(office_id).await?;
        info!(office_id = %office_id, "presence: office deleted");
        self.notifier.success(notify::office_deleted());
        Ok(())
    }

    /// Starts the irreversible clear; nothing is sent until the guard is confirmed.
    pub fn request_clear_all(&self) -> ClearAllPresence<'_> {
        ClearAllPresence { controller: self }
    }
}

#[must_use = "clearing presence only happens on confirm()"]
pub struct ClearAllPresence<'a> {
    controller: &'a PresenceController,
}

impl ClearAllPresence<'_> {
    pub async fn confirm(self) -> Result<()> {
        info!("presence: clearing presence of all offices");
        self.controller.gateway.clear_all_presence().await?;
        self.controller.notifier.success(notify::presences_cleared());
        Ok(())
    }

    pub fn cancel(self) {
        info!("presence: clear of all offices cancelled");
    }
}

#[cfg(test)]
#[path = "tests/presence_tests.rs"]
mod tests;
