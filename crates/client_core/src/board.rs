//! Stand-up board view-model: ordered project columns, the pinned absents
//! column, and dispatch of drag commands to the gateway.

use std::sync::Arc;

use anyhow::Result;
use shared::domain::{Project, ProjectId, Speaker};
use tracing::info;

use crate::{
    drag::{plan_drag, BoardCommand, DragEnd},
    gateway::Gateway,
    notify,
    notify::Notifier,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectColumn {
    pub project: Project,
    pub speakers: Vec<Speaker>,
}

/// Filter view over absent speakers. Backed by the project record named
/// [`shared::domain::ABSENTS_COLUMN_NAME`] so drops have a droppable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsentsColumn {
    pub project: Project,
    pub speakers: Vec<Speaker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardColumn {
    Project(ProjectColumn),
    Absents(AbsentsColumn),
}

impl BoardColumn {
    pub fn id(&self) -> &ProjectId {
        &self.project().id
    }

    pub fn project(&self) -> &Project {
        match self {
            BoardColumn::Project(column) => &column.project,
            BoardColumn::Absents(column) => &column.project,
        }
    }

    pub fn speakers(&self) -> &[Speaker] {
        match self {
            BoardColumn::Project(column) => &column.speakers,
            BoardColumn::Absents(column) => &column.speakers,
        }
    }

    pub fn is_absents(&self) -> bool {
        matches!(self, BoardColumn::Absents(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// All columns in ascending `index` order, absents included at its stored position.
    columns: Vec<BoardColumn>,
}

fn sorted_by_index<T: Clone>(items: &[T], index: impl Fn(&T) -> i64) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort_by_key(|item| index(item));
    items
}

impl Board {
    pub fn new(projects: &[Project], speakers: &[Speaker]) -> Self {
        let speakers = sorted_by_index(speakers, |speaker| speaker.index);
        let columns = sorted_by_index(projects, |project| project.index)
            .into_iter()
            .map(|project| {
                if project.is_absents() {
                    BoardColumn::Absents(AbsentsColumn {
                        speakers: speakers
                            .iter()
                            .filter(|speaker| speaker.is_absent)
                            .cloned()
                            .collect(),
                        project,
                    })
                } else {
                    BoardColumn::Project(ProjectColumn {
                        speakers: speakers
                            .iter()
                            .filter(|speaker| {
                                !speaker.is_absent
                                    && speaker.project_id.as_ref() == Some(&project.id)
                            })
                            .cloned()
                            .collect(),
                        project,
                    })
                }
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[BoardColumn] {
        &self.columns
    }

    /// Real project columns in display order, each with its position in [`Board::columns`],
    /// which is the index a project drag refers to. The absents column is pinned separately.
    pub fn project_columns(&self) -> impl Iterator<Item = (usize, &ProjectColumn)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(position, column)| match column {
                BoardColumn::Project(column) => Some((position, column)),
                BoardColumn::Absents(_) => None,
            })
    }

    pub fn absents(&self) -> Option<&AbsentsColumn> {
        self.columns.iter().find_map(|column| match column {
            BoardColumn::Absents(column) => Some(column),
            BoardColumn::Project(_) => None,
        })
    }

    pub fn column(&self, id: &str) -> Option<&BoardColumn> {
        self.columns.iter().find(|column| column.id().as_str() == id)
    }
}

pub struct BoardController {
    gateway: Arc<dyn Gateway>,
    notifier: Notifier,
}

impl BoardController {
    pub fn new(gateway: Arc<dyn Gateway>, notifier: Notifier) -> Self {
        Self { gateway, notifier }
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        self.gateway.list_projects().await
    }

    pub async fn board(&self) -> Result<Board> {
        let projects = self.gateway.list_projects().await?;
        let speakers = self.gateway.list_speakers().await?;
        Ok(Board::new(&projects, &speakers))
    }

    /// Blank names are ignored without a mutation.
    pub async fn add_project(&self, name: &str) -> Result<Option<Project>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let project = self.gateway.add_project(name).await?;
        info!(project_id = %project.id, "board: project created");
        self.notifier.success(notify::project_created(name));
        Ok(Some(project))
    }

    /// Plans the drop against `board` and dispatches the resulting command, if any.
    pub async fn handle_drag_end(&self, board: &Board, drag: &DragEnd) -> Result<Option<BoardCommand>> {
        let Some(command) = plan_drag(board, drag) else {
            return Ok(None);
        };
        self.dispatch(&command).await?;
        Ok(Some(command))
    }

    pub async fn dispatch(&self, command: &BoardCommand) -> Result<()> {
        match command {
            BoardCommand::ReorderProject { project, new_index } => {
                info!(project_id = %project.id, new_index, "board: reordering project");
                self.gateway.reorder_project(project, *new_index).await?;
                self.notifier.success(notify::project_moved(&project.name));
            }
            BoardCommand::MoveSpeaker { speaker_id, update } => {
                info!(
                    speaker_id = %speaker_id,
                    project_id = %update.project_id,
                    index = update.index,
                    is_absent = update.is_absent,
                    "board: moving speaker"
                );
                let speaker = self.gateway.update_speaker(speaker_id, update).await?;
                self.notifier.success(notify::speaker_moved(&speaker.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
