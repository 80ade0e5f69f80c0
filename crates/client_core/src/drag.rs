//! Library-neutral drag-and-drop result and its translation into board commands.
//!
//! Project indexes refer to positions in the full index-sorted project list
//! (absents record included); speaker indexes are slots within a column.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Project, ProjectId, SpeakerId},
    protocol::SpeakerUpdate,
};
use tracing::{debug, warn};

use crate::board::{Board, BoardColumn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Project,
    Speaker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropLocation {
    pub droppable_id: String,
    pub index: i64,
}

impl DropLocation {
    pub fn new(droppable_id: impl Into<String>, index: i64) -> Self {
        Self {
            droppable_id: droppable_id.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub draggable_id: String,
    pub kind: DragKind,
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    ReorderProject {
        project: Project,
        new_index: i64,
    },
    MoveSpeaker {
        speaker_id: SpeakerId,
        update: SpeakerUpdate,
    },
}

/// `None` means the drop changes nothing and no mutation must be sent.
pub fn plan_drag(board: &Board, drag: &DragEnd) -> Option<BoardCommand> {
    let Some(destination) = drag.destination.as_ref() else {
        debug!(draggable_id = %drag.draggable_id, "drag: dropped outside any target");
        return None;
    };
    if destination == &drag.source {
        debug!(draggable_id = %drag.draggable_id, "drag: dropped back in place");
        return None;
    }

    match drag.kind {
        DragKind::Project => {
            let Some(column) = board.column(&drag.draggable_id) else {
                warn!(project_id = %drag.draggable_id, "drag: unknown project");
                return None;
            };
            if column.is_absents() {
                debug!(project_id = %drag.draggable_id, "drag: absents column is pinned");
                return None;
            }
            Some(BoardCommand::ReorderProject {
                project: column.project().clone(),
                new_index: destination.index,
            })
        }
        DragKind::Speaker => {
            let Some(target) = board.column(&destination.droppable_id) else {
                warn!(column_id = %destination.droppable_id, "drag: unknown destination column");
                return None;
            };
            Some(BoardCommand::MoveSpeaker {
                speaker_id: SpeakerId::new(drag.draggable_id.clone()),
                update: SpeakerUpdate {
                    project_id: ProjectId::new(destination.droppable_id.clone()),
                    index: destination.index,
                    is_absent: matches!(target, BoardColumn::Absents(_)),
                },
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod tests;
