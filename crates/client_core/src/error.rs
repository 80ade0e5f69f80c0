use shared::{
    domain::{OfficeId, ProjectId, SpeakerId},
    error::ApiException,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("office {0} not found")]
    OfficeNotFound(OfficeId),
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),
    #[error("speaker {0} not found")]
    SpeakerNotFound(SpeakerId),
    #[error("{name} has neither a morning nor an afternoon slot")]
    NoAttendance { name: String },
    #[error("gateway rejected request: {0}")]
    Rejected(#[from] ApiException),
    #[error("gateway responded with status {status}")]
    Status { status: u16 },
}
