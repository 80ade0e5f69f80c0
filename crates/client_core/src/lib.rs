//! View-models and gateway access for the offices and stand-up pages.

pub mod board;
pub mod drag;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod http_gateway;
pub mod memory_gateway;
pub mod notify;
pub mod presence;

pub use board::{AbsentsColumn, Board, BoardColumn, BoardController, ProjectColumn};
pub use drag::{plan_drag, BoardCommand, DragEnd, DragKind, DropLocation};
pub use error::GatewayError;
pub use feed::{FeedState, SpeakerFeed, DEFAULT_SPEAKER_REFRESH};
pub use gateway::{Gateway, OfficeGateway, StandupGateway};
pub use http_gateway::HttpGateway;
pub use memory_gateway::{MemoryGateway, Snapshot};
pub use notify::{Notification, Notifier};
pub use presence::{
    plan_toggle, ClearAllPresence, DayPresence, OfficeDayView, PresenceBoard, PresenceChange,
    PresenceController, WeekdayView,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
