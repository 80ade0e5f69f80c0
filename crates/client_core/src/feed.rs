//! Speaker list kept fresh by polling, with change events as an early trigger.
//!
//! Staleness is bounded by the refresh interval even when the change feed is
//! silent or closed.

use std::{sync::Arc, time::Duration};

use shared::{domain::Speaker, protocol::GatewayEvent};
use tokio::{
    sync::{broadcast, broadcast::error::RecvError, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, warn};

use crate::gateway::Gateway;

pub const DEFAULT_SPEAKER_REFRESH: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FeedState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            FeedState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

pub struct SpeakerFeed {
    state: watch::Receiver<FeedState<Vec<Speaker>>>,
    task: JoinHandle<()>,
}

impl SpeakerFeed {
    pub fn spawn(gateway: Arc<dyn Gateway>, refresh: Duration) -> Self {
        let (tx, state) = watch::channel(FeedState::Loading);
        let task = tokio::spawn(run_feed(gateway, refresh, tx));
        Self { state, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<Vec<Speaker>>> {
        self.state.clone()
    }

    pub fn current(&self) -> FeedState<Vec<Speaker>> {
        self.state.borrow().clone()
    }
}

impl Drop for SpeakerFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn next_change(
    changes: &mut broadcast::Receiver<GatewayEvent>,
    open: bool,
) -> Result<GatewayEvent, RecvError> {
    if !open {
        return std::future::pending().await;
    }
    changes.recv().await
}

async fn run_feed(
    gateway: Arc<dyn Gateway>,
    refresh: Duration,
    tx: watch::Sender<FeedState<Vec<Speaker>>>,
) {
    let mut ticker = tokio::time::interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut changes = gateway.subscribe();
    let mut changes_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            event = next_change(&mut changes, changes_open) => match event {
                Ok(GatewayEvent::SpeakersChanged) | Err(RecvError::Lagged(_)) => {}
                Ok(_) => continue,
                Err(RecvError::Closed) => {
                    debug!("speaker feed: change feed closed; polling only");
                    changes_open = false;
                    continue;
                }
            },
        }

        match gateway.list_speakers().await {
            Ok(speakers) => {
                debug!(count = speakers.len(), "speaker feed: refreshed");
                if tx.send(FeedState::Ready(speakers)).is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "speaker feed: refresh failed");
                // Keep the last good list; only a feed that never loaded reports failure.
                let never_loaded = tx.borrow().ready().is_none();
                if never_loaded && tx.send(FeedState::Failed(err.to_string())).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
