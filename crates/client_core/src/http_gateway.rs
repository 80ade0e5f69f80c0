//! REST client for the remote store, plus its websocket change feed.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use shared::{
    domain::{Office, OfficeId, OfficeWorker, Project, Speaker, SpeakerId, Weekday},
    error::{ApiError, ApiException},
    protocol::{GatewayEvent, NameRequest, ReorderProjectRequest, SpeakerUpdate},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::GatewayError,
    gateway::{Gateway, OfficeGateway, StandupGateway},
};

pub struct HttpGateway {
    http: Client,
    base_url: Url,
    events: broadcast::Sender<GatewayEvent>,
    change_feed: Mutex<Option<JoinHandle<()>>>,
}

/// Maps a non-2xx response to [`GatewayError`], decoding the store's error body when present.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<ApiError>().await {
        Ok(body) => Err(GatewayError::Rejected(ApiException::from(body)).into()),
        Err(_) => Err(GatewayError::Status {
            status: status.as_u16(),
        }
        .into()),
    }
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid gateway url: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("gateway url must be hierarchical: {base_url}"));
        }
        let (events, _) = broadcast::channel(256);
        Ok(Self {
            http: Client::new(),
            base_url,
            events,
            change_feed: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("gateway url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn change_feed_url(&self) -> Result<Url> {
        let mut url = self.endpoint(&["ws"])?;
        let scheme = match url.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => return Err(anyhow!("gateway url must be http or https, got {other}")),
        };
        url.set_scheme(scheme)
            .map_err(|_| anyhow!("cannot derive websocket url from {}", self.base_url))?;
        Ok(url)
    }

    /// Starts forwarding the store's change feed to [`Gateway::subscribe`] receivers.
    pub async fn connect_change_feed(&self) -> Result<()> {
        let mut guard = self.change_feed.lock().await;
        if guard.as_ref().is_some_and(|task| !task.is_finished()) {
            return Ok(());
        }

        let ws_url = self.change_feed_url()?;
        let (ws_stream, _) = connect_async(ws_url.as_str())
            .await
            .with_context(|| format!("failed to connect change feed: {ws_url}"))?;
        let (_, mut ws_reader) = ws_stream.split();
        info!(url = %ws_url, "gateway: change feed connected");

        let events = self.events.clone();
        *guard = Some(tokio::spawn(async move {
            while let Some(msg) = ws_reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<GatewayEvent>(&text) {
                        Ok(event) => {
                            debug!(?event, "gateway: change received");
                            let _ = events.send(event);
                        }
                        Err(err) => warn!(error = %err, "gateway: invalid change event"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!(error = %err, "gateway: change feed receive failed");
                        break;
                    }
                }
            }
            info!("gateway: change feed closed");
        }));
        Ok(())
    }
}

impl Drop for HttpGateway {
    fn drop(&mut self) {
        if let Some(task) = self.change_feed.get_mut().take() {
            task.abort();
        }
    }
}

#[async_trait]
impl OfficeGateway for HttpGateway {
    async fn list_offices(&self) -> Result<Vec<Office>> {
        let url = self.endpoint(&["offices"])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to list offices")?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn add_office(&self, name: &str) -> Result<Office> {
        let url = self.endpoint(&["offices"])?;
        let response = self
            .http
            .post(url)
            .json(&NameRequest {
                name: name.to_string(),
            })
            .send()
            .await
            .context("failed to add office")?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn delete_office(&self, office_id: &OfficeId) -> Result<()> {
        let url = self.endpoint(&["offices", office_id.as_str()])?;
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .with_context(|| format!("failed to delete office {office_id}"))?;
        check_status(response).await?;
        Ok(())
    }

    async fn add_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()> {
        let url = self.endpoint(&["offices", office_id.as_str(), "presence", day.wire_name()])?;
        let response = self
            .http
            .post(url)
            .json(person)
            .send()
            .await
            .with_context(|| format!("failed to add presence to office {office_id}"))?;
        check_status(response).await?;
        Ok(())
    }

    async fn remove_person(
        &self,
        office_id: &OfficeId,
        day: Weekday,
        person: &OfficeWorker,
    ) -> Result<()> {
        let url = self.endpoint(&[
            "offices",
            office_id.as_str(),
            "presence",
            day.wire_name(),
            "remove",
        ])?;
        let response = self
            .http
            .post(url)
            .json(person)
            .send()
            .await
            .with_context(|| format!("failed to remove presence from office {office_id}"))?;
        check_status(response).await?;
        Ok(())
    }

    async fn clear_all_presence(&self) -> Result<()> {
        let url = self.endpoint(&["offices", "presence", "clear"])?;
        let response = self
            .http
            .post(url)
            .send()
            .await
            .context("failed to clear presence")?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl StandupGateway for HttpGateway {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = self.endpoint(&["projects"])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to list projects")?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn add_project(&self, name: &str) -> Result<Project> {
        let url = self.endpoint(&["projects"])?;
        let response = self
            .http
            .post(url)
            .json(&NameRequest {
                name: name.to_string(),
            })
            .send()
            .await
            .context("failed to add project")?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn reorder_project(&self, project: &Project, new_index: i64) -> Result<Project> {
        let url = self.endpoint(&["projects", project.id.as_str(), "reorder"])?;
        let response = self
            .http
            .post(url)
            .json(&ReorderProjectRequest { new_index })
            .send()
            .await
            .with_context(|| format!("failed to reorder project {}", project.id))?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn list_speakers(&self) -> Result<Vec<Speaker>> {
        let url = self.endpoint(&["speakers"])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to list speakers")?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn update_speaker(
        &self,
        speaker_id: &SpeakerId,
        update: &SpeakerUpdate,
    ) -> Result<Speaker> {
        let url = self.endpoint(&["speakers", speaker_id.as_str()])?;
        let response = self
            .http
            .patch(url)
            .json(update)
            .send()
            .await
            .with_context(|| format!("failed to update speaker {speaker_id}"))?;
        Ok(check_status(response).await?.json().await?)
    }
}

impl Gateway for HttpGateway {
    fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/http_gateway_tests.rs"]
mod tests;
