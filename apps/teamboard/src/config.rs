use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::DEFAULT_SPEAKER_REFRESH;
use serde::Deserialize;
use shared::domain::CurrentUser;

pub const DEFAULT_CONFIG_FILE: &str = "teamboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gateway_url: String,
    pub username: String,
    pub photo_url: Option<String>,
    pub meet_url: String,
    pub speaker_refresh_secs: u64,
    pub log_filter: String,
    /// File backing `--offline` mode.
    pub offline_store: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:8080".into(),
            username: std::env::var("USER").unwrap_or_else(|_| "anonymous".into()),
            photo_url: None,
            meet_url: "meet.google.com".into(),
            speaker_refresh_secs: DEFAULT_SPEAKER_REFRESH.as_secs(),
            log_filter: "info".into(),
            offline_store: PathBuf::from("./data/teamboard.json"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    gateway_url: Option<String>,
    username: Option<String>,
    photo_url: Option<String>,
    meet_url: Option<String>,
    speaker_refresh_secs: Option<u64>,
    log_filter: Option<String>,
    offline_store: Option<PathBuf>,
}

impl Settings {
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            username: self.username.clone(),
            photo_url: self.photo_url.clone(),
        }
    }

    pub fn speaker_refresh(&self) -> Duration {
        Duration::from_secs(self.speaker_refresh_secs.max(1))
    }

    pub fn apply_toml(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.gateway_url {
            self.gateway_url = v;
        }
        if let Some(v) = file_cfg.username {
            self.username = v;
        }
        if let Some(v) = file_cfg.photo_url {
            self.photo_url = Some(v);
        }
        if let Some(v) = file_cfg.meet_url {
            self.meet_url = v;
        }
        if let Some(v) = file_cfg.speaker_refresh_secs {
            self.speaker_refresh_secs = v;
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
        if let Some(v) = file_cfg.offline_store {
            self.offline_store = v;
        }
        Ok(())
    }

    /// Later keys in each list win over earlier ones.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let pick = |keys: &[&str]| keys.iter().filter_map(|key| lookup(key)).last();

        if let Some(v) = pick(&["TEAMBOARD_GATEWAY_URL", "APP__GATEWAY_URL"]) {
            self.gateway_url = v;
        }
        if let Some(v) = pick(&["APP__USERNAME"]) {
            self.username = v;
        }
        if let Some(v) = pick(&["APP__PHOTO_URL"]) {
            self.photo_url = Some(v);
        }
        if let Some(v) = pick(&["APP__MEET_URL"]) {
            self.meet_url = v;
        }
        if let Some(v) = pick(&["APP__SPEAKER_REFRESH_SECS"]) {
            if let Ok(parsed) = v.parse::<u64>() {
                self.speaker_refresh_secs = parsed;
            }
        }
        if let Some(v) = pick(&["RUST_LOG", "APP__LOG_FILTER"]) {
            self.log_filter = v;
        }
        if let Some(v) = pick(&["APP__OFFLINE_STORE"]) {
            self.offline_store = PathBuf::from(v);
        }
    }
}

/// Defaults, then the TOML file, then the environment.
///
/// An explicitly requested file must exist; the default file is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_toml(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if config_path.is_none() && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config '{}'", path.display()))
        }
    }

    settings.apply_env_with(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
