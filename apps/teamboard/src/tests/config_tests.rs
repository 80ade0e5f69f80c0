use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn toml_overrides_only_present_keys() {
    let mut settings = Settings::default();
    let defaults = settings.clone();
    settings
        .apply_toml(
            r#"
            gateway_url = "https://store.example.test"
            username = "alice"
            speaker_refresh_secs = 30
            "#,
        )
        .expect("toml");

    assert_eq!(settings.gateway_url, "https://store.example.test");
    assert_eq!(settings.username, "alice");
    assert_eq!(settings.speaker_refresh(), Duration::from_secs(30));
    assert_eq!(settings.meet_url, defaults.meet_url);
    assert_eq!(settings.photo_url, None);
}

#[test]
fn invalid_toml_is_an_error() {
    let mut settings = Settings::default();
    assert!(settings.apply_toml("speaker_refresh_secs = \"soon\"").is_err());
}

#[test]
fn env_overrides_file_values_and_prefers_app_prefix() {
    let mut settings = Settings::default();
    settings
        .apply_toml(r#"gateway_url = "http://from-file""#)
        .expect("toml");

    let vars: HashMap<&str, &str> = HashMap::from([
        ("TEAMBOARD_GATEWAY_URL", "http://legacy"),
        ("APP__GATEWAY_URL", "http://from-env"),
        ("APP__PHOTO_URL", "https://example.test/me.png"),
        ("APP__SPEAKER_REFRESH_SECS", "not-a-number"),
    ]);
    settings.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.gateway_url, "http://from-env");
    assert_eq!(
        settings.current_user().photo_url.as_deref(),
        Some("https://example.test/me.png")
    );
    assert_eq!(settings.speaker_refresh(), DEFAULT_SPEAKER_REFRESH);
}

#[test]
fn zero_refresh_is_clamped() {
    let settings = Settings {
        speaker_refresh_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.speaker_refresh(), Duration::from_secs(1));
}

#[test]
fn explicit_missing_config_file_fails() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("teamboard_missing_{suffix}.toml"));

    let err = load_settings(Some(&missing)).expect_err("must fail");
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn explicit_config_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("teamboard_config_{suffix}.toml"));
    fs::write(&path, "meet_url = \"meet.example.test/abc\"\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("settings");
    assert_eq!(settings.meet_url, "meet.example.test/abc");

    fs::remove_file(path).expect("cleanup");
}
