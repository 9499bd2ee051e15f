//! Front-end settings file access.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use moondeck_core::UserSettings;
use tracing::debug;

use super::SettingsStore;

/// Reads `settings.json` written by the MoonDeck front-end.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<UserSettings> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let settings: UserSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        debug!(
            path = %self.path.display(),
            hosts = settings.host_settings.len(),
            "Loaded user settings"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_selected_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(
            &path,
            r#"{
                "currentHostId": "abc",
                "clientId": "deck",
                "hostSettings": {
                    "abc": { "hostName": "gaming-pc", "address": "10.0.0.2", "buddyPort": 59000 }
                }
            }"#,
        )
        .await
        .unwrap();

        let settings = JsonSettingsStore::new(&path).load().await.unwrap();
        let host = settings.selected_host().unwrap();
        assert_eq!(host.address, "10.0.0.2");
        assert_eq!(host.buddy_port, 59000);
        assert_eq!(settings.client_id.as_deref(), Some("deck"));
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = JsonSettingsStore::new(&path).load().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
