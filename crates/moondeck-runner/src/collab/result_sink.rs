//! Persistence of the run outcome for the front-end.
//!
//! The file is replaced atomically (write to a sibling, then rename) so the
//! front-end never reads a half-written result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moondeck_core::RunnerResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ResultSink;

/// Contents of the result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedResult {
    /// Terminal result, `None` on success
    pub result: Option<RunnerResult>,

    /// When the result was recorded
    pub timestamp: DateTime<Utc>,
}

/// Writes the outcome to `runner_result.json`.
#[derive(Debug, Clone)]
pub struct FileResultSink {
    path: PathBuf,
}

impl FileResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads back the last persisted result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn read(&self) -> Result<PersistedResult> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }
}

#[async_trait]
impl ResultSink for FileResultSink {
    async fn set_result(&self, result: Option<RunnerResult>, log_result: bool) -> Result<()> {
        if log_result {
            match result {
                Some(result) => info!(%result, "Runner finished"),
                None => info!("Runner finished successfully"),
            }
        }

        let record = PersistedResult {
            result,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&record).context("Failed to serialize result")?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), result = ?record.result, "Result persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_result_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner_result.json");
        let sink = FileResultSink::new(&path);

        sink.set_result(Some(RunnerResult::MoonlightClosed), true)
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["result"], "MoonlightClosed");
        assert!(value["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_success_is_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner_result.json");
        let sink = FileResultSink::new(&path);

        sink.set_result(None, false).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["result"].is_null());
    }

    #[tokio::test]
    async fn test_later_result_replaces_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state");
        let sink = FileResultSink::new(state.join("runner_result.json"));

        sink.set_result(Some(RunnerResult::ClosedPrematurely), false)
            .await
            .unwrap();
        sink.set_result(Some(RunnerResult::GameStreamBusy), true)
            .await
            .unwrap();

        let persisted = sink.read().await.unwrap();
        assert_eq!(persisted.result, Some(RunnerResult::GameStreamBusy));
        assert!(!state.join("runner_result.json.tmp").exists());
    }
}
