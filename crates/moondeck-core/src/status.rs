//! Steam session status snapshots.

use serde::{Deserialize, Serialize};

use crate::AppId;

/// A single polled snapshot of the host's Steam session.
///
/// Produced fresh by every status request and never mutated; the next poll
/// supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Whether the Steam client is running on the host.
    pub steam_is_running: bool,

    /// App currently running in Steam, `None` while not yet determined.
    pub running_app_id: Option<AppId>,

    /// Last launched app if Steam is still updating it.
    pub updating_app_id: Option<AppId>,
}

impl SessionStatus {
    /// Returns true if Steam is up and `app_id` is the running app.
    #[must_use]
    pub fn is_running(&self, app_id: AppId) -> bool {
        self.steam_is_running && self.running_app_id == Some(app_id)
    }

    /// Returns true if Steam is up and still updating `app_id`.
    #[must_use]
    pub fn is_updating(&self, app_id: AppId) -> bool {
        self.steam_is_running && self.updating_app_id == Some(app_id)
    }

    /// Returns true if Steam has not settled on a running app yet.
    #[must_use]
    pub fn running_app_unknown(&self) -> bool {
        self.running_app_id.is_none()
    }
}
