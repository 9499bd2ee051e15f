//! Collaborators the run sequencing depends on.
//!
//! Each external actor sits behind a trait so the sequencers can be driven
//! by scripted fakes in tests:
//!
//! | Trait | Concrete implementation |
//! |-------|-------------------------|
//! | [`BuddyApi`] | [`BuddyClient`] (TCP, newline-delimited JSON) |
//! | [`HostInfoQuery`] | [`GameStreamHostInfo`] (HTTP `serverinfo`) |
//! | [`StreamingClient`] | [`MoonlightProxy`] (flatpak process) |
//! | [`SettingsStore`] | [`JsonSettingsStore`] |
//! | [`ResultSink`] | [`FileResultSink`] |

use async_trait::async_trait;
use moondeck_core::{AppId, RunnerResult, SessionStatus, UserSettings};
use moondeck_protocol::ServerInfo;

use crate::error::RunOutcome;

mod buddy;
mod hostinfo;
mod moonlight;
mod result_sink;
mod settings;

pub use buddy::BuddyClient;
pub use hostinfo::GameStreamHostInfo;
pub use moonlight::MoonlightProxy;
pub use result_sink::{FileResultSink, PersistedResult};
pub use settings::JsonSettingsStore;

/// Session control on the host.
///
/// Transport failures are reported as terminal results
/// (`BuddyUnreachable`, `BuddyRequestFailed`, `BuddyVersionMismatch`);
/// nothing here retries.
#[async_trait]
pub trait BuddyApi: Send + Sync {
    /// Opens the session with Buddy.
    async fn login(&self) -> RunOutcome;

    /// Fetches a fresh Steam status snapshot.
    async fn steam_status(&self) -> RunOutcome<SessionStatus>;

    /// Asks Steam to launch `app_id`.
    async fn launch_app(&self, app_id: AppId) -> RunOutcome;

    /// Asks Buddy to close Steam if it is still running.
    async fn close_steam(&self) -> RunOutcome;

    /// Closes the session. Never fails.
    async fn disconnect(&self);
}

/// GameStream status endpoint on the host.
#[async_trait]
pub trait HostInfoQuery: Send + Sync {
    /// Returns the server info, or `None` if GameStream did not answer.
    async fn server_info(&self) -> Option<ServerInfo>;
}

/// The local streaming client process.
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// Returns true if the client is installed.
    async fn is_installed(&self) -> anyhow::Result<bool>;

    /// Stops any client instances left over from earlier runs.
    async fn terminate_all_instances(&self) -> anyhow::Result<()>;

    /// Starts a fresh client instance.
    async fn start(&mut self) -> anyhow::Result<()>;

    /// Suspends until the started instance exits.
    async fn wait(&mut self);

    /// Stops the started instance, if any. Never fails.
    async fn terminate(&mut self);
}

/// Read access to the front-end's user settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<UserSettings>;
}

/// Where the outcome of a run is persisted for the front-end.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persists `result` (`None` for success), logging it if `log_result`.
    async fn set_result(
        &self,
        result: Option<RunnerResult>,
        log_result: bool,
    ) -> anyhow::Result<()>;
}
