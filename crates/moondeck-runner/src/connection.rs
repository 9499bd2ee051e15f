//! Pre-flight checks before Moonlight is started.

use moondeck_core::{RunnerResult, GAMESTREAM_IDLE_ID};
use tracing::{info, warn};

use crate::collab::{BuddyApi, HostInfoQuery};
use crate::config::RunnerConfig;
use crate::error::RunOutcome;

/// Logs in to Buddy and makes sure GameStream is free to stream Steam.
pub struct ConnectionEstablisher<'a> {
    buddy: &'a dyn BuddyApi,
    host_info: &'a dyn HostInfoQuery,
    config: &'a RunnerConfig,
}

impl<'a> ConnectionEstablisher<'a> {
    pub fn new(
        buddy: &'a dyn BuddyApi,
        host_info: &'a dyn HostInfoQuery,
        config: &'a RunnerConfig,
    ) -> Self {
        Self {
            buddy,
            host_info,
            config,
        }
    }

    /// # Errors
    ///
    /// - Any Buddy login failure, unchanged
    /// - `GameStreamDead` if GameStream does not answer
    /// - `GameStreamBusy` if GameStream streams something other than Steam
    pub async fn establish(&self) -> RunOutcome {
        info!("Establishing connection to Buddy");
        self.buddy.login().await?;

        info!("Querying GameStream for running games");
        let info = self
            .host_info
            .server_info()
            .await
            .ok_or(RunnerResult::GameStreamDead)?;

        if info.current_game == self.config.gamestream_steam_id {
            info!("Steam is already being streamed");
            return Ok(());
        }
        if info.current_game == GAMESTREAM_IDLE_ID {
            return Ok(());
        }

        warn!(current_game = ?info.current_game, "GameStream is streaming another app");
        Err(RunnerResult::GameStreamBusy.into())
    }
}
