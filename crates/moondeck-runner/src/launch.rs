//! Launch sequence: from "Moonlight is up" to "the game has closed".
//!
//! Phases, each of which may end the run with a terminal result:
//!
//! 1. Wait for GameStream to report it is streaming Steam
//! 2. Wait for Steam to settle ([`ReadinessWatchdog`])
//! 3. Launch the app, re-sending the request when an update finishes
//!    without the app starting ([`LaunchWatchdog`])
//! 4. Wait for the app to close ([`CloseWatchdog`])
//! 5. Ask Buddy to close Steam

use moondeck_core::{AppId, RunnerResult};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::collab::{BuddyApi, HostInfoQuery};
use crate::config::RunnerConfig;
use crate::error::RunOutcome;
use crate::poller::{poll_status, PollExit, Watchdog};
use crate::watchdog::{CloseWatchdog, LaunchWatchdog, ReadinessWatchdog};

/// `serverinfo` queries made while waiting for GameStream to stream Steam.
pub const STEAM_STREAM_RETRIES: u32 = 30;

/// Launch requests sent before giving up on an app that keeps updating.
pub const LAUNCH_ATTEMPTS: u32 = 5;

/// Drives one app from launch request to shutdown.
pub struct LaunchSequencer<'a> {
    buddy: &'a dyn BuddyApi,
    host_info: &'a dyn HostInfoQuery,
    config: &'a RunnerConfig,
}

impl<'a> LaunchSequencer<'a> {
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

    /// Runs all phases in order.
    ///
    /// # Errors
    ///
    /// Returns the terminal result of the first phase that fails.
    pub async fn run(&self, app_id: AppId) -> RunOutcome {
        info!("Waiting for GameStream to stream Steam");
        self.wait_for_steam_stream().await?;

        info!(%app_id, "Waiting for Steam to be ready");
        self.poll(&mut ReadinessWatchdog::new(app_id, &self.config.timings))
            .await?;

        self.launch_app(app_id).await?;

        info!(%app_id, "Waiting for app or Steam to close");
        self.poll(&mut CloseWatchdog::new(app_id, &self.config.timings))
            .await?;

        info!("App closed, asking to close Steam if it is still open");
        self.buddy.close_steam().await
    }

    async fn poll<W: Watchdog>(&self, watchdog: &mut W) -> RunOutcome<PollExit> {
        poll_status(|| self.buddy.steam_status(), watchdog).await
    }

    /// Polls `serverinfo` until it reports Steam as the current game.
    async fn wait_for_steam_stream(&self) -> RunOutcome {
        let steam_id = self.config.gamestream_steam_id;

        for attempt in 1..=STEAM_STREAM_RETRIES {
            let info = self
                .host_info
                .server_info()
                .await
                .ok_or(RunnerResult::GameStreamDead)?;

            if info.current_game == steam_id {
                debug!(attempt, "GameStream is streaming Steam");
                return Ok(());
            }

            if attempt < STEAM_STREAM_RETRIES {
                sleep(self.config.timings.poll_interval()).await;
            }
        }

        warn!(
            attempts = STEAM_STREAM_RETRIES,
            "GameStream never started streaming Steam"
        );
        Err(RunnerResult::SteamLaunchFailed.into())
    }

    /// Sends the launch request and waits for the app to run.
    ///
    /// An update finishing without the app starting leaves the earlier
    /// request stale, so it is sent again, up to [`LAUNCH_ATTEMPTS`] times.
    async fn launch_app(&self, app_id: AppId) -> RunOutcome {
        for attempt in 1..=LAUNCH_ATTEMPTS {
            info!(%app_id, attempt, "Launching app");
            self.buddy.launch_app(app_id).await?;

            let mut watchdog = LaunchWatchdog::new(app_id, &self.config.timings);
            match self.poll(&mut watchdog).await? {
                PollExit::Success => {
                    info!(%app_id, "App is running");
                    return Ok(());
                }
                PollExit::AppFinishedUpdating => {
                    debug!(%app_id, attempt, "App finished updating without starting");
                }
            }
        }

        warn!(%app_id, attempts = LAUNCH_ATTEMPTS, "Giving up waiting for app to finish updating");
        Err(RunnerResult::AppUpdateNeverSettled.into())
    }
}
