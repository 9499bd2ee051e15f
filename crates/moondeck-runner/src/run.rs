//! One complete run against a host.
//!
//! [`RunSequencer`] owns the Buddy client and the streaming client for the
//! duration of the run and releases both exactly once when it ends, however
//! it ends.
//!
//! # Moonlight vs. launch race
//!
//! Once Moonlight is started, two things are awaited on the same task:
//!
//! ```text
//!   launch sequence ──► finishes first ──► its result
//!   Moonlight exit  ──► finishes first ──► grace period for the launch
//!                                           ├─ launch finishes ──► its result
//!                                           └─ still running ────► cancel, MoonlightClosed
//! ```
//!
//! The launch side listens to a child [`CancellationToken`] with priority,
//! so once cancelled it stops at its next await point and no further Buddy
//! request is made.

use moondeck_core::{AppId, HostSettings, RunnerResult};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::collab::{
    BuddyApi, BuddyClient, GameStreamHostInfo, HostInfoQuery, MoonlightProxy, StreamingClient,
};
use crate::config::RunnerConfig;
use crate::connection::ConnectionEstablisher;
use crate::error::{into_result, RunOutcome};
use crate::launch::LaunchSequencer;

/// Runs the full sequence for one app on one host.
pub struct RunSequencer {
    buddy: Box<dyn BuddyApi>,
    host_info: Box<dyn HostInfoQuery>,
    streaming: Box<dyn StreamingClient>,
    config: RunnerConfig,
    cancel_token: CancellationToken,
}

impl RunSequencer {
    pub fn new(
        buddy: Box<dyn BuddyApi>,
        host_info: Box<dyn HostInfoQuery>,
        streaming: Box<dyn StreamingClient>,
        config: RunnerConfig,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            buddy,
            host_info,
            streaming,
            config,
            cancel_token,
        }
    }

    /// Runs the sequence to completion and releases all resources.
    ///
    /// Returns `None` on success, otherwise the terminal result. Cancelling
    /// the token ends the run with `ClosedPrematurely`.
    pub async fn run(mut self, app_id: AppId) -> Option<RunnerResult> {
        let cancel_token = self.cancel_token.clone();

        let outcome: RunOutcome = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                warn!("Run cancelled");
                Err(RunnerResult::ClosedPrematurely.into())
            }
            outcome = self.sequence(app_id) => outcome,
        };

        self.release().await;
        into_result(outcome)
    }

    async fn sequence(&mut self, app_id: AppId) -> RunOutcome {
        ConnectionEstablisher::new(&*self.buddy, &*self.host_info, &self.config)
            .establish()
            .await?;

        self.start_streaming_client().await?;
        self.race(app_id).await
    }

    async fn start_streaming_client(&mut self) -> RunOutcome {
        info!("Checking if Moonlight is installed");
        if !self.streaming.is_installed().await? {
            return Err(RunnerResult::MoonlightIsNotInstalled.into());
        }

        info!("Terminating all Moonlight instances if any");
        self.streaming.terminate_all_instances().await?;

        info!("Starting Moonlight");
        self.streaming.start().await?;
        Ok(())
    }

    /// Races the launch sequence against the streaming client exiting.
    async fn race(&mut self, app_id: AppId) -> RunOutcome {
        let Self {
            buddy,
            host_info,
            streaming,
            config,
            cancel_token,
        } = self;

        let grace = config.timings.grace_period();
        let launcher = LaunchSequencer::new(&**buddy, &**host_info, config);
        let launch_token = cancel_token.child_token();
        let launch = async {
            tokio::select! {
                biased;
                _ = launch_token.cancelled() => None,
                outcome = launcher.run(app_id) => Some(outcome),
            }
        };
        tokio::pin!(launch);

        tokio::select! {
            biased;
            outcome = &mut launch => {
                outcome.unwrap_or_else(|| Err(RunnerResult::ClosedPrematurely.into()))
            }
            () = streaming.wait() => {
                info!(
                    grace_ms = grace.as_millis() as u64,
                    "Moonlight exited, giving the launch sequence a grace period"
                );

                match timeout(grace, &mut launch).await {
                    Ok(Some(outcome)) => outcome,
                    Ok(None) => Err(RunnerResult::MoonlightClosed.into()),
                    Err(_) => {
                        launch_token.cancel();
                        // Resolves at once: the token is checked first
                        let _ = (&mut launch).await;
                        debug!("Launch sequence cancelled");
                        Err(RunnerResult::MoonlightClosed.into())
                    }
                }
            }
        }
    }

    async fn release(&mut self) {
        debug!("Releasing run resources");
        self.streaming.terminate().await;
        self.buddy.disconnect().await;
    }
}

/// Builds the collaborators for a run against one host.
pub trait SessionFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if a collaborator cannot be constructed.
    fn create(
        &self,
        host: &HostSettings,
        client_id: Option<String>,
    ) -> anyhow::Result<RunSequencer>;
}

/// Wires the real Buddy, GameStream and Moonlight collaborators.
#[derive(Debug, Clone)]
pub struct DefaultSessionFactory {
    config: RunnerConfig,
    cancel_token: CancellationToken,
}

impl DefaultSessionFactory {
    pub fn new(config: RunnerConfig, cancel_token: CancellationToken) -> Self {
        Self {
            config,
            cancel_token,
        }
    }
}

impl SessionFactory for DefaultSessionFactory {
    fn create(
        &self,
        host: &HostSettings,
        client_id: Option<String>,
    ) -> anyhow::Result<RunSequencer> {
        let timings = &self.config.timings;

        let buddy = BuddyClient::new(
            host.address.clone(),
            host.buddy_port,
            client_id,
            timings.request_timeout(),
        );
        let host_info = GameStreamHostInfo::new(
            &host.address,
            self.config.gamestream_port,
            timings.request_timeout(),
        )?;
        let moonlight = MoonlightProxy::new(
            self.config.moonlight_app.clone(),
            host.host_name.clone(),
            self.config.stream_app.clone(),
        );

        Ok(RunSequencer::new(
            Box::new(buddy),
            Box::new(host_info),
            Box::new(moonlight),
            self.config.clone(),
            self.cancel_token.clone(),
        ))
    }
}
