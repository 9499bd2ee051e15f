//! Scripted collaborators shared by the integration tests.
//!
//! Every fake counts its calls through `Arc`'d atomics so a test can keep a
//! handle after the fake is moved into a `RunSequencer`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use moondeck_core::{
    AppId, GameStreamAppId, HostSettings, RunnerResult, SessionStatus, UserSettings,
    GAMESTREAM_IDLE_ID, GAMESTREAM_STEAM_ID,
};
use moondeck_protocol::ServerInfo;
use moondeck_runner::collab::{BuddyApi, HostInfoQuery, ResultSink, SettingsStore, StreamingClient};
use moondeck_runner::{RunOutcome, RunSequencer, RunnerConfig, SessionFactory};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Statuses
// ============================================================================

pub const TARGET: u32 = 570;
pub const OTHER: u32 = 440;

pub fn app(id: u32) -> AppId {
    AppId::new(id).unwrap()
}

pub fn running(id: u32) -> SessionStatus {
    SessionStatus {
        steam_is_running: true,
        running_app_id: AppId::from_wire(id),
        updating_app_id: None,
    }
}

pub fn updating(id: u32) -> SessionStatus {
    SessionStatus {
        steam_is_running: true,
        running_app_id: None,
        updating_app_id: AppId::from_wire(id),
    }
}

pub fn front_end() -> SessionStatus {
    running(AppId::STEAM_FRONTEND.get())
}

// ============================================================================
// Buddy
// ============================================================================

#[derive(Debug, Default)]
pub struct BuddyCounters {
    pub logins: AtomicUsize,
    pub status_polls: AtomicUsize,
    pub launches: AtomicUsize,
    pub close_steam: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub drops: AtomicUsize,
    polls_since_launch: AtomicUsize,
}

impl BuddyCounters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Where in the run a status poll happens.
#[derive(Debug, Clone, Copy)]
pub struct Poll {
    /// Status polls before this one
    pub index: usize,
    /// Launch requests sent so far
    pub launches: usize,
    /// Polls since the last launch request (0 = first poll after it)
    pub since_launch: usize,
}

type StatusScript = Box<dyn Fn(Poll) -> SessionStatus + Send + Sync>;

/// Buddy whose status answers come from a script.
pub struct ScriptedBuddy {
    pub counters: Arc<BuddyCounters>,
    script: StatusScript,
    login_failure: Option<RunnerResult>,
    launch_failure: Option<RunnerResult>,
}

impl ScriptedBuddy {
    pub fn new(script: impl Fn(Poll) -> SessionStatus + Send + Sync + 'static) -> Self {
        Self {
            counters: Arc::new(BuddyCounters::default()),
            script: Box::new(script),
            login_failure: None,
            launch_failure: None,
        }
    }

    /// Steam settles on the front-end, the app starts on the first launch
    /// request and closes after `play_polls` close polls.
    pub fn plays_for(play_polls: usize) -> Self {
        Self::new(move |poll| {
            if poll.launches == 0 || poll.since_launch > play_polls {
                front_end()
            } else {
                running(TARGET)
            }
        })
    }

    pub fn failing_login(mut self, result: RunnerResult) -> Self {
        self.login_failure = Some(result);
        self
    }

    pub fn failing_launch(mut self, result: RunnerResult) -> Self {
        self.launch_failure = Some(result);
        self
    }
}

#[async_trait]
impl BuddyApi for ScriptedBuddy {
    async fn login(&self) -> RunOutcome {
        self.counters.logins.fetch_add(1, Ordering::SeqCst);
        match self.login_failure {
            Some(result) => Err(result.into()),
            None => Ok(()),
        }
    }

    async fn steam_status(&self) -> RunOutcome<SessionStatus> {
        let poll = Poll {
            index: self.counters.status_polls.fetch_add(1, Ordering::SeqCst),
            launches: self.counters.launches.load(Ordering::SeqCst),
            since_launch: self
                .counters
                .polls_since_launch
                .fetch_add(1, Ordering::SeqCst),
        };
        Ok((self.script)(poll))
    }

    async fn launch_app(&self, _app_id: AppId) -> RunOutcome {
        if let Some(result) = self.launch_failure {
            return Err(result.into());
        }
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        self.counters.polls_since_launch.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn close_steam(&self) -> RunOutcome {
        self.counters.close_steam.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) {
        self.counters.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for ScriptedBuddy {
    fn drop(&mut self) {
        self.counters.drops.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// GameStream
// ============================================================================

type ServerInfoScript = Box<dyn Fn(usize) -> Option<GameStreamAppId> + Send + Sync>;

/// GameStream whose `currentgame` comes from a script indexed by query.
pub struct ScriptedHostInfo {
    pub queries: Arc<AtomicUsize>,
    script: ServerInfoScript,
}

impl ScriptedHostInfo {
    pub fn new(script: impl Fn(usize) -> Option<GameStreamAppId> + Send + Sync + 'static) -> Self {
        Self {
            queries: Arc::new(AtomicUsize::new(0)),
            script: Box::new(script),
        }
    }

    pub fn streaming_steam() -> Self {
        Self::new(|_| Some(GAMESTREAM_STEAM_ID))
    }

    pub fn idle() -> Self {
        Self::new(|_| Some(GAMESTREAM_IDLE_ID))
    }

    pub fn dead() -> Self {
        Self::new(|_| None)
    }

    /// Idle for the first `queries` answers, then streaming Steam.
    pub fn steam_after(queries: usize) -> Self {
        Self::new(move |query| {
            if query < queries {
                Some(GAMESTREAM_IDLE_ID)
            } else {
                Some(GAMESTREAM_STEAM_ID)
            }
        })
    }
}

#[async_trait]
impl HostInfoQuery for ScriptedHostInfo {
    async fn server_info(&self) -> Option<ServerInfo> {
        let query = self.queries.fetch_add(1, Ordering::SeqCst);
        (self.script)(query).map(|current_game| ServerInfo { current_game })
    }
}

// ============================================================================
// Moonlight
// ============================================================================

#[derive(Debug, Default)]
pub struct MoonlightCounters {
    pub terminate_all: AtomicUsize,
    pub starts: AtomicUsize,
    pub terminates: AtomicUsize,
    pub drops: AtomicUsize,
}

/// Streaming client that exits after a fixed time, or never.
pub struct FakeMoonlight {
    pub counters: Arc<MoonlightCounters>,
    installed: bool,
    fail_start: bool,
    exit_after: Option<Duration>,
}

impl FakeMoonlight {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(MoonlightCounters::default()),
            installed: true,
            fail_start: false,
            exit_after: None,
        }
    }

    pub fn exiting_after(mut self, after: Duration) -> Self {
        self.exit_after = Some(after);
        self
    }

    pub fn not_installed(mut self) -> Self {
        self.installed = false;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

#[async_trait]
impl StreamingClient for FakeMoonlight {
    async fn is_installed(&self) -> anyhow::Result<bool> {
        Ok(self.installed)
    }

    async fn terminate_all_instances(&self) -> anyhow::Result<()> {
        self.counters.terminate_all.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start(&mut self) -> anyhow::Result<()> {
        if self.fail_start {
            anyhow::bail!("flatpak exploded");
        }
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait(&mut self) {
        match self.exit_after {
            Some(after) => tokio::time::sleep(after).await,
            None => std::future::pending::<()>().await,
        }
    }

    async fn terminate(&mut self) {
        self.counters.terminates.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for FakeMoonlight {
    fn drop(&mut self) {
        self.counters.drops.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Run assembly
// ============================================================================

/// Handles kept by a test after the fakes move into the sequencer.
pub struct Handles {
    pub buddy: Arc<BuddyCounters>,
    pub host_queries: Arc<AtomicUsize>,
    pub moonlight: Arc<MoonlightCounters>,
}

impl Handles {
    /// Asserts both clients were released exactly once.
    pub fn assert_released_once(&self) {
        assert_eq!(
            BuddyCounters::get(&self.buddy.disconnects),
            1,
            "buddy disconnects"
        );
        assert_eq!(
            self.moonlight.terminates.load(Ordering::SeqCst),
            1,
            "moonlight terminations"
        );
    }

    /// Asserts both clients were dropped, released or not.
    pub fn assert_dropped(&self) {
        assert_eq!(BuddyCounters::get(&self.buddy.drops), 1, "buddy drops");
        assert_eq!(
            self.moonlight.drops.load(Ordering::SeqCst),
            1,
            "moonlight drops"
        );
    }

    pub fn status_polls(&self) -> usize {
        BuddyCounters::get(&self.buddy.status_polls)
    }

    pub fn launches(&self) -> usize {
        BuddyCounters::get(&self.buddy.launches)
    }

    pub fn close_steam(&self) -> usize {
        BuddyCounters::get(&self.buddy.close_steam)
    }
}

pub fn sequencer(
    buddy: ScriptedBuddy,
    host_info: ScriptedHostInfo,
    moonlight: FakeMoonlight,
    cancel_token: CancellationToken,
) -> (RunSequencer, Handles) {
    let handles = Handles {
        buddy: Arc::clone(&buddy.counters),
        host_queries: Arc::clone(&host_info.queries),
        moonlight: Arc::clone(&moonlight.counters),
    };

    let sequencer = RunSequencer::new(
        Box::new(buddy),
        Box::new(host_info),
        Box::new(moonlight),
        RunnerConfig::default(),
        cancel_token,
    );
    (sequencer, handles)
}

// ============================================================================
// Top level
// ============================================================================

pub fn host() -> HostSettings {
    HostSettings {
        host_name: "gaming-pc".to_string(),
        address: "10.0.0.2".to_string(),
        buddy_port: 59999,
    }
}

pub fn settings_with_host() -> UserSettings {
    UserSettings {
        current_host_id: Some("abc".to_string()),
        host_settings: HashMap::from([("abc".to_string(), host())]),
        client_id: Some("deck".to_string()),
    }
}

/// Settings store returning fixed settings, or failing if there are none.
pub struct StaticSettings(pub Option<UserSettings>);

#[async_trait]
impl SettingsStore for StaticSettings {
    async fn load(&self) -> anyhow::Result<UserSettings> {
        self.0
            .clone()
            .ok_or_else(|| anyhow::anyhow!("settings.json is unreadable"))
    }
}

type Records = Arc<Mutex<Vec<(Option<RunnerResult>, bool)>>>;

/// Records every persisted result with its log flag.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub records: Records,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<(Option<RunnerResult>, bool)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn set_result(
        &self,
        result: Option<RunnerResult>,
        log_result: bool,
    ) -> anyhow::Result<()> {
        self.records.lock().unwrap().push((result, log_result));
        Ok(())
    }
}

type Requested = Arc<Mutex<Vec<(HostSettings, Option<String>)>>>;

/// Hands out a prepared sequencer once and records the host it was asked for.
pub struct PreparedFactory {
    sequencer: Mutex<Option<RunSequencer>>,
    pub requested: Requested,
}

impl PreparedFactory {
    pub fn new(sequencer: RunSequencer) -> Self {
        Self {
            sequencer: Mutex::new(Some(sequencer)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl SessionFactory for PreparedFactory {
    fn create(
        &self,
        host: &HostSettings,
        client_id: Option<String>,
    ) -> anyhow::Result<RunSequencer> {
        self.requested
            .lock()
            .unwrap()
            .push((host.clone(), client_id));
        self.sequencer
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow::anyhow!("sequencer already handed out"))
    }
}
