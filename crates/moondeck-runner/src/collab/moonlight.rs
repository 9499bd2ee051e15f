//! Moonlight flatpak process control.
//!
//! The client is started through `flatpak run`, which leaves the actual
//! Moonlight process inside a sandbox. Killing our direct child is therefore
//! followed by `flatpak kill` to make sure the sandboxed instance is gone too.

use std::io;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sysinfo::{Pid, Signal, System};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::StreamingClient;

const FLATPAK: &str = "flatpak";

/// Process name fragment identifying Moonlight instances.
const PROCESS_NAME: &str = "moonlight";

/// Starts and stops the Moonlight client for one host.
#[derive(Debug)]
pub struct MoonlightProxy {
    app: String,
    host_name: String,
    stream_app: String,
    child: Option<Child>,
}

impl MoonlightProxy {
    pub fn new(
        app: impl Into<String>,
        host_name: impl Into<String>,
        stream_app: impl Into<String>,
    ) -> Self {
        Self {
            app: app.into(),
            host_name: host_name.into(),
            stream_app: stream_app.into(),
            child: None,
        }
    }

    /// Arguments passed to `flatpak` to start streaming.
    fn stream_args(&self) -> [&str; 5] {
        let host = self.host_name.as_str();
        ["run", &self.app, "stream", host, &self.stream_app]
    }

    async fn flatpak_kill(&self) {
        let status = Command::new(FLATPAK)
            .args(["kill", &self.app])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => debug!(app = %self.app, "Killed flatpak instance"),
            Ok(status) => debug!(app = %self.app, %status, "No flatpak instance to kill"),
            Err(e) => debug!(app = %self.app, error = %e, "Failed to run flatpak kill"),
        }
    }
}

/// Sends SIGTERM to every process whose name looks like Moonlight.
///
/// Blocking; call via `spawn_blocking`.
fn kill_stray_processes() -> usize {
    let own_pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_all();

    let mut killed = 0;
    for (pid, process) in system.processes() {
        if *pid == own_pid {
            continue;
        }
        let name = process.name().to_string_lossy().to_ascii_lowercase();
        if !name.contains(PROCESS_NAME) {
            continue;
        }
        if process.kill_with(Signal::Term).unwrap_or(false) {
            debug!(pid = pid.as_u32(), name = %name, "Terminated stray Moonlight process");
            killed += 1;
        }
    }
    killed
}

#[async_trait]
impl StreamingClient for MoonlightProxy {
    async fn is_installed(&self) -> Result<bool> {
        let status = Command::new(FLATPAK)
            .args(["info", &self.app])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => Ok(status.success()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("flatpak is not available");
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to run flatpak info"),
        }
    }

    async fn terminate_all_instances(&self) -> Result<()> {
        self.flatpak_kill().await;

        let killed = tokio::task::spawn_blocking(kill_stray_processes)
            .await
            .context("Process sweep task failed")?;
        if killed > 0 {
            info!(killed, "Terminated leftover Moonlight instances");
        }
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        let child = Command::new(FLATPAK)
            .args(self.stream_args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.app))?;

        info!(
            pid = ?child.id(),
            host_name = %self.host_name,
            stream_app = %self.stream_app,
            "Moonlight started"
        );
        self.child = Some(child);
        Ok(())
    }

    async fn wait(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };

        match child.wait().await {
            Ok(status) => info!(%status, "Moonlight exited"),
            Err(e) => warn!(error = %e, "Failed to wait for Moonlight"),
        }
    }

    async fn terminate(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Err(e) = child.kill().await {
            debug!(error = %e, "Moonlight child already gone");
        }
        self.flatpak_kill().await;
        debug!("Moonlight terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MOONLIGHT_APP, DEFAULT_STREAM_APP};

    fn proxy() -> MoonlightProxy {
        MoonlightProxy::new(DEFAULT_MOONLIGHT_APP, "gaming-pc", DEFAULT_STREAM_APP)
    }

    #[test]
    fn test_stream_args() {
        let proxy = proxy();
        let args = proxy.stream_args();
        assert_eq!(args[..3], ["run", DEFAULT_MOONLIGHT_APP, "stream"]);
        assert_eq!(args[3..], ["gaming-pc", DEFAULT_STREAM_APP]);
    }

    #[tokio::test]
    async fn test_wait_without_child_returns() {
        let mut proxy = proxy();
        proxy.wait().await;
    }

    #[tokio::test]
    async fn test_terminate_without_child_is_noop() {
        let mut proxy = proxy();
        proxy.terminate().await;
        assert!(proxy.child.is_none());
    }
}
