//! Runner configuration.
//!
//! Everything has a sensible default; an optional TOML file can override
//! individual values:
//!
//! ```toml
//! gamestream_steam_id = 6395
//! moonlight_app = "com.moonlight_stream.Moonlight"
//!
//! [timings]
//! poll_interval_ms = 1000
//! grace_period_ms = 2000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use moondeck_core::{GameStreamAppId, GAMESTREAM_STEAM_ID};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default GameStream HTTP port serving `serverinfo`.
pub const DEFAULT_GAMESTREAM_PORT: u16 = 47989;

/// Flatpak id of the Moonlight client.
pub const DEFAULT_MOONLIGHT_APP: &str = "com.moonlight_stream.Moonlight";

/// GameStream app Moonlight is asked to stream.
pub const DEFAULT_STREAM_APP: &str = "Steam";

// ============================================================================
// Timings
// ============================================================================

/// Pacing and timeout values used by the watchdogs and sequencers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTimings {
    /// Delay between unsuccessful polls (one "time unit")
    pub poll_interval_ms: u64,

    /// Delay between polls while Steam is settling on a valid app
    pub stable_interval_ms: u64,

    /// Upper bound for a single Buddy or GameStream request
    pub request_timeout_ms: u64,

    /// How long the launch sequence may keep going after Moonlight exits
    pub grace_period_ms: u64,
}

impl Default for RunnerTimings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            stable_interval_ms: 500,
            request_timeout_ms: 5000,
            grace_period_ms: 2000,
        }
    }
}

impl RunnerTimings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stable_interval(&self) -> Duration {
        Duration::from_millis(self.stable_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

// ============================================================================
// Runner Config
// ============================================================================

/// Configuration for a runner invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// `currentgame` GameStream reports while streaming Steam
    pub gamestream_steam_id: GameStreamAppId,

    /// Port of the GameStream `serverinfo` endpoint
    pub gamestream_port: u16,

    /// Flatpak id of the Moonlight client
    pub moonlight_app: String,

    /// GameStream app Moonlight streams
    pub stream_app: String,

    /// Pacing and timeouts
    pub timings: RunnerTimings,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            gamestream_steam_id: GAMESTREAM_STEAM_ID,
            gamestream_port: DEFAULT_GAMESTREAM_PORT,
            moonlight_app: DEFAULT_MOONLIGHT_APP.to_string(),
            stream_app: DEFAULT_STREAM_APP.to_string(),
            timings: RunnerTimings::default(),
        }
    }
}

impl RunnerConfig {
    /// Loads the configuration file, falling back to defaults if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
