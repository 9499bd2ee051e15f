//! Terminal outcomes of a runner invocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single terminal outcome of a run.
///
/// A successful run has no result at all; every variant here is a reason the
/// game could not be launched or stopped being tracked. Values are persisted
/// by name so the front-end can show a matching message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunnerResult {
    /// No (valid) app id was passed to the runner
    NoAppId,
    /// No host is selected in the user settings
    HostNotSelected,
    /// GameStream did not answer the server info query
    GameStreamDead,
    /// GameStream is streaming something other than Steam
    GameStreamBusy,
    /// GameStream never switched to streaming Steam
    SteamLaunchFailed,
    /// Steam did not settle on the front-end or the target app
    AnotherSteamAppIsRunning,
    /// The target app never showed up as running
    AppLaunchFailed,
    /// The target app kept cycling through updates without starting
    AppUpdateNeverSettled,
    /// The Moonlight flatpak is missing
    MoonlightIsNotInstalled,
    /// Moonlight exited before the app finished
    MoonlightClosed,
    /// Buddy could not be reached
    BuddyUnreachable,
    /// Buddy answered a request with an error
    BuddyRequestFailed,
    /// Buddy speaks an incompatible protocol version
    BuddyVersionMismatch,
    /// Unhandled fault during the run
    Exception,
    /// The runner was stopped before it produced a result
    ClosedPrematurely,
}

impl RunnerResult {
    /// Returns the persisted name of the result.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAppId => "NoAppId",
            Self::HostNotSelected => "HostNotSelected",
            Self::GameStreamDead => "GameStreamDead",
            Self::GameStreamBusy => "GameStreamBusy",
            Self::SteamLaunchFailed => "SteamLaunchFailed",
            Self::AnotherSteamAppIsRunning => "AnotherSteamAppIsRunning",
            Self::AppLaunchFailed => "AppLaunchFailed",
            Self::AppUpdateNeverSettled => "AppUpdateNeverSettled",
            Self::MoonlightIsNotInstalled => "MoonlightIsNotInstalled",
            Self::MoonlightClosed => "MoonlightClosed",
            Self::BuddyUnreachable => "BuddyUnreachable",
            Self::BuddyRequestFailed => "BuddyRequestFailed",
            Self::BuddyVersionMismatch => "BuddyVersionMismatch",
            Self::Exception => "Exception",
            Self::ClosedPrematurely => "ClosedPrematurely",
        }
    }

    /// Human readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::NoAppId => "app id was not provided",
            Self::HostNotSelected => "no host is selected",
            Self::GameStreamDead => "GameStream is not responding",
            Self::GameStreamBusy => "GameStream is streaming another app",
            Self::SteamLaunchFailed => "GameStream did not start streaming Steam",
            Self::AnotherSteamAppIsRunning => "another Steam app is running",
            Self::AppLaunchFailed => "app failed to launch",
            Self::AppUpdateNeverSettled => "app kept updating and never launched",
            Self::MoonlightIsNotInstalled => "Moonlight is not installed",
            Self::MoonlightClosed => "Moonlight was closed",
            Self::BuddyUnreachable => "Buddy is not reachable",
            Self::BuddyRequestFailed => "Buddy request failed",
            Self::BuddyVersionMismatch => "Buddy version is not compatible",
            Self::Exception => "unhandled exception",
            Self::ClosedPrematurely => "runner closed prematurely",
        }
    }
}

impl fmt::Display for RunnerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.description())
    }
}
