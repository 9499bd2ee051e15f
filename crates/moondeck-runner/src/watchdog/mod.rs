//! Watchdogs built on the poller.
//!
//! - [`ReadinessWatchdog`] - Steam settled on the front-end or the target app
//! - [`LaunchWatchdog`] - target app became the running app
//! - [`CloseWatchdog`] - target app (or Steam) stopped; never times out

mod close;
mod launch;
mod readiness;

pub use close::CloseWatchdog;
pub use launch::{LaunchWatchdog, LAUNCH_RETRIES};
pub use readiness::{ReadinessWatchdog, READINESS_RETRIES, STABLE_POLLS};
