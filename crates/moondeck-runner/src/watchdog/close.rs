//! Waits for the target app to stop.

use std::time::Duration;

use moondeck_core::{AppId, SessionStatus};

use crate::config::RunnerTimings;
use crate::poller::{Verdict, Watchdog};

/// Succeeds once the target app is no longer running.
///
/// Has no budget: the user may play for hours. The wait ends when the app
/// or Steam stops, or when the enclosing task is cancelled.
#[derive(Debug)]
pub struct CloseWatchdog {
    target: AppId,
    interval: Duration,
}

impl CloseWatchdog {
    pub fn new(target: AppId, timings: &RunnerTimings) -> Self {
        Self {
            target,
            interval: timings.poll_interval(),
        }
    }
}

impl Watchdog for CloseWatchdog {
    fn name(&self) -> &'static str {
        "close"
    }

    fn evaluate(&mut self, status: &SessionStatus) -> Verdict {
        if status.is_running(self.target) {
            Verdict::Continue(self.interval)
        } else {
            Verdict::Success
        }
    }
}
