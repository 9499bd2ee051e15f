//! Waits for the target app to become the running app.

use std::time::Duration;

use moondeck_core::{AppId, RunnerResult, SessionStatus};
use tracing::debug;

use crate::budget::RetryBudget;
use crate::config::RunnerTimings;
use crate::poller::{Verdict, Watchdog};

/// Unsuccessful polls tolerated before the launch counts as failed.
pub const LAUNCH_RETRIES: u32 = 30;

/// Detects the target app starting, or gives up after [`LAUNCH_RETRIES`].
///
/// Steam may update the app before starting it. While an update is seen the
/// budget is left alone; once the update disappears without the app running,
/// the launch request went stale and the watchdog reports
/// [`Verdict::AppFinishedUpdating`] so the caller can send it again.
#[derive(Debug)]
pub struct LaunchWatchdog {
    target: AppId,
    budget: RetryBudget,
    observed_updating: bool,
    interval: Duration,
}

impl LaunchWatchdog {
    pub fn new(target: AppId, timings: &RunnerTimings) -> Self {
        Self {
            target,
            budget: RetryBudget::new(LAUNCH_RETRIES),
            observed_updating: false,
            interval: timings.poll_interval(),
        }
    }
}

impl Watchdog for LaunchWatchdog {
    fn name(&self) -> &'static str {
        "launch"
    }

    fn evaluate(&mut self, status: &SessionStatus) -> Verdict {
        if status.is_running(self.target) {
            return Verdict::Success;
        }

        if status.is_updating(self.target) {
            if !self.observed_updating {
                debug!(app_id = %self.target, "App is updating");
            }
            self.observed_updating = true;
            return Verdict::Continue(self.interval);
        }

        if self.observed_updating {
            return Verdict::AppFinishedUpdating;
        }

        if self.budget.consume(1.0) {
            Verdict::Continue(self.interval)
        } else {
            Verdict::Fail(RunnerResult::AppLaunchFailed)
        }
    }
}
