//! Waits for Steam to settle before a launch request is sent.

use std::time::Duration;

use moondeck_core::{AppId, RunnerResult, SessionStatus};
use tracing::debug;

use crate::budget::RetryBudget;
use crate::config::RunnerTimings;
use crate::poller::{Verdict, Watchdog};

/// Unsuccessful polls tolerated before giving up on Steam.
pub const READINESS_RETRIES: u32 = 15;

/// Consecutive valid polls required; readiness is declared on the poll
/// after this many.
pub const STABLE_POLLS: u32 = 5;

/// Budget drawn per poll while Steam has not picked a running app yet.
const LAUNCHING_COST: f64 = 0.25;

/// Confirms Steam is running the front-end or the target app for several
/// consecutive polls.
///
/// Anything else running draws down the budget and restarts the stability
/// count. An update of the target app, or the first sighting of a valid
/// state, refills the budget.
#[derive(Debug)]
pub struct ReadinessWatchdog {
    target: AppId,
    budget: RetryBudget,
    stable_count: u32,
    poll_interval: Duration,
    stable_interval: Duration,
}

impl ReadinessWatchdog {
    pub fn new(target: AppId, timings: &RunnerTimings) -> Self {
        Self {
            target,
            budget: RetryBudget::new(READINESS_RETRIES),
            stable_count: 0,
            poll_interval: timings.poll_interval(),
            stable_interval: timings.stable_interval(),
        }
    }

    fn is_valid(&self, app_id: Option<AppId>) -> bool {
        app_id == Some(AppId::STEAM_FRONTEND) || app_id == Some(self.target)
    }
}

impl Watchdog for ReadinessWatchdog {
    fn name(&self) -> &'static str {
        "readiness"
    }

    fn evaluate(&mut self, status: &SessionStatus) -> Verdict {
        if status.is_updating(self.target) {
            self.budget.reset();
            return Verdict::Continue(self.poll_interval);
        }

        if status.steam_is_running && self.is_valid(status.running_app_id) {
            if self.stable_count == 0 {
                self.budget.reset();
            }
            if self.stable_count > STABLE_POLLS {
                return Verdict::Success;
            }
            self.stable_count += 1;
            return Verdict::Continue(self.stable_interval);
        }

        // Steam is still starting up if it has no running app yet
        let cost = if status.running_app_unknown() {
            LAUNCHING_COST
        } else {
            1.0
        };
        if self.stable_count > 0 {
            debug!(running_app_id = ?status.running_app_id, "Steam left a valid state");
        }
        self.stable_count = 0;

        if self.budget.consume(cost) {
            Verdict::Continue(self.poll_interval)
        } else {
            Verdict::Fail(RunnerResult::AnotherSteamAppIsRunning)
        }
    }
}
