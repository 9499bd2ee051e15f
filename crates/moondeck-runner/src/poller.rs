//! Generic predicate-driven status polling.
//!
//! None of the remote actors push events, so every wait in the runner is a
//! loop of "fetch a [`SessionStatus`], ask a [`Watchdog`] what it means".
//! The watchdog owns all state carried between polls and decides both when
//! to stop and how long to pause before the next poll.
//!
//! # Cancellation
//!
//! Each fetch and each pause is an await point. Dropping the future returned
//! by [`poll_status`] stops the loop at whichever of the two is in flight;
//! nothing keeps polling in the background.

use std::future::Future;
use std::time::Duration;

use moondeck_core::{RunnerResult, SessionStatus};
use tokio::time::sleep;
use tracing::trace;

use crate::error::RunOutcome;

/// What a watchdog decided about one status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not there yet; poll again after the given delay
    Continue(Duration),
    /// The awaited condition holds
    Success,
    /// Give up with a terminal result
    Fail(RunnerResult),
    /// The target app finished updating but is not running.
    ///
    /// Not a terminal result: the caller should retry the action that
    /// started the wait.
    AppFinishedUpdating,
}

/// How a poll loop ended, if it did not end with a terminal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Success,
    AppFinishedUpdating,
}

/// Stateful predicate evaluated against every polled snapshot.
pub trait Watchdog {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluates one snapshot, updating any state carried across polls.
    fn evaluate(&mut self, status: &SessionStatus) -> Verdict;
}

/// Polls `fetch` until `watchdog` reaches a verdict other than `Continue`.
///
/// A failing fetch ends the loop immediately with its error; retrying is
/// expressed only through the watchdog's own budget.
pub async fn poll_status<F, Fut, W>(mut fetch: F, watchdog: &mut W) -> RunOutcome<PollExit>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RunOutcome<SessionStatus>>,
    W: Watchdog + ?Sized,
{
    loop {
        let status = fetch().await?;

        match watchdog.evaluate(&status) {
            Verdict::Continue(delay) => {
                trace!(
                    watchdog = watchdog.name(),
                    ?status,
                    delay_ms = delay.as_millis() as u64,
                    "Condition not met, polling again"
                );
                sleep(delay).await;
            }
            Verdict::Success => return Ok(PollExit::Success),
            Verdict::Fail(result) => return Err(result.into()),
            Verdict::AppFinishedUpdating => return Ok(PollExit::AppFinishedUpdating),
        }
    }
}
