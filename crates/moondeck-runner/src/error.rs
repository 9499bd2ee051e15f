//! Error type threaded through every phase of a run.
//!
//! A run either succeeds (`Ok(())`) or ends with exactly one terminal
//! [`RunnerResult`]. Terminal results travel on the `Err` side so `?`
//! carries them unchanged through every layer; faults (I/O failures,
//! unexpected collaborator errors) travel alongside them and are mapped to
//! [`RunnerResult::Exception`] only once, at the outermost layer.

use moondeck_core::RunnerResult;
use thiserror::Error;
use tracing::error;

/// Why a run phase stopped early.
#[derive(Error, Debug)]
pub enum RunError {
    /// A terminal outcome that must reach the result sink unchanged.
    #[error("run ended with {0}")]
    Terminal(RunnerResult),

    /// An unexpected fault; becomes `RunnerResult::Exception`.
    #[error("unhandled fault: {0:#}")]
    Fault(#[from] anyhow::Error),
}

impl From<RunnerResult> for RunError {
    fn from(result: RunnerResult) -> Self {
        Self::Terminal(result)
    }
}

impl RunError {
    /// Returns the terminal result this error stands for.
    #[must_use]
    pub fn result(&self) -> RunnerResult {
        match self {
            Self::Terminal(result) => *result,
            Self::Fault(_) => RunnerResult::Exception,
        }
    }
}

/// Result of a run phase: `Ok` to continue, `Err` to stop the run.
pub type RunOutcome<T = ()> = Result<T, RunError>;

/// Collapses a finished run into the value persisted for the front-end.
///
/// `None` means success. Faults are logged here and nowhere else.
pub fn into_result(outcome: RunOutcome) -> Option<RunnerResult> {
    match outcome {
        Ok(()) => None,
        Err(RunError::Terminal(result)) => Some(result),
        Err(RunError::Fault(e)) => {
            error!(error = ?e, "Run failed with an unhandled fault");
            Some(RunnerResult::Exception)
        }
    }
}
