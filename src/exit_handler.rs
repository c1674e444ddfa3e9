//! Exit code logic for the downloader process.
//!
//! Single responsibility: map run statistics to the process exit outcome.

use std::process::ExitCode;

/// Process outcome reported through the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every item was downloaded or skipped.
    Success,
    /// Some items failed.
    Partial,
    /// Nothing succeeded, or the run could not start.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Partial => ExitCode::from(1),
            ProcessExit::Failure => ExitCode::from(2),
        }
    }
}

/// Determines the process exit outcome from succeeded and failed item counts.
///
/// Skipped items count as succeeded.
pub(crate) fn determine_exit_outcome(succeeded: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if succeeded > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
