use crate::dispatcher::{Dispatcher, Outcome};
use crate::target::Renderer;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::debug;

/// Result of replaying one saved input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Ok,
    /// Empty input or a selector with no registry entry.
    Skipped,
    /// The renderer reported an expected limitation.
    Suppressed(String),
    /// A fault or panic: the input is a finding.
    Crash(String),
}

impl ExecutionStatus {
    pub fn is_crash(&self) -> bool {
        matches!(self, ExecutionStatus::Crash(_))
    }
}

pub trait Executor {
    fn execute_sync(&mut self, input: &[u8]) -> ExecutionStatus;
}

/// Replays inputs through a [`Dispatcher`] inside the current process.
///
/// Unlike the fuzz target, which lets a fault kill the process, this catches
/// panics so a whole directory of crash artifacts can be triaged in one run.
pub struct ReplayExecutor<'d, R> {
    dispatcher: &'d Dispatcher<R>,
}

impl<'d, R: Renderer> ReplayExecutor<'d, R> {
    pub fn new(dispatcher: &'d Dispatcher<R>) -> Self {
        Self { dispatcher }
    }
}

impl<R: Renderer> Executor for ReplayExecutor<'_, R> {
    fn execute_sync(&mut self, input: &[u8]) -> ExecutionStatus {
        let result = catch_unwind(AssertUnwindSafe(|| self.dispatcher.dispatch(input)));

        let status = match result {
            Ok(Ok(Outcome::Rendered { .. })) => ExecutionStatus::Ok,
            Ok(Ok(Outcome::Skipped(_))) => ExecutionStatus::Skipped,
            Ok(Ok(Outcome::Suppressed { reason, .. })) => ExecutionStatus::Suppressed(reason),
            Ok(Err(fault)) => ExecutionStatus::Crash(fault.to_string()),
            Err(panic_payload) => {
                let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic type".to_string()
                };
                ExecutionStatus::Crash(msg)
            }
        };
        debug!(input_len = input.len(), ?status, "replayed input");
        status
    }
}
