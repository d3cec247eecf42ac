//! Per-invocation state machine.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{IacError, IacResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Start,
    Resolved,
    Loaded,
    Validated,
    ProviderDetected,
    CredsLoaded,
    BackendResolved,
    WorkspaceReady,
    InitDone,
    OperationRunning,
    OperationComplete { success: bool },
    Cleanup,
    End,
}

impl InvocationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationState::Start => "START",
            InvocationState::Resolved => "RESOLVED",
            InvocationState::Loaded => "LOADED",
            InvocationState::Validated => "VALIDATED",
            InvocationState::ProviderDetected => "PROVIDER_DETECTED",
            InvocationState::CredsLoaded => "CREDS_LOADED",
            InvocationState::BackendResolved => "BACKEND_RESOLVED",
            InvocationState::WorkspaceReady => "WORKSPACE_READY",
            InvocationState::InitDone => "INIT_DONE",
            InvocationState::OperationRunning => "OPERATION_RUNNING",
            InvocationState::OperationComplete { .. } => "OPERATION_COMPLETE",
            InvocationState::Cleanup => "CLEANUP",
            InvocationState::End => "END",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvocationState::Cleanup | InvocationState::End)
    }

    /// The state that follows on the success path.
    fn successor(&self) -> Option<InvocationState> {
        use InvocationState::*;
        match self {
            Start => Some(Resolved),
            Resolved => Some(Loaded),
            Loaded => Some(Validated),
            Validated => Some(ProviderDetected),
            ProviderDetected => Some(CredsLoaded),
            CredsLoaded => Some(BackendResolved),
            BackendResolved => Some(WorkspaceReady),
            WorkspaceReady => Some(InitDone),
            InitDone => Some(OperationRunning),
            OperationRunning | OperationComplete { .. } => None,
            Cleanup => Some(End),
            End => None,
        }
    }

    pub fn can_transition_to(&self, next: InvocationState) -> bool {
        match (self, next) {
            (InvocationState::OperationRunning, InvocationState::OperationComplete { .. }) => true,
            (from, InvocationState::Cleanup) => !from.is_terminal(),
            (from, to) => from.successor() == Some(to),
        }
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationState::OperationComplete { success } => {
                write!(f, "{}({})", self.as_str(), if *success { "success" } else { "failure" })
            }
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Records the states an invocation passes through.
#[derive(Debug, Clone)]
pub struct InvocationTracker {
    history: Vec<InvocationState>,
}

impl Default for InvocationTracker {
    fn default() -> Self {
        Self {
            history: vec![InvocationState::Start],
        }
    }
}

impl InvocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> InvocationState {
        self.history
            .last()
            .copied()
            .unwrap_or(InvocationState::Start)
    }

    pub fn history(&self) -> &[InvocationState] {
        &self.history
    }

    pub fn advance(&mut self, next: InvocationState) -> IacResult<()> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(IacError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        debug!("Invocation state {} -> {}", current, next);
        self.history.push(next);
        Ok(())
    }

    /// Move to `CLEANUP` then `END` from wherever the invocation stopped.
    pub fn finish(&mut self) {
        if self.current() == InvocationState::End {
            return;
        }
        if self.current() != InvocationState::Cleanup {
            self.history.push(InvocationState::Cleanup);
        }
        self.history.push(InvocationState::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvocationState::*;

    #[test]
    fn test_full_success_path() {
        let mut tracker = InvocationTracker::new();
        for state in [
            Resolved,
            Loaded,
            Validated,
            ProviderDetected,
            CredsLoaded,
            BackendResolved,
            WorkspaceReady,
            InitDone,
            OperationRunning,
            OperationComplete { success: true },
            Cleanup,
            End,
        ] {
            tracker.advance(state).unwrap();
        }
        assert_eq!(tracker.history().len(), 13);
    }

    #[test]
    fn test_skipping_is_rejected() {
        let mut tracker = InvocationTracker::new();
        tracker.advance(Resolved).unwrap();
        let err = tracker.advance(Validated).unwrap_err();
        assert!(err.to_string().contains("RESOLVED -> VALIDATED"));
    }

    #[test]
    fn test_early_exit_goes_through_cleanup() {
        let mut tracker = InvocationTracker::new();
        tracker.advance(Resolved).unwrap();
        tracker.finish();
        assert_eq!(tracker.history(), &[Start, Resolved, Cleanup, End]);

        tracker.finish();
        assert_eq!(tracker.history().len(), 4);
        assert!(!End.can_transition_to(Cleanup));
    }

    #[test]
    fn test_display() {
        assert_eq!(OperationComplete { success: false }.to_string(), "OPERATION_COMPLETE(failure)");
    }
}
