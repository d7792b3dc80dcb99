//! Per-pipeline single-flight guard.
//!
//! A typed state machine rather than a busy boolean, so "failed with a
//! message" is a first-class observable state that cannot desynchronize from
//! the busy flag.

use serde::Serialize;

use crate::errors::AppError;

/// Observable pipeline state: `Idle → Running → (Idle | Failed)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum OpState {
    Idle,
    Running,
    Failed(String),
}

/// One guard per pipeline. Mutual exclusion for a pipeline is enforced
/// entirely through `begin`: re-entry while `Running` is refused, never
/// queued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationGuard {
    name: &'static str,
    #[serde(flatten)]
    state: OpState,
}

impl OperationGuard {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: OpState::Idle,
        }
    }

    /// Transitions to `Running`. Rejects if already `Running`; clears any
    /// prior failure message.
    pub fn begin(&mut self) -> Result<(), AppError> {
        if self.state == OpState::Running {
            return Err(AppError::Conflict(self.name.to_string()));
        }
        self.state = OpState::Running;
        Ok(())
    }

    /// `Running → Idle`.
    pub fn succeed(&mut self) {
        self.state = OpState::Idle;
    }

    /// `Running → Failed(message)`. The message stays observable until the
    /// next `begin`.
    pub fn fail(&mut self, message: String) {
        self.state = OpState::Failed(message);
    }

    pub fn state(&self) -> &OpState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == OpState::Running
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            OpState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_from_idle() {
        let mut guard = OperationGuard::new("extraction");
        assert!(guard.begin().is_ok());
        assert!(guard.is_running());
    }

    #[test]
    fn test_begin_while_running_is_rejected() {
        let mut guard = OperationGuard::new("extraction");
        guard.begin().unwrap();
        let err = guard.begin().unwrap_err();
        assert!(matches!(err, AppError::Conflict(name) if name == "extraction"));
        // Still running; the rejected attempt had no side effects.
        assert!(guard.is_running());
    }

    #[test]
    fn test_success_returns_to_idle() {
        let mut guard = OperationGuard::new("translation");
        guard.begin().unwrap();
        guard.succeed();
        assert_eq!(*guard.state(), OpState::Idle);
        assert!(guard.last_error().is_none());
    }

    #[test]
    fn test_failure_retains_message_until_next_begin() {
        let mut guard = OperationGuard::new("translation");
        guard.begin().unwrap();
        guard.fail("engine unreachable".to_string());
        assert_eq!(guard.last_error(), Some("engine unreachable"));

        // The next invocation attempt clears the message immediately.
        guard.begin().unwrap();
        assert!(guard.is_running());
        assert!(guard.last_error().is_none());
    }

    #[test]
    fn test_observable_state_serialization() {
        let mut guard = OperationGuard::new("recommendation");
        guard.begin().unwrap();
        guard.fail("boom".to_string());
        let value = serde_json::to_value(&guard).unwrap();
        assert_eq!(value["state"], "failed");
        assert_eq!(value["message"], "boom");
        assert_eq!(value["name"], "recommendation");
    }
}
