//! Lifecycle of a single backup or restore operation

use std::fmt;

use tracing::debug;

/// Phase of a backup or restore run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    DerivingKey,
    Encrypting,
    Decrypting,
    WritingArtifacts,
    RestoringMaterial,
    Complete,
    Failed,
}

impl OperationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Whether `next` may follow `self`
    pub fn can_transition_to(self, next: OperationState) -> bool {
        use OperationState::*;

        if next == Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Idle, DerivingKey)
                | (DerivingKey, Encrypting)
                | (DerivingKey, Decrypting)
                | (Encrypting, WritingArtifacts)
                | (Decrypting, RestoringMaterial)
                | (WritingArtifacts, Complete)
                | (RestoringMaterial, Complete)
        )
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::DerivingKey => "deriving-key",
            Self::Encrypting => "encrypting",
            Self::Decrypting => "decrypting",
            Self::WritingArtifacts => "writing-artifacts",
            Self::RestoringMaterial => "restoring-material",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the phases an operation passed through
#[derive(Debug, Clone)]
pub struct StateTracker {
    history: Vec<OperationState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            history: vec![OperationState::Idle],
        }
    }

    pub fn current(&self) -> OperationState {
        self.history
            .last()
            .copied()
            .unwrap_or(OperationState::Idle)
    }

    pub fn advance(&mut self, next: OperationState) {
        let current = self.current();
        debug_assert!(
            current.can_transition_to(next),
            "invalid transition {} -> {}",
            current,
            next
        );
        debug!(from = %current, to = %next, "operation state");
        self.history.push(next);
    }

    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.advance(OperationState::Failed);
        }
    }

    pub fn history(&self) -> &[OperationState] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OperationState::*;

    #[test]
    fn test_backup_path() {
        let mut tracker = StateTracker::new();
        for next in [DerivingKey, Encrypting, WritingArtifacts, Complete] {
            tracker.advance(next);
        }
        assert_eq!(tracker.current(), Complete);
        assert_eq!(tracker.history().len(), 5);
    }

    #[test]
    fn test_failed_reachable_from_any_live_state() {
        let live = [
            Idle,
            DerivingKey,
            Encrypting,
            Decrypting,
            WritingArtifacts,
            RestoringMaterial,
        ];
        for state in live {
            assert!(state.can_transition_to(Failed));
        }
        assert!(!Complete.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn test_rejects_skipping_phases() {
        assert!(!Idle.can_transition_to(Encrypting));
        assert!(!Encrypting.can_transition_to(RestoringMaterial));
        assert!(!Decrypting.can_transition_to(WritingArtifacts));
    }

    #[test]
    fn test_fail_is_idempotent() {
        let mut tracker = StateTracker::new();
        tracker.advance(DerivingKey);
        tracker.fail();
        tracker.fail();
        assert_eq!(tracker.history(), &[Idle, DerivingKey, Failed]);
    }
}
