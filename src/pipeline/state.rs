//! Run state machine.
//!
//! [`RunState`] tracks where a single invocation is. The controller logs every
//! transition at `debug` level.

// ---------------------------------------------------------------------------
// RunStep
// ---------------------------------------------------------------------------

/// Steps of a running invocation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    Classifying,
    Generating,
    Synthesizing,
    Publishing,
}

impl RunStep {
    pub fn label(&self) -> &'static str {
        match self {
            RunStep::Classifying => "Classifying",
            RunStep::Generating => "Generating",
            RunStep::Synthesizing => "Synthesizing",
            RunStep::Publishing => "Publishing",
        }
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// States of one invocation.
///
/// ```text
/// AwaitingArgs ──args ok──▶ Running(Classifying)
///                           ──▶ Running(Generating)
///                                 ──sentence empty / failed──▶ Failed
///                                 ──▶ Running(Synthesizing)
///                                       ──audio failed──▶ Done (no note)
///                                       ──▶ Running(Publishing) ──▶ Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Arguments not yet accepted.
    #[default]
    AwaitingArgs,

    Running(RunStep),

    /// Finished; individual non-essential steps may still have failed.
    Done,

    /// Aborted because no sentence could be generated.
    Failed,
}

impl RunState {
    /// ```
    /// use vocab_cards::pipeline::{RunState, RunStep};
    ///
    /// assert!(!RunState::AwaitingArgs.is_terminal());
    /// assert!(!RunState::Running(RunStep::Generating).is_terminal());
    /// assert!(RunState::Done.is_terminal());
    /// assert!(RunState::Failed.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// A short human-readable label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            RunState::AwaitingArgs => "AwaitingArgs",
            RunState::Running(step) => step.label(),
            RunState::Done => "Done",
            RunState::Failed => "Failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_awaiting_args() {
        assert_eq!(RunState::default(), RunState::AwaitingArgs);
    }

    #[test]
    fn running_is_not_terminal() {
        for step in [
            RunStep::Classifying,
            RunStep::Generating,
            RunStep::Synthesizing,
            RunStep::Publishing,
        ] {
            assert!(!RunState::Running(step).is_terminal());
        }
    }

    #[test]
    fn running_label_is_step_label() {
        assert_eq!(
            RunState::Running(RunStep::Synthesizing).label(),
            "Synthesizing"
        );
    }

    #[test]
    fn terminal_labels() {
        assert_eq!(RunState::Done.label(), "Done");
        assert_eq!(RunState::Failed.label(), "Failed");
    }
}
