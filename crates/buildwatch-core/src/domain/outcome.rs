//! Stage results and the final outcome of a run.

use std::fmt;

use super::error::BuildwatchError;

/// Why a run ended without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NotPushEvent,
    NotBuildCommit,
    NotBuildFile,
    NoSnapshot,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::NotPushEvent => "not a push event",
            SkipReason::NotBuildCommit => "not a build commit",
            SkipReason::NotBuildFile => "not a build file",
            SkipReason::NoSnapshot => "no current file",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a guard stage: either hand a value to the next stage or stop
/// the run with a skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    Proceed(T),
    Skip(SkipReason),
}

impl<T> Step<T> {
    pub fn is_skip(&self) -> bool {
        matches!(self, Step::Skip(_))
    }
}

/// The single outcome of a run. Decides the reporter's one action.
#[derive(Debug)]
pub enum DiffOutcome {
    NotApplicable(SkipReason),
    NoChange,
    Ready(String),
    Failed(BuildwatchError),
}

impl DiffOutcome {
    /// Short name used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            DiffOutcome::NotApplicable(_) => "not_applicable",
            DiffOutcome::NoChange => "no_change",
            DiffOutcome::Ready(_) => "ready",
            DiffOutcome::Failed(_) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DiffOutcome::Failed(_))
    }
}

impl From<SkipReason> for DiffOutcome {
    fn from(reason: SkipReason) -> Self {
        DiffOutcome::NotApplicable(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_messages() {
        assert_eq!(SkipReason::NotBuildCommit.to_string(), "not a build commit");
        assert_eq!(SkipReason::NoSnapshot.to_string(), "no current file");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(DiffOutcome::from(SkipReason::NoSnapshot).label(), "not_applicable");
        assert_eq!(DiffOutcome::NoChange.label(), "no_change");
        assert_eq!(DiffOutcome::Ready("D".to_string()).label(), "ready");
        assert_eq!(DiffOutcome::Failed(BuildwatchError::MissingHead).label(), "failed");
    }
}
