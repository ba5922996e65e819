//! Terminal action for a run's outcome.
//!
//! | Outcome | Action |
//! |---|---|
//! | `NotApplicable` | info log, no comment |
//! | `NoChange` | info log, no comment |
//! | `Ready` | one commit comment whose body is the diff text |
//! | `Failed` | error log (and annotation), failure status |

use std::error::Error as _;
use std::sync::Arc;

use crate::config::BotConfig;
use crate::domain::{BuildwatchError, DiffOutcome};
use crate::obs;
use crate::platform::{CommentRef, RepoPlatform};

/// Completion status of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Ended without effect; carries the informational message.
    Skipped(String),
    /// Posted the diff.
    Commented(CommentRef),
    /// Failed; carries the human-readable failure message.
    Failed(String),
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunStatus::Failed(_))
    }
}

/// Render a failure for humans: the short message normally, the full
/// cause chain in debug mode.
pub fn failure_message(err: &BuildwatchError, debug: bool) -> String {
    let mut message = err.to_string();
    if debug {
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        message.push_str(&format!("\n  error: {err:?}"));
    }
    message
}

/// Routes a `DiffOutcome` to exactly one terminal action.
pub struct Reporter {
    platform: Arc<dyn RepoPlatform>,
    debug: bool,
    annotate: bool,
}

impl Reporter {
    pub fn new(platform: Arc<dyn RepoPlatform>, config: &BotConfig) -> Self {
        Self {
            platform,
            debug: config.debug,
            annotate: config.annotate,
        }
    }

    /// Perform the action for `outcome`. `head` is the commit a `Ready`
    /// diff is posted on.
    pub async fn report(&self, outcome: DiffOutcome, head: Option<&str>) -> RunStatus {
        match outcome {
            DiffOutcome::NotApplicable(reason) => {
                obs::emit_skipped(reason);
                RunStatus::Skipped(reason.to_string())
            }
            DiffOutcome::NoChange => {
                obs::emit_no_change();
                RunStatus::Skipped("no content changed".to_string())
            }
            DiffOutcome::Ready(body) => {
                let Some(commit) = head else {
                    return self.fail(&BuildwatchError::MissingHead);
                };
                match self.platform.create_commit_comment(commit, &body).await {
                    Ok(comment) => {
                        obs::emit_commented(commit, &comment);
                        RunStatus::Commented(comment)
                    }
                    Err(err) => self.fail(&BuildwatchError::from(err)),
                }
            }
            DiffOutcome::Failed(err) => self.fail(&err),
        }
    }

    /// Report a failure that happened outside the pipeline (e.g. while
    /// loading the event).
    pub fn fail(&self, err: &BuildwatchError) -> RunStatus {
        let message = failure_message(err, self.debug);
        obs::emit_failed(&message, self.annotate);
        RunStatus::Failed(message)
    }
}
