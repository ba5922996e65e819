//! Structured observability hooks for pipeline lifecycle events.
//!
//! Skips and successes are logged at `info!`, failures at `error!`.
//! When running inside GitHub Actions, failures are also printed as an
//! `::error::` workflow command so they surface as annotations.

use tracing::{debug, error, info};

use crate::domain::SkipReason;
use crate::pipeline::PipelineState;
use crate::platform::CommentRef;

/// Emit event: pipeline started for a trigger.
pub fn emit_pipeline_started(event_name: &str, head: Option<&str>) {
    info!(event = "pipeline.started", event_name = %event_name, head = head.unwrap_or("-"));
}

/// Emit event: a stage advanced the pipeline.
pub fn emit_state_reached(state: PipelineState) {
    debug!(event = "pipeline.state", state = %state);
}

/// Emit event: trigger evaluated, before the terminal action.
pub fn emit_evaluated(state: PipelineState, outcome: &str) {
    info!(event = "pipeline.evaluated", state = %state, outcome);
}

/// Emit event: run ended with a skip.
pub fn emit_skipped(reason: SkipReason) {
    info!(event = "pipeline.skipped", reason = %reason, "{reason}");
}

/// Emit event: artifact diffed but no string changed.
pub fn emit_no_change() {
    info!(event = "pipeline.no_change", "no content changed");
}

/// Emit event: diff posted as a commit comment.
pub fn emit_commented(commit: &str, comment: &CommentRef) {
    info!(
        event = "pipeline.commented",
        commit = %commit,
        comment_id = comment.id,
        url = %comment.url,
        "created commit comment"
    );
}

/// Emit event: run failed. With `annotate`, also print the workflow command.
pub fn emit_failed(message: &str, annotate: bool) {
    error!(event = "pipeline.failed", "{message}");
    if annotate {
        println!("{}", workflow_error(message));
    }
}

/// Emit event: decoded input sizes (diagnostic only).
pub fn emit_input_lengths(old_len: usize, new_len: usize) {
    debug!(event = "diff.input_lengths", old_len, new_len);
}

/// Format an `::error::` workflow command, escaping the message.
pub fn workflow_error(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_escapes_message() {
        assert_eq!(
            workflow_error("100% broken\r\nsecond line"),
            "::error::100%25 broken%0D%0Asecond line"
        );
    }

    #[test]
    fn test_emitters_do_not_panic_without_subscriber() {
        emit_pipeline_started("push", Some("abc"));
        emit_state_reached(PipelineState::Classified);
        emit_evaluated(PipelineState::Diffed, "ready");
        emit_skipped(SkipReason::NotBuildFile);
        emit_no_change();
        emit_commented(
            "abc",
            &CommentRef {
                id: 1,
                url: "memory://comments/1".to_string(),
            },
        );
        emit_failed("boom", false);
        emit_input_lengths(1, 2);
    }
}
