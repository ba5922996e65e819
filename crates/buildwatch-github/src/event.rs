//! Loading the triggering event from the Actions runner environment.

use std::path::Path;

use buildwatch_core::{BuildwatchError, EventContext, PushSignal, Result, PUSH_EVENT};
use tracing::debug;

/// Build the [`EventContext`] for `event_name`.
///
/// Non-push events are returned as-is without reading any payload. For a
/// push, `path` must point at the webhook payload JSON.
pub fn load_event(event_name: &str, path: Option<&Path>) -> Result<EventContext> {
    let event_name = event_name.trim();
    if event_name != PUSH_EVENT {
        return Ok(EventContext::other(event_name));
    }

    let path = path.ok_or_else(|| {
        BuildwatchError::MalformedEvent("push event without a payload path".to_string())
    })?;
    debug!(path = %path.display(), "reading push payload");

    let raw = std::fs::read_to_string(path)?;
    let signal = parse_push_payload(&raw)?;
    Ok(EventContext::push(signal))
}

/// Pull `before`/`after` out of a push webhook payload.
pub fn parse_push_payload(raw: &str) -> Result<PushSignal> {
    serde_json::from_str::<PushSignal>(raw)
        .map_err(|e| BuildwatchError::MalformedEvent(format!("invalid push payload: {e}")))
}
