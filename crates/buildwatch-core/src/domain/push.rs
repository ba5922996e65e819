//! Trigger payloads.

use serde::{Deserialize, Serialize};

/// Event name the bot acts on.
pub const PUSH_EVENT: &str = "push";

/// The part of a push payload the pipeline needs.
///
/// `before` is the pre-push reference (whose tree holds the snapshot file),
/// `after` is the head commit of the push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSignal {
    pub before: String,
    pub after: String,
}

impl PushSignal {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// The triggering event as delivered by the invoking environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub event_name: String,
    /// Present only for push events whose payload parsed.
    pub payload: Option<PushSignal>,
}

impl EventContext {
    pub fn push(signal: PushSignal) -> Self {
        Self {
            event_name: PUSH_EVENT.to_string(),
            payload: Some(signal),
        }
    }

    /// A non-push event; its payload is never read.
    pub fn other(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            payload: None,
        }
    }

    pub fn is_push(&self) -> bool {
        self.event_name == PUSH_EVENT
    }

    /// Head commit of the push, if this is one.
    pub fn head(&self) -> Option<&str> {
        self.payload.as_ref().map(|p| p.after.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_signal_ignores_extra_payload_fields() {
        let json = r#"{"ref":"refs/heads/main","before":"aaa","after":"bbb","commits":[]}"#;
        let signal: PushSignal = serde_json::from_str(json).unwrap();
        assert_eq!(signal, PushSignal::new("aaa", "bbb"));
    }

    #[test]
    fn test_event_context_kinds() {
        let push = EventContext::push(PushSignal::new("a", "b"));
        assert!(push.is_push());
        assert_eq!(push.head(), Some("b"));

        let other = EventContext::other("pull_request");
        assert!(!other.is_push());
        assert_eq!(other.head(), None);
    }
}
