//! Diff orchestration: fetch both blobs, decode, diff, interpret.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use lang_differ::{DiffMode, LangDiffer};
use tracing::debug;

use crate::domain::error::BoxError;
use crate::domain::{BuildwatchError, ContentRef, DiffOutcome, Result};
use crate::obs;
use crate::platform::RepoPlatform;

/// A text diff algorithm. `Ok(None)` (or an empty string) means nothing
/// changed.
pub trait StringDiffer: Send + Sync {
    fn diff(
        &self,
        old: &str,
        new: &str,
        mode: DiffMode,
    ) -> std::result::Result<Option<String>, BoxError>;
}

impl StringDiffer for LangDiffer {
    fn diff(
        &self,
        old: &str,
        new: &str,
        mode: DiffMode,
    ) -> std::result::Result<Option<String>, BoxError> {
        LangDiffer::diff(self, old, new, mode).map_err(BoxError::from)
    }
}

/// Turns a snapshot/artifact pair into a `DiffOutcome`.
pub struct Orchestrator {
    platform: Arc<dyn RepoPlatform>,
    differ: Arc<dyn StringDiffer>,
    mode: DiffMode,
}

impl Orchestrator {
    pub fn new(platform: Arc<dyn RepoPlatform>, differ: Arc<dyn StringDiffer>, mode: DiffMode) -> Self {
        Self {
            platform,
            differ,
            mode,
        }
    }

    /// Fetch and decode the snapshot and the new artifact, in that order.
    pub async fn fetch_pair(&self, snapshot: &ContentRef, artifact: &ContentRef) -> Result<(String, String)> {
        let old = self.fetch_text(snapshot).await?;
        let new = self.fetch_text(artifact).await?;
        obs::emit_input_lengths(old.len(), new.len());
        Ok((old, new))
    }

    async fn fetch_text(&self, content_ref: &ContentRef) -> Result<String> {
        let blob = self.platform.get_blob(content_ref).await?;
        blob.decode_text()
    }

    /// Run the differ over already-decoded text, verbatim. A failing or
    /// panicking differ becomes `DiffOutcome::Failed`.
    pub fn diff_texts(&self, old: &str, new: &str) -> DiffOutcome {
        let differ = &self.differ;
        let mode = self.mode;
        let result = catch_unwind(AssertUnwindSafe(|| differ.diff(old, new, mode)));

        match result {
            Ok(Ok(Some(text))) if !text.is_empty() => DiffOutcome::Ready(text),
            Ok(Ok(_)) => DiffOutcome::NoChange,
            Ok(Err(err)) => {
                debug!(error = %err, "differ returned an error");
                DiffOutcome::Failed(BuildwatchError::Diff(err))
            }
            Err(payload) => DiffOutcome::Failed(BuildwatchError::DifferPanicked(panic_message(
                payload.as_ref(),
            ))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{MemoryPlatform, Operation, PlatformCall};
    use crate::platform::PlatformError;

    struct FixedDiffer(Option<String>);

    impl StringDiffer for FixedDiffer {
        fn diff(&self, _: &str, _: &str, _: DiffMode) -> std::result::Result<Option<String>, BoxError> {
            Ok(self.0.clone())
        }
    }

    struct FailingDiffer;

    impl StringDiffer for FailingDiffer {
        fn diff(&self, _: &str, _: &str, _: DiffMode) -> std::result::Result<Option<String>, BoxError> {
            Err("bad input".into())
        }
    }

    struct PanickingDiffer;

    impl StringDiffer for PanickingDiffer {
        fn diff(&self, _: &str, _: &str, _: DiffMode) -> std::result::Result<Option<String>, BoxError> {
            panic!("index out of range")
        }
    }

    /// Records exactly what it was given.
    #[derive(Default)]
    struct EchoDiffer;

    impl StringDiffer for EchoDiffer {
        fn diff(&self, old: &str, new: &str, mode: DiffMode) -> std::result::Result<Option<String>, BoxError> {
            Ok(Some(format!("{mode}|{old:?}|{new:?}")))
        }
    }

    fn orchestrator(platform: Arc<MemoryPlatform>, differ: impl StringDiffer + 'static) -> Orchestrator {
        Orchestrator::new(platform, Arc::new(differ), DiffMode::Codeblock)
    }

    #[test]
    fn test_empty_result_is_no_change() {
        let o = orchestrator(Arc::new(MemoryPlatform::new()), FixedDiffer(Some(String::new())));
        assert!(matches!(o.diff_texts("a", "b"), DiffOutcome::NoChange));

        let o = orchestrator(Arc::new(MemoryPlatform::new()), FixedDiffer(None));
        assert!(matches!(o.diff_texts("a", "b"), DiffOutcome::NoChange));
    }

    #[test]
    fn test_non_empty_result_is_ready() {
        let o = orchestrator(Arc::new(MemoryPlatform::new()), FixedDiffer(Some("D".to_string())));
        match o.diff_texts("a", "b") {
            DiffOutcome::Ready(text) => assert_eq!(text, "D"),
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_differ_error_is_failed() {
        let o = orchestrator(Arc::new(MemoryPlatform::new()), FailingDiffer);
        match o.diff_texts("a", "b") {
            DiffOutcome::Failed(err) => {
                assert_eq!(err.to_string(), "unable to diff strings: bad input")
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_differ_panic_is_failed() {
        let o = orchestrator(Arc::new(MemoryPlatform::new()), PanickingDiffer);
        match o.diff_texts("a", "b") {
            DiffOutcome::Failed(BuildwatchError::DifferPanicked(msg)) => {
                assert_eq!(msg, "index out of range")
            }
            other => panic!("expected DifferPanicked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetched_text_reaches_differ_verbatim_in_order() {
        let platform = Arc::new(MemoryPlatform::new());
        platform.insert_text_blob("old", "line1\r\nline2");
        platform.insert_text_blob("new", "line1\nline2\n");

        let o = orchestrator(platform.clone(), EchoDiffer);
        let (old, new) = o
            .fetch_pair(&ContentRef::new("old"), &ContentRef::new("new"))
            .await
            .unwrap();

        match o.diff_texts(&old, &new) {
            DiffOutcome::Ready(text) => {
                assert_eq!(text, "codeblock|\"line1\\r\\nline2\"|\"line1\\nline2\\n\"")
            }
            other => panic!("expected Ready, got {other:?}"),
        }
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::GetBlob("old".to_string()),
                PlatformCall::GetBlob("new".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_blob_fetch_failure_is_error() {
        let platform = Arc::new(MemoryPlatform::new());
        platform.fail_on(
            Operation::GetBlob,
            PlatformError::NotFound {
                resource: "blob old".to_string(),
            },
        );

        let o = orchestrator(platform, EchoDiffer);
        let err = o
            .fetch_pair(&ContentRef::new("old"), &ContentRef::new("new"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildwatchError::Platform(PlatformError::NotFound { .. })));
    }
}
