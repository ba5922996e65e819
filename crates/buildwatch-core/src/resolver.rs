//! Snapshot lookup in the pre-push tree.

use tracing::{debug, warn};

use crate::domain::{ContentRef, Result, SkipReason, Step, TreeEntry};
use crate::platform::RepoPlatform;

/// Default name of the snapshot file at the tree root.
pub const DEFAULT_SNAPSHOT_FILE: &str = "current.js";

/// Find the snapshot entry among top-level tree entries.
///
/// If the listing holds more than one entry with that path, the first one
/// wins.
pub fn find_snapshot<'a>(entries: &'a [TreeEntry], snapshot_file: &str) -> Option<&'a TreeEntry> {
    let mut matches = entries.iter().filter(|e| e.path == snapshot_file);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        warn!(
            snapshot_file,
            duplicates = extra,
            "tree lists the snapshot file more than once; using the first entry"
        );
    }
    Some(first)
}

/// Resolve the content address of the snapshot in the tree at `before`.
///
/// Absence is a skip; a failed tree fetch is an error.
pub async fn resolve_snapshot(
    platform: &dyn RepoPlatform,
    before: &str,
    snapshot_file: &str,
) -> Result<Step<ContentRef>> {
    let entries = platform.get_tree(before).await?;
    debug!(tree = %before, entries = entries.len(), "fetched pre-push tree");

    Ok(match find_snapshot(&entries, snapshot_file) {
        Some(entry) => Step::Proceed(entry.content_ref.clone()),
        None => Step::Skip(SkipReason::NoSnapshot),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuildwatchError;
    use crate::fakes::{MemoryPlatform, Operation};
    use crate::platform::PlatformError;

    #[test]
    fn test_first_duplicate_wins() {
        let entries = vec![
            TreeEntry::blob("README.md", "r1"),
            TreeEntry::blob("current.js", "first"),
            TreeEntry::blob("current.js", "second"),
        ];
        let found = find_snapshot(&entries, "current.js").unwrap();
        assert_eq!(found.content_ref.as_str(), "first");
    }

    #[test]
    fn test_nested_paths_do_not_match() {
        let entries = vec![TreeEntry::blob("2023/current.js", "nested")];
        assert!(find_snapshot(&entries, "current.js").is_none());
    }

    #[tokio::test]
    async fn test_resolve_present_snapshot() {
        let platform = MemoryPlatform::new();
        platform.insert_tree("before", vec![TreeEntry::blob("current.js", "snap")]);

        let step = resolve_snapshot(&platform, "before", "current.js").await.unwrap();
        assert_eq!(step, Step::Proceed(ContentRef::new("snap")));
    }

    #[tokio::test]
    async fn test_resolve_missing_snapshot_skips() {
        let platform = MemoryPlatform::new();
        platform.insert_tree("before", vec![TreeEntry::blob("other.js", "x")]);

        let step = resolve_snapshot(&platform, "before", "current.js").await.unwrap();
        assert_eq!(step, Step::Skip(SkipReason::NoSnapshot));
    }

    #[tokio::test]
    async fn test_tree_fetch_failure_propagates() {
        let platform = MemoryPlatform::new();
        platform.fail_on(
            Operation::GetTree,
            PlatformError::Forbidden {
                message: "no access".to_string(),
            },
        );

        let err = resolve_snapshot(&platform, "before", "current.js")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BuildwatchError::Platform(PlatformError::Forbidden { .. })
        ));
    }
}
