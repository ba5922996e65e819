//! Build-commit classification.
//!
//! A build commit adds exactly one file, and that file's decoded location
//! ends in `/YYYY/YYYY-MM-DD/<name>.js` or `/YYYY/MM/DD/<name>.js` where
//! `<name>` is at least 20 lowercase alphanumerics. Only metadata is
//! inspected; no content is fetched here.
//!
//! Multi-file commits are never build commits, even when one of the files
//! would match.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{BuildwatchError, CommitRecord, ContentRef, FileStatus, Result, SkipReason, Step};

/// Structural pattern of a published artifact location (suffix match).
pub const BUILD_PATH_PATTERN: &str =
    r"/[0-9]{4}/(?:[0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{2}/[0-9]{2})/[a-z0-9]{20,}\.js$";

fn build_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BUILD_PATH_PATTERN).expect("build path pattern is valid"))
}

/// The qualifying file of a build commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFile {
    pub path: String,
    pub content_ref: ContentRef,
    /// Percent-decoded browsable location
    pub location: String,
}

/// Whether a decoded location names a build artifact.
pub fn is_build_path(location: &str) -> bool {
    build_path_regex().is_match(location)
}

/// Decide whether `commit` is a build commit.
///
/// A malformed percent-escape in the file location is an error, not a skip.
pub fn classify(commit: &CommitRecord) -> Result<Step<BuildFile>> {
    let file = match commit.files.as_slice() {
        [only] => only,
        files => {
            debug!(sha = %commit.sha, files = files.len(), "commit does not change exactly one file");
            return Ok(Step::Skip(SkipReason::NotBuildCommit));
        }
    };

    if file.status != FileStatus::Added {
        debug!(sha = %commit.sha, status = %file.status, "changed file was not added");
        return Ok(Step::Skip(SkipReason::NotBuildCommit));
    }

    let Some(content_ref) = file.content_ref.clone() else {
        return Ok(Step::Skip(SkipReason::NotBuildCommit));
    };

    let Some(raw_location) = file.location.as_deref() else {
        return Ok(Step::Skip(SkipReason::NotBuildFile));
    };

    let location = decode_location(raw_location)?;
    if !is_build_path(&location) {
        debug!(location = %location, "location does not match the build path pattern");
        return Ok(Step::Skip(SkipReason::NotBuildFile));
    }

    Ok(Step::Proceed(BuildFile {
        path: file.path.clone(),
        content_ref,
        location,
    }))
}

/// Percent-decode a location (`decodeURIComponent` rules): every `%XX`
/// becomes a byte and the result must be UTF-8.
pub fn decode_location(raw: &str) -> Result<String> {
    let malformed = || BuildwatchError::MalformedLocation {
        location: raw.to_string(),
    };

    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3).ok_or_else(malformed)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed());
            }
            let byte = u8::from_str_radix(hex, 16).map_err(|_| malformed())?;
            decoded.push(byte);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChangedFile;

    const BLOB_BASE: &str = "https://github.com/acme/builds/blob/1f2e3d4c";

    fn file(path: &str, status: FileStatus) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status,
            content_ref: Some(ContentRef::new("f00d")),
            location: Some(format!("{BLOB_BASE}/{path}")),
        }
    }

    fn commit(files: Vec<ChangedFile>) -> CommitRecord {
        CommitRecord {
            sha: "1f2e3d4c".to_string(),
            files,
        }
    }

    #[test]
    fn test_dated_directory_accepted() {
        let c = commit(vec![file(
            "2023/2023-05-01/abcdefghijklmnopqrst.js",
            FileStatus::Added,
        )]);
        match classify(&c).unwrap() {
            Step::Proceed(build) => {
                assert_eq!(build.content_ref.as_str(), "f00d");
                assert!(build.location.ends_with("/2023/2023-05-01/abcdefghijklmnopqrst.js"));
            }
            other => panic!("expected Proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_month_day_directories_accepted() {
        let c = commit(vec![file(
            "2024/02/29/0123456789abcdef0123456789.js",
            FileStatus::Added,
        )]);
        assert!(!classify(&c).unwrap().is_skip());
    }

    #[test]
    fn test_path_pattern_cases() {
        assert!(is_build_path("/2023/2023-05-01/abcdefghijklmnopqrst.js"));
        assert!(is_build_path("x/2023/05/01/abcdefghijklmnopqrstuvwxyz.js"));
        assert!(!is_build_path("/2023/report.js"));
        assert!(!is_build_path("/2023/01/ab12.js"));
        assert!(!is_build_path("/2023/01/02/ab12.js"));
        assert!(!is_build_path("/2023/2023-05-01/ABCDEFGHIJKLMNOPQRST.js"));
        assert!(!is_build_path("/2023/2023-05-01/abcdefghijklmnopqrst.css"));
        assert!(!is_build_path("/2023/2023-05-01/abcdefghijklmnopqrst.js.map"));
        assert!(!is_build_path("/٢٠٢٣/٠٥/٠١/abcdefghijklmnopqrst.js"));
        assert!(!is_build_path("/2023/٢٠٢٣-٠٥-٠١/abcdefghijklmnopqrst.js"));
    }

    #[test]
    fn test_encoded_non_ascii_digits_rejected() {
        let mut f = file("2023/2023-05-01/abcdefghijklmnopqrst.js", FileStatus::Added);
        // Arabic-Indic 2023/05/01
        f.location = Some(format!(
            "{BLOB_BASE}/%D9%A2%D9%A0%D9%A2%D9%A3%2F%D9%A0%D9%A5%2F%D9%A0%D9%A1/abcdefghijklmnopqrst.js"
        ));
        assert_eq!(
            classify(&commit(vec![f])).unwrap(),
            Step::Skip(SkipReason::NotBuildFile)
        );
    }

    #[test]
    fn test_modified_file_rejected() {
        let c = commit(vec![file(
            "2023/2023-05-01/abcdefghijklmnopqrst.js",
            FileStatus::Modified,
        )]);
        assert_eq!(classify(&c).unwrap(), Step::Skip(SkipReason::NotBuildCommit));
    }

    #[test]
    fn test_empty_commit_rejected() {
        assert_eq!(
            classify(&commit(vec![])).unwrap(),
            Step::Skip(SkipReason::NotBuildCommit)
        );
    }

    #[test]
    fn test_multi_file_commit_rejected_even_if_first_matches() {
        let c = commit(vec![
            file("2023/2023-05-01/abcdefghijklmnopqrst.js", FileStatus::Added),
            file("current.js", FileStatus::Modified),
        ]);
        assert_eq!(classify(&c).unwrap(), Step::Skip(SkipReason::NotBuildCommit));
    }

    #[test]
    fn test_non_matching_path_is_not_build_file() {
        let c = commit(vec![file("2023/report.js", FileStatus::Added)]);
        assert_eq!(classify(&c).unwrap(), Step::Skip(SkipReason::NotBuildFile));
    }

    #[test]
    fn test_missing_location_is_not_build_file() {
        let mut f = file("2023/2023-05-01/abcdefghijklmnopqrst.js", FileStatus::Added);
        f.location = None;
        assert_eq!(
            classify(&commit(vec![f])).unwrap(),
            Step::Skip(SkipReason::NotBuildFile)
        );
    }

    #[test]
    fn test_encoded_location_is_decoded_before_matching() {
        let mut f = file("2023/2023-05-01/abcdefghijklmnopqrst.js", FileStatus::Added);
        f.location = Some(format!("{BLOB_BASE}/2023%2F05%2F01/abcdefghijklmnopqrst.js"));
        assert!(!classify(&commit(vec![f])).unwrap().is_skip());
    }

    #[test]
    fn test_malformed_escape_is_error() {
        let mut f = file("2023/2023-05-01/abcdefghijklmnopqrst.js", FileStatus::Added);
        f.location = Some(format!("{BLOB_BASE}/100%/abcdefghijklmnopqrst.js"));
        let err = classify(&commit(vec![f])).unwrap_err();
        assert!(matches!(err, BuildwatchError::MalformedLocation { .. }));
    }

    #[test]
    fn test_decode_location() {
        assert_eq!(decode_location("a%20b").unwrap(), "a b");
        assert_eq!(decode_location("caf%C3%A9").unwrap(), "café");
        assert!(decode_location("%E9").is_err());
        assert!(decode_location("%4").is_err());
        assert!(decode_location("%zz").is_err());
    }
}
