//! Buildwatch Core
//!
//! Decides whether a push published a build artifact and, if so, diffs the
//! artifact's string table against the previous snapshot and posts the
//! result as a commit comment.
//!
//! ## Pipeline
//!
//! 1. Event filter: only `push` events proceed
//! 2. Classifier: exactly one added file at a dated build path
//! 3. Resolver: snapshot file at the root of the pre-push tree
//! 4. Orchestrator: fetch, decode, diff
//! 5. Reporter: skip, comment, or fail

pub mod classifier;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod obs;
pub mod orchestrator;
pub mod pipeline;
pub mod platform;
pub mod reporter;
pub mod resolver;
pub mod telemetry;

pub use classifier::{classify, decode_location, is_build_path, BuildFile, BUILD_PATH_PATTERN};
pub use config::BotConfig;
pub use domain::{
    BlobEncoding, BuildwatchError, ChangedFile, CommitRecord, ConfigError, ContentBlob,
    ContentRef, DiffOutcome, EntryKind, EventContext, FileStatus, PushSignal, Result, SkipReason,
    Step, TreeEntry, PUSH_EVENT,
};
pub use orchestrator::{Orchestrator, StringDiffer};
pub use pipeline::{filter_event, Evaluation, Pipeline, PipelineRun, PipelineState};
pub use platform::{CommentRef, PlatformError, PlatformResult, RepoPlatform};
pub use reporter::{failure_message, Reporter, RunStatus};
pub use resolver::{find_snapshot, resolve_snapshot, DEFAULT_SNAPSHOT_FILE};
pub use telemetry::init_tracing;

pub use lang_differ::{DiffMode, LangDiffer};
