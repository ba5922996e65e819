//! Domain model for a single bot invocation.
//!
//! Every value here is built fresh from the platform's current state and
//! dropped when the run ends.

pub mod blob;
pub mod commit;
pub mod error;
pub mod outcome;
pub mod push;
pub mod tree;

pub use blob::{BlobEncoding, ContentBlob};
pub use commit::{ChangedFile, CommitRecord, ContentRef, FileStatus};
pub use error::{BuildwatchError, ConfigError, Result};
pub use outcome::{DiffOutcome, SkipReason, Step};
pub use push::{EventContext, PushSignal, PUSH_EVENT};
pub use tree::{EntryKind, TreeEntry};
