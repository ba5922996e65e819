//! Buildwatch GitHub: the GitHub side of the bot
//!
//! - [`GitHubClient`]: `RepoPlatform` over the GitHub REST API
//! - [`load_event`]: reads the triggering event the way Actions delivers it
//!   (`GITHUB_EVENT_NAME` + the JSON file at `GITHUB_EVENT_PATH`)

pub mod client;
pub mod config;
pub mod event;
mod wire;

pub use client::GitHubClient;
pub use config::{GitHubConfig, DEFAULT_API_URL};
pub use event::load_event;

pub use buildwatch_core::platform::{PlatformError, PlatformResult};

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, PlatformError>;
