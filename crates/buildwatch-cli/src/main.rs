//! Buildwatch - build artifact string-diff bot
//!
//! Runs once per workflow trigger. When a push adds a dated build file,
//! the `buildwatch` command diffs its string table against the snapshot at
//! the root of the pre-push tree and posts the changes as a comment on the
//! pushed commit.
//!
//! Every setting can come from the Actions runner environment, so inside a
//! workflow the binary needs no arguments.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use buildwatch_core::{obs, BotConfig, DiffMode, LangDiffer, Pipeline, RunStatus};
use buildwatch_github::{load_event, GitHubClient, GitHubConfig, DEFAULT_API_URL};
use clap::builder::FalseyValueParser;
use clap::Parser;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "buildwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Comment string-table diffs on pushed build artifacts", long_about = None)]
struct Cli {
    /// Token used for every GitHub API call
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository as `owner/name`
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: String,

    /// Path to the event payload JSON (required for push events)
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Snapshot file at the root of the pre-push tree
    #[arg(long, env = "BUILDWATCH_SNAPSHOT_FILE", default_value = "current.js")]
    snapshot_file: String,

    /// Comment format: `codeblock` or `plain`
    #[arg(long, env = "BUILDWATCH_DIFF_MODE", default_value = "codeblock")]
    diff_mode: DiffMode,

    /// Verbose logs and full error chains
    #[arg(long, env = "RUNNER_DEBUG", value_parser = FalseyValueParser::new())]
    debug: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Also print failures as workflow `::error::` annotations
    #[arg(long, env = "GITHUB_ACTIONS", value_parser = FalseyValueParser::new())]
    annotate: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            buildwatch_core::init_tracing(false, Level::INFO);
            return exit_code(&usage_failure(&err, annotations_from_env()));
        }
    };

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    buildwatch_core::init_tracing(cli.json, level);

    let pipeline = match build_pipeline(&cli) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            let message = if cli.debug {
                format!("{err:?}")
            } else {
                format!("{err:#}")
            };
            obs::emit_failed(&message, cli.annotate);
            return ExitCode::FAILURE;
        }
    };

    let status = match load_event(&cli.event_name, cli.event_path.as_deref()) {
        Ok(event) => {
            let run = pipeline.run(&event).await;
            info!(state = %run.state, success = run.status.is_success(), "run finished");
            run.status
        }
        Err(err) => pipeline.reporter().fail(&err),
    };

    exit_code(&status)
}

/// Validate configuration and wire the pipeline. No API call happens here.
fn build_pipeline(cli: &Cli) -> Result<Pipeline> {
    let config = BotConfig::new(cli.token.clone())?
        .with_debug(cli.debug)
        .with_snapshot_file(&cli.snapshot_file)?
        .with_diff_mode(cli.diff_mode)
        .with_annotations(cli.annotate);

    let github = GitHubConfig::new(&cli.repository, config.token())?.with_api_url(&cli.api_url);
    let client = GitHubClient::new(github).context("failed to build GitHub client")?;

    Ok(Pipeline::new(
        config,
        Arc::new(client),
        Arc::new(LangDiffer::new()),
    ))
}

/// Report an argument or environment error like any other failed run.
fn usage_failure(err: &clap::Error, annotate: bool) -> RunStatus {
    let message = err.render().to_string().trim_end().to_string();
    obs::emit_failed(&message, annotate);
    RunStatus::Failed(message)
}

/// `GITHUB_ACTIONS`, read directly when argument parsing failed.
fn annotations_from_env() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    !matches!(value.as_str(), "" | "0" | "n" | "no" | "f" | "false" | "off")
}

fn exit_code(status: &RunStatus) -> ExitCode {
    if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
