//! Pipeline orchestration: event filter → classifier → resolver →
//! orchestrator → reporter.
//!
//! Each guard stage returns a [`Step`]; a `Skip` ends the run successfully
//! without touching later stages. Every error, whichever stage raised it,
//! is caught here and becomes `DiffOutcome::Failed`.

use std::fmt;
use std::sync::Arc;

use crate::classifier::{classify, BuildFile};
use crate::config::BotConfig;
use crate::domain::{BuildwatchError, DiffOutcome, EventContext, PushSignal, Result, SkipReason, Step};
use crate::obs;
use crate::orchestrator::{Orchestrator, StringDiffer};
use crate::platform::RepoPlatform;
use crate::reporter::{Reporter, RunStatus};
use crate::resolver::resolve_snapshot;

/// Pipeline states, in order.
///
/// `TokenChecked` is the starting point of every pipeline: a [`BotConfig`]
/// cannot exist without a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineState {
    Start,
    TokenChecked,
    EventFiltered,
    CommitFetched,
    Classified,
    SnapshotResolved,
    ContentFetched,
    Diffed,
    Reported,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Start => "start",
            PipelineState::TokenChecked => "token_checked",
            PipelineState::EventFiltered => "event_filtered",
            PipelineState::CommitFetched => "commit_fetched",
            PipelineState::Classified => "classified",
            PipelineState::SnapshotResolved => "snapshot_resolved",
            PipelineState::ContentFetched => "content_fetched",
            PipelineState::Diffed => "diffed",
            PipelineState::Reported => "reported",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of evaluating a trigger, before reporting.
#[derive(Debug)]
pub struct Evaluation {
    /// Last state reached
    pub state: PipelineState,
    /// Head commit of the push, when known
    pub head: Option<String>,
    pub outcome: DiffOutcome,
}

/// Final record of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub state: PipelineState,
    pub status: RunStatus,
}

/// The build-commit diff pipeline for one invocation.
pub struct Pipeline {
    config: BotConfig,
    platform: Arc<dyn RepoPlatform>,
    orchestrator: Orchestrator,
    reporter: Reporter,
}

impl Pipeline {
    pub fn new(
        config: BotConfig,
        platform: Arc<dyn RepoPlatform>,
        differ: Arc<dyn StringDiffer>,
    ) -> Self {
        let orchestrator = Orchestrator::new(platform.clone(), differ, config.diff_mode);
        let reporter = Reporter::new(platform.clone(), &config);
        Self {
            config,
            platform,
            orchestrator,
            reporter,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Evaluate the trigger and perform the one terminal action.
    pub async fn run(&self, event: &EventContext) -> PipelineRun {
        let evaluation = self.evaluate(event).await;
        let mut state = evaluation.state;
        let status = self
            .reporter
            .report(evaluation.outcome, evaluation.head.as_deref())
            .await;
        if matches!(status, RunStatus::Commented(_)) {
            state = PipelineState::Reported;
            obs::emit_state_reached(state);
        }
        PipelineRun { state, status }
    }

    /// Evaluate the trigger without reporting.
    pub async fn evaluate(&self, event: &EventContext) -> Evaluation {
        obs::emit_pipeline_started(&event.event_name, event.head());

        let mut state = PipelineState::TokenChecked;
        let outcome = match self.advance(event, &mut state).await {
            Ok(outcome) => outcome,
            Err(err) => DiffOutcome::Failed(err),
        };
        obs::emit_evaluated(state, outcome.label());

        Evaluation {
            state,
            head: event.head().map(str::to_string),
            outcome,
        }
    }

    async fn advance(&self, event: &EventContext, state: &mut PipelineState) -> Result<DiffOutcome> {
        let push = match filter_event(event)? {
            Step::Proceed(push) => push,
            Step::Skip(reason) => return Ok(reason.into()),
        };
        reach(state, PipelineState::EventFiltered);

        let commit = self.platform.get_commit(&push.after).await?;
        reach(state, PipelineState::CommitFetched);

        let build: BuildFile = match classify(&commit)? {
            Step::Proceed(build) => build,
            Step::Skip(reason) => return Ok(reason.into()),
        };
        reach(state, PipelineState::Classified);

        let snapshot = match resolve_snapshot(
            self.platform.as_ref(),
            &push.before,
            &self.config.snapshot_file,
        )
        .await?
        {
            Step::Proceed(snapshot) => snapshot,
            Step::Skip(reason) => return Ok(reason.into()),
        };
        reach(state, PipelineState::SnapshotResolved);

        let (old, new) = self
            .orchestrator
            .fetch_pair(&snapshot, &build.content_ref)
            .await?;
        reach(state, PipelineState::ContentFetched);

        let outcome = self.orchestrator.diff_texts(&old, &new);
        if !outcome.is_failure() {
            reach(state, PipelineState::Diffed);
        }
        Ok(outcome)
    }
}

fn reach(state: &mut PipelineState, next: PipelineState) {
    *state = next;
    obs::emit_state_reached(next);
}

/// Only push events with a usable payload proceed.
pub fn filter_event(event: &EventContext) -> Result<Step<PushSignal>> {
    if !event.is_push() {
        return Ok(Step::Skip(SkipReason::NotPushEvent));
    }
    match &event.payload {
        Some(push) if !push.after.is_empty() && !push.before.is_empty() => {
            Ok(Step::Proceed(push.clone()))
        }
        Some(_) => Err(BuildwatchError::MalformedEvent(
            "push payload is missing `before` or `after`".to_string(),
        )),
        None => Err(BuildwatchError::MalformedEvent(
            "push event carries no payload".to_string(),
        )),
    }
}
