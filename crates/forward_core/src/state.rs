use serde::Serialize;

use crate::{DeliveryStrategy, Job, RunMode, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Submitted,
    Polling,
    Forwarding,
    Done,
    Failed,
    TimedOut,
    /// Operator declined the confirmation prompt.
    Cancelled,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunPhase::Done | RunPhase::Failed | RunPhase::TimedOut | RunPhase::Cancelled
        )
    }

    /// Terminal phases that count as a successful process exit.
    pub fn is_success(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    phase: RunPhase,
    mode: RunMode,
    strategy: DeliveryStrategy,
    job: Option<Job>,
    summary: Option<RunSummary>,
    failure: Option<String>,
    history: Vec<RunPhase>,
}

impl RunState {
    pub fn new(mode: RunMode, strategy: DeliveryStrategy) -> Self {
        Self {
            phase: RunPhase::Idle,
            mode,
            strategy,
            job: None,
            summary: None,
            failure: None,
            history: vec![RunPhase::Idle],
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn strategy(&self) -> DeliveryStrategy {
        self.strategy
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Every phase the run has been in, starting with `Idle`.
    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub(crate) fn transition(&mut self, next: RunPhase) {
        self.phase = next;
        self.history.push(next);
    }

    pub(crate) fn set_job(&mut self, job: Job) {
        self.job = Some(job);
    }

    pub(crate) fn set_summary(&mut self, summary: RunSummary) {
        self.summary = Some(summary);
    }

    pub(crate) fn set_failure(&mut self, detail: String) {
        self.failure = Some(detail);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(RunMode::default(), DeliveryStrategy::default())
    }
}
