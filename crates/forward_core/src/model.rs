use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::date_range_predicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Live,
    /// Synthesizes jobs and summaries without contacting any remote system.
    Test,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Live => write!(f, "live"),
            RunMode::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStrategy {
    /// One forward call per matched item, each with its own outcome.
    #[default]
    PerItem,
    /// One export action for the whole job; only aggregate counts are known.
    BulkExport,
}

impl DeliveryStrategy {
    /// Folder used when the operator does not name one.
    pub fn default_folder(self) -> &'static str {
        match self {
            DeliveryStrategy::PerItem => "Inbox",
            DeliveryStrategy::BulkExport => "ForwardedEmails",
        }
    }
}

impl fmt::Display for DeliveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStrategy::PerItem => write!(f, "per-item"),
            DeliveryStrategy::BulkExport => write!(f, "bulk-export"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxRef {
    pub address: String,
    pub folder: String,
}

impl MailboxRef {
    pub fn new(address: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            folder: folder.into(),
        }
    }
}

impl fmt::Display for MailboxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.folder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("source mailbox scope is empty")]
    EmptyScope,
    #[error("date range start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Search over one mailbox for items received within an inclusive date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    source_scope: String,
    date_range_start: NaiveDate,
    date_range_end: NaiveDate,
}

impl SearchRequest {
    pub fn new(
        source_scope: impl Into<String>,
        date_range_start: NaiveDate,
        date_range_end: NaiveDate,
    ) -> Result<Self, RequestError> {
        let source_scope = source_scope.into().trim().to_string();
        if source_scope.is_empty() {
            return Err(RequestError::EmptyScope);
        }
        if date_range_start > date_range_end {
            return Err(RequestError::InvertedRange {
                start: date_range_start,
                end: date_range_end,
            });
        }
        Ok(Self {
            source_scope,
            date_range_start,
            date_range_end,
        })
    }

    pub fn source_scope(&self) -> &str {
        &self.source_scope
    }

    pub fn date_range_start(&self) -> NaiveDate {
        self.date_range_start
    }

    pub fn date_range_end(&self) -> NaiveDate {
        self.date_range_end
    }

    pub fn query(&self) -> String {
        date_range_predicate(self.date_range_start, self.date_range_end)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_range_start <= date && date <= self.date_range_end
    }

    /// Number of calendar days in the window, both bounds included.
    pub fn day_count(&self) -> u64 {
        (self.date_range_end - self.date_range_start).num_days() as u64 + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Search,
    ExportAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
    TimedOut,
}

impl JobStatus {
    fn rank(self) -> u8 {
        match self {
            JobStatus::NotStarted => 0,
            JobStatus::Running => 1,
            JobStatus::Completed | JobStatus::Failed | JobStatus::TimedOut => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Transitions only move forward and never leave a terminal state.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::NotStarted => "not started",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::TimedOut => "timed out",
        };
        f.write_str(label)
    }
}

/// Handle to a remote asynchronous operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    id: String,
    kind: JobKind,
    status: JobStatus,
    created_at: DateTime<Utc>,
    item_count: Option<u64>,
    total_bytes: Option<u64>,
}

impl Job {
    pub fn new(id: impl Into<String>, kind: JobKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind,
            status: JobStatus::NotStarted,
            created_at,
            item_count: None,
            total_bytes: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn item_count(&self) -> Option<u64> {
        self.item_count
    }

    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Applies a freshly observed status. Returns `false` when the status would
    /// move backward or out of a terminal state; the job is left untouched.
    pub fn refresh(&mut self, status: JobStatus) -> bool {
        if self.status == status {
            return true;
        }
        if !self.status.can_advance_to(status) {
            return false;
        }
        self.status = status;
        true
    }

    pub fn record_stats(&mut self, item_count: Option<u64>, total_bytes: Option<u64>) {
        if item_count.is_some() {
            self.item_count = item_count;
        }
        if total_bytes.is_some() {
            self.total_bytes = total_bytes;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardOutcome {
    item_id: String,
    delivered: bool,
    error_detail: Option<String>,
}

impl ForwardOutcome {
    pub fn delivered(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            delivered: true,
            error_detail: None,
        }
    }

    pub fn failed(item_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            delivered: false,
            error_detail: Some(detail.into()),
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub strategy: DeliveryStrategy,
    pub job_id: String,
    pub target: MailboxRef,
    pub matched_items: u64,
    pub delivered: u64,
    pub failed: u64,
    pub total_bytes: Option<u64>,
    pub elapsed: Duration,
    /// Filled only by the per-item strategy.
    pub outcomes: Vec<ForwardOutcome>,
}

impl RunSummary {
    pub fn from_outcomes(
        job: &Job,
        target: MailboxRef,
        outcomes: Vec<ForwardOutcome>,
        elapsed: Duration,
    ) -> Self {
        let delivered = outcomes.iter().filter(|o| o.is_delivered()).count() as u64;
        let matched_items = outcomes.len() as u64;
        Self {
            mode: RunMode::Live,
            strategy: DeliveryStrategy::PerItem,
            job_id: job.id().to_string(),
            target,
            matched_items,
            delivered,
            failed: matched_items - delivered,
            total_bytes: job.total_bytes(),
            elapsed,
            outcomes,
        }
    }

    /// Summary of a bulk export action; the platform handled individual items.
    pub fn from_export(action: &Job, target: MailboxRef, elapsed: Duration) -> Self {
        let matched_items = action.item_count().unwrap_or(0);
        Self {
            mode: RunMode::Live,
            strategy: DeliveryStrategy::BulkExport,
            job_id: action.id().to_string(),
            target,
            matched_items,
            delivered: matched_items,
            failed: 0,
            total_bytes: action.total_bytes(),
            elapsed,
            outcomes: Vec::new(),
        }
    }

    /// What a live run would have delivered. Nothing was sent.
    pub fn simulated(
        job: &Job,
        strategy: DeliveryStrategy,
        target: MailboxRef,
        elapsed: Duration,
    ) -> Self {
        Self {
            mode: RunMode::Test,
            strategy,
            job_id: job.id().to_string(),
            target,
            matched_items: job.item_count().unwrap_or(0),
            delivered: 0,
            failed: 0,
            total_bytes: job.total_bytes(),
            elapsed,
            outcomes: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }

    pub fn failed_outcomes(&self) -> impl Iterator<Item = &ForwardOutcome> {
        self.outcomes.iter().filter(|o| !o.is_delivered())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={} strategy={} job={} target={} matched={} delivered={} failed={} bytes={} elapsed={:.1}s",
            self.mode,
            self.strategy,
            self.job_id,
            self.target,
            self.matched_items,
            self.delivered,
            self.failed,
            self.total_bytes
                .map(|b| b.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            self.elapsed.as_secs_f64()
        )
    }
}
