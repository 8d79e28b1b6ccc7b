use std::fmt;
use std::time::Duration;

use forward_core::{Job, JobStatus};
use thiserror::Error;

/// Operator credentials for opening a platform session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated connection. Released with `SessionService::disconnect`.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// One status observation of a remote search or export action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: JobStatus,
    pub item_count: Option<u64>,
    pub total_bytes: Option<u64>,
    pub detail: Option<String>,
}

impl StatusReport {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            item_count: None,
            total_bytes: None,
            detail: None,
        }
    }

    pub fn with_stats(mut self, item_count: u64, total_bytes: u64) -> Self {
        self.item_count = Some(item_count);
        self.total_bytes = Some(total_bytes);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiFailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFailureKind {
    Network,
    Timeout,
    Unauthorized,
    HttpStatus(u16),
    InvalidResponse,
}

impl ApiFailureKind {
    /// Failures worth another status check after the next backoff interval.
    pub fn is_transient(self) -> bool {
        match self {
            ApiFailureKind::Network | ApiFailureKind::Timeout => true,
            ApiFailureKind::HttpStatus(code) => code == 429 || code >= 500,
            ApiFailureKind::Unauthorized | ApiFailureKind::InvalidResponse => false,
        }
    }
}

impl fmt::Display for ApiFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailureKind::Network => write!(f, "network error"),
            ApiFailureKind::Timeout => write!(f, "timeout"),
            ApiFailureKind::Unauthorized => write!(f, "unauthorized"),
            ApiFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            ApiFailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// Run-level failures. Every variant is fatal for the run; per-item forward
/// failures are recorded as outcomes instead.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("environment not ready: {0}")]
    EnvironmentUnready(String),
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("search submission failed: {0}")]
    SubmissionFailed(String),
    #[error("job {} did not complete within {}s", .job.id(), .elapsed.as_secs())]
    PollTimedOut { job: Job, elapsed: Duration },
    #[error("remote job {job_id} failed: {detail}")]
    RemoteJobFailed { job_id: String, detail: String },
    #[error("job {job_id} is {status}, forwarding needs a completed job")]
    JobNotCompleted { job_id: String, status: JobStatus },
    #[error("forwarding failed: {0}")]
    ForwardFailed(String),
    #[error("run interrupted by operator")]
    Interrupted,
}

impl RunError {
    /// Maps an API error, keeping expired sessions distinct from other failures.
    pub(crate) fn from_api(err: ApiError, otherwise: impl FnOnce(String) -> RunError) -> Self {
        match err.kind {
            ApiFailureKind::Unauthorized => RunError::AuthenticationFailed(err.to_string()),
            _ => otherwise(err.to_string()),
        }
    }
}
