use std::time::Duration;

use forward_core::{Backoff, Job, JobKind, JobStatus};
use run_logging::run_debug;

use crate::{ApiError, ComplianceApi, Remote, RunContext, RunError, Session, StatusReport};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_interval: Backoff::DEFAULT_INITIAL,
            max_interval: Backoff::DEFAULT_MAX,
        }
    }
}

/// Waits for a remote search or export action to reach a terminal status.
pub struct Poller<'a> {
    ctx: RunContext<'a>,
    settings: PollSettings,
}

impl<'a> Poller<'a> {
    pub fn new(ctx: RunContext<'a>, settings: PollSettings) -> Self {
        Self { ctx, settings }
    }

    /// Checks status, then sleeps along the backoff schedule until the job
    /// completes, fails remotely, or `timeout` of wall-clock time has elapsed.
    /// Sleeps never run past the deadline and no status check starts after it;
    /// an in-flight call is never cut short.
    pub async fn await_completion(
        &self,
        mut job: Job,
        remote: Remote<'_>,
        timeout: Duration,
    ) -> Result<Job, RunError> {
        let (api, session) = match remote {
            Remote::Test => {
                job.refresh(JobStatus::Completed);
                self.ctx.log.info(&format!(
                    "[test] job {} reported completed after a single synthetic check",
                    job.id()
                ));
                return Ok(job);
            }
            Remote::Live { api, session } => (api, session),
        };

        let started = self.ctx.clock.now();
        let mut backoff = Backoff::new(self.settings.initial_interval, self.settings.max_interval);
        let mut checks: u32 = 0;

        loop {
            checks += 1;
            match fetch_status(api, session, &job).await {
                Ok(report) => {
                    if !job.refresh(report.status) {
                        self.ctx.log.warn(&format!(
                            "Ignoring status {} for job {} which is already {}",
                            report.status,
                            job.id(),
                            job.status()
                        ));
                    }
                    job.record_stats(report.item_count, report.total_bytes);
                    match job.status() {
                        JobStatus::Completed => {
                            self.ctx.log.info(&format!(
                                "Job {} completed after {} status check(s): {} item(s), {} byte(s)",
                                job.id(),
                                checks,
                                describe(job.item_count()),
                                describe(job.total_bytes())
                            ));
                            return Ok(job);
                        }
                        JobStatus::Failed => {
                            let detail = report
                                .detail
                                .unwrap_or_else(|| "platform reported failure".to_string());
                            self.ctx
                                .log
                                .error(&format!("Job {} failed remotely: {}", job.id(), detail));
                            return Err(RunError::RemoteJobFailed {
                                job_id: job.id().to_string(),
                                detail,
                            });
                        }
                        _ => {}
                    }
                }
                Err(err) if err.is_transient() => {
                    self.ctx.log.warn(&format!(
                        "Status check {} for job {} failed, will retry: {}",
                        checks,
                        job.id(),
                        err
                    ));
                }
                Err(err) => {
                    let job_id = job.id().to_string();
                    return Err(RunError::from_api(err, |detail| RunError::RemoteJobFailed {
                        job_id,
                        detail,
                    }));
                }
            }

            let elapsed = self.ctx.clock.now().saturating_duration_since(started);
            let remaining = timeout.saturating_sub(elapsed);
            if remaining.is_zero() {
                return Err(self.give_up(job, elapsed, timeout));
            }

            let wait = backoff
                .next()
                .unwrap_or(self.settings.max_interval)
                .min(remaining);
            run_debug!(
                "Job {} is {}; next status check in {}s",
                job.id(),
                job.status(),
                wait.as_secs()
            );
            self.ctx.sleeper.sleep(wait).await;

            let elapsed = self.ctx.clock.now().saturating_duration_since(started);
            if elapsed >= timeout {
                return Err(self.give_up(job, elapsed, timeout));
            }
        }
    }

    fn give_up(&self, mut job: Job, elapsed: Duration, timeout: Duration) -> RunError {
        let last_seen = job.status();
        job.refresh(JobStatus::TimedOut);
        self.ctx.log.error(&format!(
            "Job {} still {} after {}s, giving up (limit {}s)",
            job.id(),
            last_seen,
            elapsed.as_secs(),
            timeout.as_secs()
        ));
        RunError::PollTimedOut { job, elapsed }
    }
}

async fn fetch_status(
    api: &dyn ComplianceApi,
    session: &Session,
    job: &Job,
) -> Result<StatusReport, ApiError> {
    match job.kind() {
        JobKind::Search => api.get_status(session, job.id()).await,
        JobKind::ExportAction => api.get_action_status(session, job.id()).await,
    }
}

fn describe(value: Option<u64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
