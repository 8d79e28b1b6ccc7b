use forward_core::{Job, JobKind, JobStatus, SearchRequest};

use crate::synthetic::{synthetic_item_count, synthetic_job_id};
use crate::{Remote, RunContext, RunError};

/// Creates and starts the remote search for a request.
pub struct Submitter<'a> {
    ctx: RunContext<'a>,
}

impl<'a> Submitter<'a> {
    pub fn new(ctx: RunContext<'a>) -> Self {
        Self { ctx }
    }

    /// Submission errors are never retried here; the caller aborts the run.
    pub async fn submit(
        &self,
        request: &SearchRequest,
        remote: Remote<'_>,
    ) -> Result<Job, RunError> {
        let query = request.query();
        match remote {
            Remote::Test => {
                let mut job = Job::new(
                    synthetic_job_id(request),
                    JobKind::Search,
                    self.ctx.clock.utc_now(),
                );
                job.refresh(JobStatus::Running);
                job.record_stats(Some(synthetic_item_count(request)), None);
                self.ctx.log.info(&format!(
                    "[test] would search mailbox {} with query \"{}\" as job {}",
                    request.source_scope(),
                    query,
                    job.id()
                ));
                Ok(job)
            }
            Remote::Live { api, session } => {
                self.ctx.log.info(&format!(
                    "Creating search over {} with query \"{}\"",
                    request.source_scope(),
                    query
                ));
                let id = api
                    .create_job(session, request.source_scope(), &query)
                    .await
                    .map_err(|err| RunError::from_api(err, RunError::SubmissionFailed))?;
                let mut job = Job::new(id, JobKind::Search, self.ctx.clock.utc_now());

                api.start(session, job.id())
                    .await
                    .map_err(|err| RunError::from_api(err, RunError::SubmissionFailed))?;
                job.refresh(JobStatus::Running);
                self.ctx.log.info(&format!("Search job {} started", job.id()));
                Ok(job)
            }
        }
    }
}
