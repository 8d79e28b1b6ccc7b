use std::collections::HashSet;
use std::time::Duration;

use forward_core::{
    DeliveryStrategy, ForwardOutcome, Job, JobKind, JobStatus, MailboxRef, RunSummary,
};

use crate::{ComplianceApi, Poller, Remote, RunContext, RunError, Session};

#[derive(Debug, Clone)]
pub struct ForwardSettings {
    pub strategy: DeliveryStrategy,
    /// Mailbox the matched items are read from.
    pub source_scope: String,
    /// Deadline for a bulk export action to finish.
    pub export_timeout: Duration,
}

/// Delivers the items matched by a completed search to the target mailbox.
pub struct Forwarder<'a> {
    ctx: RunContext<'a>,
    poller: &'a Poller<'a>,
    settings: ForwardSettings,
}

impl<'a> Forwarder<'a> {
    pub fn new(ctx: RunContext<'a>, poller: &'a Poller<'a>, settings: ForwardSettings) -> Self {
        Self {
            ctx,
            poller,
            settings,
        }
    }

    pub async fn forward(
        &self,
        job: &Job,
        target: &MailboxRef,
        remote: Remote<'_>,
    ) -> Result<RunSummary, RunError> {
        if job.status() != JobStatus::Completed {
            return Err(RunError::JobNotCompleted {
                job_id: job.id().to_string(),
                status: job.status(),
            });
        }

        let started = self.ctx.clock.now();
        match remote {
            Remote::Test => {
                let summary = RunSummary::simulated(
                    job,
                    self.settings.strategy,
                    target.clone(),
                    self.ctx.clock.now().saturating_duration_since(started),
                );
                self.ctx.log.info(&format!(
                    "[test] would forward {} item(s) from {} to {} using the {} strategy; nothing was sent",
                    summary.matched_items,
                    self.settings.source_scope,
                    target,
                    self.settings.strategy
                ));
                Ok(summary)
            }
            Remote::Live { api, session } => match self.settings.strategy {
                DeliveryStrategy::PerItem => {
                    let outcomes = self.forward_each(api, session, job, target).await?;
                    Ok(RunSummary::from_outcomes(
                        job,
                        target.clone(),
                        outcomes,
                        self.ctx.clock.now().saturating_duration_since(started),
                    ))
                }
                DeliveryStrategy::BulkExport => {
                    let action = self.export_all(api, session, job, target, remote).await?;
                    Ok(RunSummary::from_export(
                        &action,
                        target.clone(),
                        self.ctx.clock.now().saturating_duration_since(started),
                    ))
                }
            },
        }
    }

    /// One forward call per distinct item. A failed item is recorded and the
    /// loop moves on; only failing to list the items aborts.
    async fn forward_each(
        &self,
        api: &dyn ComplianceApi,
        session: &Session,
        job: &Job,
        target: &MailboxRef,
    ) -> Result<Vec<ForwardOutcome>, RunError> {
        let item_ids = api
            .list_result_item_ids(session, job.id())
            .await
            .map_err(|err| RunError::from_api(err, RunError::ForwardFailed))?;
        self.ctx.log.info(&format!(
            "Forwarding {} matched item(s) from {} to {}",
            item_ids.len(),
            self.settings.source_scope,
            target
        ));

        let mut seen = HashSet::with_capacity(item_ids.len());
        let mut outcomes = Vec::with_capacity(item_ids.len());
        for item_id in item_ids {
            if !seen.insert(item_id.clone()) {
                self.ctx.log.info(&format!(
                    "Item {} listed twice for job {}; forwarded once",
                    item_id,
                    job.id()
                ));
                continue;
            }
            let outcome = match api
                .forward_item(session, &self.settings.source_scope, &item_id, target)
                .await
            {
                Ok(()) => {
                    self.ctx.log.info(&format!("Forwarded item {item_id}"));
                    ForwardOutcome::delivered(item_id)
                }
                Err(err) => {
                    self.ctx
                        .log
                        .warn(&format!("Failed to forward item {item_id}: {err}"));
                    ForwardOutcome::failed(item_id, err.to_string())
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn export_all(
        &self,
        api: &dyn ComplianceApi,
        session: &Session,
        job: &Job,
        target: &MailboxRef,
        remote: Remote<'_>,
    ) -> Result<Job, RunError> {
        let action_id = api
            .create_export_action(session, job.id(), target)
            .await
            .map_err(|err| RunError::from_api(err, RunError::ForwardFailed))?;
        self.ctx.log.info(&format!(
            "Export action {} created for job {} targeting {}",
            action_id,
            job.id(),
            target
        ));

        let mut action = Job::new(action_id, JobKind::ExportAction, self.ctx.clock.utc_now());
        action.refresh(JobStatus::Running);
        // The search already knows how much matched; the action may refine it.
        action.record_stats(job.item_count(), job.total_bytes());

        self.poller
            .await_completion(action, remote, self.settings.export_timeout)
            .await
    }
}
