use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use forward_core::{
    update, DeliveryStrategy, Effect, MailboxRef, Msg, RunMode, RunPhase, RunState, RunSummary,
    SearchRequest,
};
use run_logging::run_debug;
use serde::Serialize;

use crate::{
    preflight, write_atomically, Clock, ConfirmationProvider, Credentials, ForwardSettings,
    Forwarder, Interrupt, LogSink, Platform, PollSettings, Poller, Remote, RunContext, RunError,
    Sleeper, Submitter,
};

/// Everything the operator asked for in one invocation.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub request: SearchRequest,
    pub target: MailboxRef,
    pub mode: RunMode,
    pub strategy: DeliveryStrategy,
    pub poll: PollSettings,
    pub poll_timeout: Duration,
    pub export_timeout: Duration,
    pub credentials: Option<Credentials>,
    pub summary_path: Option<PathBuf>,
}

/// External capabilities a run is allowed to use.
pub struct Collaborators<'a> {
    /// `None` when no endpoint is configured; only test runs can proceed then.
    pub platform: Option<Platform<'a>>,
    pub confirm: &'a dyn ConfirmationProvider,
    pub clock: &'a dyn Clock,
    pub sleeper: &'a dyn Sleeper,
    pub log: &'a dyn LogSink,
    /// Stops a live run early; the session is still released.
    pub interrupt: &'a dyn Interrupt,
}

#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub error: Option<RunError>,
}

impl RunReport {
    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.state.summary()
    }

    /// 0 for a finished or operator-cancelled run, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        if self.error.is_none() && self.state.phase().is_success() {
            0
        } else {
            1
        }
    }
}

/// Audit record written to the summary file at the end of a run.
#[derive(Debug, Serialize)]
pub struct RunRecord<'a> {
    pub phase: RunPhase,
    pub mode: RunMode,
    pub strategy: DeliveryStrategy,
    pub source: &'a str,
    pub query: String,
    pub target: &'a MailboxRef,
    pub failure: Option<String>,
    pub summary: Option<&'a RunSummary>,
    pub finished_at: DateTime<Utc>,
}

/// Runs one forward from start to a terminal phase. Never returns early with
/// a live session: whatever happens after `connect`, `disconnect` is called
/// exactly once before this returns.
pub async fn execute(plan: &RunPlan, deps: &Collaborators<'_>) -> RunReport {
    let ctx = RunContext {
        clock: deps.clock,
        sleeper: deps.sleeper,
        log: deps.log,
    };
    deps.log.info(&format!(
        "Run starting: mode={} strategy={} source={} target={} window={}..={}",
        plan.mode,
        plan.strategy,
        plan.request.source_scope(),
        plan.target,
        plan.request.date_range_start(),
        plan.request.date_range_end()
    ));

    let report = match preflight(plan, deps.platform.is_some()) {
        Err(err) => idle_failure(plan, err),
        Ok(()) => match (plan.mode, deps.platform) {
            (RunMode::Live, Some(platform)) => with_session(plan, deps, ctx, platform).await,
            (RunMode::Live, None) => idle_failure(
                plan,
                RunError::EnvironmentUnready("no platform configured".to_string()),
            ),
            (RunMode::Test, _) => {
                let mut state = RunState::new(plan.mode, plan.strategy);
                let mut error = None;
                drive(plan, deps, ctx, Remote::Test, &mut state, &mut error).await;
                RunReport { state, error }
            }
        },
    };

    finalize(plan, deps, &report);
    report
}

async fn with_session(
    plan: &RunPlan,
    deps: &Collaborators<'_>,
    ctx: RunContext<'_>,
    platform: Platform<'_>,
) -> RunReport {
    let Some(credentials) = plan.credentials.as_ref() else {
        return idle_failure(
            plan,
            RunError::EnvironmentUnready("live mode needs credentials".to_string()),
        );
    };

    let session = match platform.sessions.connect(credentials).await {
        Ok(session) => session,
        Err(err) => {
            return idle_failure(plan, RunError::AuthenticationFailed(err.to_string()));
        }
    };
    deps.log.info(&format!(
        "Connected as {} (session {})",
        credentials.username, session.id
    ));

    let remote = Remote::Live {
        api: platform.api,
        session: &session,
    };
    let mut state = RunState::new(plan.mode, plan.strategy);
    let mut error = None;
    let interrupted = tokio::select! {
        // Listen before driving, so the handler is in place for the whole run.
        biased;
        () = deps.interrupt.interrupted() => true,
        () = drive(plan, deps, ctx, remote, &mut state, &mut error) => false,
    };
    if interrupted && !state.is_terminal() {
        deps.log
            .warn(&format!("Interrupted while {:?}; stopping", state.phase()));
        let (next, _) = update(state, Msg::Interrupted);
        state = next;
        error = Some(RunError::Interrupted);
    }
    let report = RunReport { state, error };

    match platform.sessions.disconnect(&session).await {
        Ok(()) => deps.log.info(&format!("Disconnected session {}", session.id)),
        Err(err) => deps.log.warn(&format!(
            "Failed to disconnect session {}: {}",
            session.id, err
        )),
    }
    report
}

/// Feeds the state machine until it reaches a terminal phase, executing each
/// effect it emits in order. `state` and `error` stay current after every
/// message, so a caller that stops this future early still sees the latest.
async fn drive(
    plan: &RunPlan,
    deps: &Collaborators<'_>,
    ctx: RunContext<'_>,
    remote: Remote<'_>,
    state: &mut RunState,
    error: &mut Option<RunError>,
) {
    let submitter = Submitter::new(ctx);
    let poller = Poller::new(ctx, plan.poll.clone());
    let forwarder = Forwarder::new(
        ctx,
        &poller,
        ForwardSettings {
            strategy: plan.strategy,
            source_scope: plan.request.source_scope().to_string(),
            export_timeout: plan.export_timeout,
        },
    );

    let first = match remote {
        // Nothing leaves the process in test mode, so there is nothing to confirm.
        Remote::Test => Msg::Confirmed,
        Remote::Live { .. } => {
            if deps.confirm.confirm(&confirmation_prompt(plan)) {
                Msg::Confirmed
            } else {
                Msg::Declined
            }
        }
    };

    let mut inbox = VecDeque::from([first]);

    while let Some(msg) = inbox.pop_front() {
        let (next, effects) = update(std::mem::take(state), msg);
        *state = next;
        for effect in effects {
            let reply = match effect {
                Effect::SubmitSearch => match submitter.submit(&plan.request, remote).await {
                    Ok(job) => Msg::JobSubmitted(job),
                    Err(err) => {
                        let detail = err.to_string();
                        *error = Some(err);
                        Msg::SubmissionFailed { detail }
                    }
                },
                Effect::AwaitCompletion { job } => {
                    match poller.await_completion(job, remote, plan.poll_timeout).await {
                        Ok(job) => Msg::JobCompleted(job),
                        Err(err) => {
                            let msg = match &err {
                                RunError::PollTimedOut { job, .. } => {
                                    Msg::PollTimedOut { job: job.clone() }
                                }
                                other => Msg::JobFailed {
                                    detail: other.to_string(),
                                },
                            };
                            *error = Some(err);
                            msg
                        }
                    }
                }
                Effect::Forward { job } => {
                    match forwarder.forward(&job, &plan.target, remote).await {
                        Ok(summary) => Msg::ForwardFinished(summary),
                        Err(err) => {
                            let detail = err.to_string();
                            *error = Some(err);
                            Msg::ForwardFailed { detail }
                        }
                    }
                }
                Effect::Finish { phase } => {
                    run_debug!("Run reached terminal phase {:?}", phase);
                    continue;
                }
            };
            inbox.push_back(reply);
        }
    }
}

fn confirmation_prompt(plan: &RunPlan) -> String {
    format!(
        "Forward mail received {} through {} from {} to {} ({} strategy)?",
        plan.request.date_range_start(),
        plan.request.date_range_end(),
        plan.request.source_scope(),
        plan.target,
        plan.strategy
    )
}

fn idle_failure(plan: &RunPlan, err: RunError) -> RunReport {
    RunReport {
        state: RunState::new(plan.mode, plan.strategy),
        error: Some(err),
    }
}

fn finalize(plan: &RunPlan, deps: &Collaborators<'_>, report: &RunReport) {
    if let Some(err) = &report.error {
        deps.log.error(&format!("Run failed: {err}"));
    }
    match report.phase() {
        RunPhase::Cancelled => deps.log.info("Run cancelled by operator; nothing was forwarded"),
        RunPhase::Done => {
            if let Some(summary) = report.summary() {
                deps.log.info(&format!("Run summary: {summary}"));
                if summary.is_partial() {
                    deps.log.warn(&format!(
                        "{} of {} item(s) were not forwarded",
                        summary.failed, summary.matched_items
                    ));
                }
            }
        }
        phase => deps.log.info(&format!("Run ended in phase {phase:?}")),
    }

    let Some(path) = &plan.summary_path else {
        return;
    };
    let record = RunRecord {
        phase: report.phase(),
        mode: plan.mode,
        strategy: plan.strategy,
        source: plan.request.source_scope(),
        query: plan.request.query(),
        target: &plan.target,
        failure: report
            .error
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| report.state.failure().map(ToOwned::to_owned)),
        summary: report.summary(),
        finished_at: deps.clock.utc_now(),
    };
    let written = serde_json::to_string_pretty(&record)
        .map_err(|err| err.to_string())
        .and_then(|json| write_atomically(path, &json).map_err(|err| err.to_string()));
    match written {
        Ok(()) => deps
            .log
            .info(&format!("Run record written to {}", path.display())),
        Err(err) => deps.log.warn(&format!(
            "Could not write run record to {}: {}",
            path.display(),
            err
        )),
    }
}
