use std::sync::Once;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use forward_core::{
    update, DeliveryStrategy, Effect, ForwardOutcome, Job, JobKind, JobStatus, MailboxRef, Msg,
    RunMode, RunPhase, RunState, RunSummary,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(run_logging::initialize_for_tests);
}

fn job_with(status: JobStatus) -> Job {
    let mut job = Job::new(
        "search-42",
        JobKind::Search,
        Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap(),
    );
    job.refresh(status);
    job
}

fn submitted() -> RunState {
    let (state, _) = update(
        RunState::new(RunMode::Live, DeliveryStrategy::PerItem),
        Msg::Confirmed,
    );
    state
}

fn polling() -> RunState {
    let (state, _) = update(submitted(), Msg::JobSubmitted(job_with(JobStatus::Running)));
    state
}

fn forwarding() -> RunState {
    let (state, _) = update(polling(), Msg::JobCompleted(job_with(JobStatus::Completed)));
    state
}

fn summary() -> RunSummary {
    RunSummary::from_outcomes(
        &job_with(JobStatus::Completed),
        MailboxRef::new("b@y.com", "Inbox"),
        vec![ForwardOutcome::delivered("m1")],
        Duration::from_secs(1),
    )
}

#[test]
fn happy_path_walks_every_phase_in_order() {
    init_logging();
    let state = RunState::new(RunMode::Live, DeliveryStrategy::PerItem);
    assert_eq!(state.phase(), RunPhase::Idle);

    let (state, effects) = update(state, Msg::Confirmed);
    assert_eq!(state.phase(), RunPhase::Submitted);
    assert_eq!(effects, vec![Effect::SubmitSearch]);

    let running = job_with(JobStatus::Running);
    let (state, effects) = update(state, Msg::JobSubmitted(running.clone()));
    assert_eq!(state.phase(), RunPhase::Polling);
    assert_eq!(effects, vec![Effect::AwaitCompletion { job: running }]);

    let completed = job_with(JobStatus::Completed);
    let (state, effects) = update(state, Msg::JobCompleted(completed.clone()));
    assert_eq!(state.phase(), RunPhase::Forwarding);
    assert_eq!(effects, vec![Effect::Forward { job: completed }]);

    let (state, effects) = update(state, Msg::ForwardFinished(summary()));
    assert_eq!(state.phase(), RunPhase::Done);
    assert_eq!(
        effects,
        vec![Effect::Finish {
            phase: RunPhase::Done
        }]
    );
    assert_eq!(state.summary(), Some(&summary()));
    assert_eq!(
        state.history(),
        &[
            RunPhase::Idle,
            RunPhase::Submitted,
            RunPhase::Polling,
            RunPhase::Forwarding,
            RunPhase::Done,
        ]
    );
    assert!(state.phase().is_success());
}

#[test]
fn declining_confirmation_cancels_without_effects_beyond_finish() {
    init_logging();
    let (state, effects) = update(RunState::default(), Msg::Declined);
    assert_eq!(state.phase(), RunPhase::Cancelled);
    assert!(state.is_terminal());
    assert!(state.phase().is_success());
    assert_eq!(
        effects,
        vec![Effect::Finish {
            phase: RunPhase::Cancelled
        }]
    );
}

#[test]
fn submission_failure_skips_polling_and_forwarding() {
    init_logging();
    let (state, effects) = update(
        submitted(),
        Msg::SubmissionFailed {
            detail: "scope rejected".to_string(),
        },
    );
    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(state.failure(), Some("scope rejected"));
    assert_eq!(
        effects,
        vec![Effect::Finish {
            phase: RunPhase::Failed
        }]
    );
    assert!(!state.history().contains(&RunPhase::Forwarding));
}

#[test]
fn remote_failure_while_polling_is_fatal() {
    init_logging();
    let (state, effects) = update(
        polling(),
        Msg::JobFailed {
            detail: "search failed remotely".to_string(),
        },
    );
    assert_eq!(state.phase(), RunPhase::Failed);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::Forward { .. })));
}

#[test]
fn poll_timeout_ends_in_timed_out_and_never_forwards() {
    init_logging();
    let timed_out = job_with(JobStatus::TimedOut);
    let (state, effects) = update(
        polling(),
        Msg::PollTimedOut {
            job: timed_out.clone(),
        },
    );
    assert_eq!(state.phase(), RunPhase::TimedOut);
    assert_eq!(state.job(), Some(&timed_out));
    assert!(!state.phase().is_success());
    assert_eq!(
        effects,
        vec![Effect::Finish {
            phase: RunPhase::TimedOut
        }]
    );

    let (state, effects) = update(state, Msg::JobCompleted(job_with(JobStatus::Completed)));
    assert_eq!(state.phase(), RunPhase::TimedOut);
    assert!(effects.is_empty());
}

#[test]
fn completion_report_for_unfinished_job_fails_instead_of_forwarding() {
    init_logging();
    let (state, effects) = update(polling(), Msg::JobCompleted(job_with(JobStatus::Running)));
    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(
        effects,
        vec![Effect::Finish {
            phase: RunPhase::Failed
        }]
    );
}

#[test]
fn forwarding_failure_is_fatal() {
    init_logging();
    let (state, _) = update(
        forwarding(),
        Msg::ForwardFailed {
            detail: "export action rejected".to_string(),
        },
    );
    assert_eq!(state.phase(), RunPhase::Failed);
    assert!(state.summary().is_none());
}

#[test]
fn interruption_while_polling_fails_the_run() {
    init_logging();
    let (state, effects) = update(polling(), Msg::Interrupted);
    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(
        state.failure(),
        Some("interrupted by operator while waiting for the search")
    );
    assert_eq!(
        effects,
        vec![Effect::Finish {
            phase: RunPhase::Failed
        }]
    );
    assert_eq!(
        state.history(),
        &[
            RunPhase::Idle,
            RunPhase::Submitted,
            RunPhase::Polling,
            RunPhase::Failed
        ]
    );
}

#[test]
fn out_of_phase_messages_are_ignored() {
    init_logging();
    let idle = RunState::default();
    for msg in [
        Msg::JobSubmitted(job_with(JobStatus::Running)),
        Msg::JobCompleted(job_with(JobStatus::Completed)),
        Msg::ForwardFinished(summary()),
    ] {
        let (next, effects) = update(idle.clone(), msg);
        assert_eq!(next, idle);
        assert!(effects.is_empty());
    }

    let done = {
        let (state, _) = update(forwarding(), Msg::ForwardFinished(summary()));
        state
    };
    for msg in [
        Msg::Confirmed,
        Msg::Declined,
        Msg::JobFailed {
            detail: "late".to_string(),
        },
        Msg::Interrupted,
    ] {
        let (next, effects) = update(done.clone(), msg);
        assert_eq!(next, done);
        assert!(effects.is_empty());
    }
}
