use crate::{Effect, JobStatus, Msg, RunPhase, RunState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase are ignored, so a late or
/// duplicated report can never move a run backward or out of a terminal phase.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (RunPhase::Idle, Msg::Confirmed) => {
            state.transition(RunPhase::Submitted);
            vec![Effect::SubmitSearch]
        }
        (RunPhase::Idle, Msg::Declined) => finish(&mut state, RunPhase::Cancelled),
        (RunPhase::Submitted, Msg::JobSubmitted(job)) => {
            state.set_job(job.clone());
            state.transition(RunPhase::Polling);
            vec![Effect::AwaitCompletion { job }]
        }
        (RunPhase::Submitted, Msg::SubmissionFailed { detail }) => fail(&mut state, detail),
        (RunPhase::Polling, Msg::JobCompleted(job)) => {
            if job.status() != JobStatus::Completed {
                let detail = format!("job {} reported done while {}", job.id(), job.status());
                state.set_job(job);
                fail(&mut state, detail)
            } else {
                state.set_job(job.clone());
                state.transition(RunPhase::Forwarding);
                vec![Effect::Forward { job }]
            }
        }
        (RunPhase::Polling, Msg::JobFailed { detail }) => fail(&mut state, detail),
        (RunPhase::Polling, Msg::PollTimedOut { job }) => {
            state.set_failure(format!("job {} did not complete before the deadline", job.id()));
            state.set_job(job);
            finish(&mut state, RunPhase::TimedOut)
        }
        (RunPhase::Forwarding, Msg::ForwardFinished(summary)) => {
            state.set_summary(summary);
            finish(&mut state, RunPhase::Done)
        }
        (RunPhase::Forwarding, Msg::ForwardFailed { detail }) => fail(&mut state, detail),
        (phase, Msg::Interrupted) if !phase.is_terminal() => fail(
            &mut state,
            format!("interrupted by operator while {}", describe(phase)),
        ),
        _ => Vec::new(),
    };

    (state, effects)
}

fn fail(state: &mut RunState, detail: String) -> Vec<Effect> {
    state.set_failure(detail);
    finish(state, RunPhase::Failed)
}

fn describe(phase: RunPhase) -> &'static str {
    match phase {
        RunPhase::Idle => "awaiting confirmation",
        RunPhase::Submitted => "submitting the search",
        RunPhase::Polling => "waiting for the search",
        RunPhase::Forwarding => "forwarding",
        RunPhase::Done | RunPhase::Failed | RunPhase::TimedOut | RunPhase::Cancelled => "finished",
    }
}

fn finish(state: &mut RunState, phase: RunPhase) -> Vec<Effect> {
    state.transition(phase);
    vec![Effect::Finish { phase }]
}
