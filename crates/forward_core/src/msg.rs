use crate::{Job, RunSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator accepted the confirmation prompt.
    Confirmed,
    /// Operator declined the confirmation prompt.
    Declined,
    /// The search job was created and started.
    JobSubmitted(Job),
    /// The platform rejected the search request.
    SubmissionFailed { detail: String },
    /// Polling observed the job in status `Completed`.
    JobCompleted(Job),
    /// The platform reported the job as failed, or polling hit a fatal error.
    JobFailed { detail: String },
    /// The poll deadline passed before the job completed.
    PollTimedOut { job: Job },
    /// Forwarding produced its summary.
    ForwardFinished(RunSummary),
    /// Forwarding could not run at all.
    ForwardFailed { detail: String },
    /// The operator interrupted the process; the run stops where it is.
    Interrupted,
}
