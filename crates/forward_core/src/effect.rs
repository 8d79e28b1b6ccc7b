use crate::{Job, RunPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitSearch,
    AwaitCompletion { job: Job },
    Forward { job: Job },
    /// The run reached a terminal phase; nothing else will be emitted.
    Finish { phase: RunPhase },
}
