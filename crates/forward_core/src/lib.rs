//! Forwarding core: data model, backoff schedule and the pure run state machine.
mod backoff;
mod effect;
mod model;
mod msg;
mod query;
mod state;
mod update;

pub use backoff::Backoff;
pub use effect::Effect;
pub use model::{
    DeliveryStrategy, ForwardOutcome, Job, JobKind, JobStatus, MailboxRef, RequestError,
    RunMode, RunSummary, SearchRequest,
};
pub use msg::Msg;
pub use query::{date_range_predicate, parse_date, DATE_FORMAT};
pub use state::{RunPhase, RunState};
pub use update::update;
