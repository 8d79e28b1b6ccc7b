//! Forwarding engine: remote collaborators and the run orchestration built on them.
mod api;
mod clock;
mod confirm;
mod context;
mod forward;
mod http;
mod interrupt;
mod persist;
mod poll;
mod preflight;
mod runner;
mod sink;
mod submit;
mod synthetic;
mod types;

pub use api::{ComplianceApi, Platform, Remote, SessionService};
pub use clock::{Clock, Sleeper, SystemClock, TokioSleeper};
pub use confirm::{ConfirmationProvider, FixedAnswer};
pub use context::RunContext;
pub use forward::{ForwardSettings, Forwarder};
pub use http::{HttpPlatform, HttpSettings};
pub use interrupt::{CtrlC, Interrupt, NoInterrupt};
pub use persist::{ensure_output_dir, write_atomically, PersistError};
pub use poll::{PollSettings, Poller};
pub use preflight::preflight;
pub use runner::{execute, Collaborators, RunPlan, RunRecord, RunReport};
pub use sink::{FacadeLogSink, LogSink};
pub use submit::Submitter;
pub use synthetic::synthetic_job_id;
pub use types::{ApiError, ApiFailureKind, Credentials, RunError, Session, StatusReport};
