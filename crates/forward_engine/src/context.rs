use crate::{Clock, LogSink, Sleeper};

/// Local capabilities shared by the submitter, poller and forwarder.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub clock: &'a dyn Clock,
    pub sleeper: &'a dyn Sleeper,
    pub log: &'a dyn LogSink,
}
