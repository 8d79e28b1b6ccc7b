use forward_core::{MailboxRef, RunMode};

use crate::{ApiError, Credentials, Session, StatusReport};

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    async fn disconnect(&self, session: &Session) -> Result<(), ApiError>;
}

/// Remote search and delivery operations of the mail platform.
#[async_trait::async_trait]
pub trait ComplianceApi: Send + Sync {
    async fn create_job(
        &self,
        session: &Session,
        scope: &str,
        query: &str,
    ) -> Result<String, ApiError>;

    async fn start(&self, session: &Session, job_id: &str) -> Result<(), ApiError>;

    async fn get_status(&self, session: &Session, job_id: &str) -> Result<StatusReport, ApiError>;

    async fn create_export_action(
        &self,
        session: &Session,
        job_id: &str,
        target: &MailboxRef,
    ) -> Result<String, ApiError>;

    async fn get_action_status(
        &self,
        session: &Session,
        action_id: &str,
    ) -> Result<StatusReport, ApiError>;

    async fn list_result_item_ids(
        &self,
        session: &Session,
        job_id: &str,
    ) -> Result<Vec<String>, ApiError>;

    async fn forward_item(
        &self,
        session: &Session,
        source_scope: &str,
        item_id: &str,
        target: &MailboxRef,
    ) -> Result<(), ApiError>;
}

/// Both halves of a platform binding.
#[derive(Clone, Copy)]
pub struct Platform<'a> {
    pub sessions: &'a dyn SessionService,
    pub api: &'a dyn ComplianceApi,
}

/// What a component may talk to. Test mode carries no handle at all, so a
/// test run cannot reach the platform.
#[derive(Clone, Copy)]
pub enum Remote<'a> {
    Live {
        api: &'a dyn ComplianceApi,
        session: &'a Session,
    },
    Test,
}

impl Remote<'_> {
    pub fn mode(&self) -> RunMode {
        match self {
            Remote::Live { .. } => RunMode::Live,
            Remote::Test => RunMode::Test,
        }
    }
}
