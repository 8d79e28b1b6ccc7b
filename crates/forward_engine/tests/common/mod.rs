#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, Once};
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use forward_core::{DeliveryStrategy, JobStatus, MailboxRef, RunMode, SearchRequest};
use forward_engine::{
    ApiError, ApiFailureKind, Clock, ComplianceApi, Credentials, Interrupt, LogSink, PollSettings,
    RunContext, RunPlan, Session, SessionService, Sleeper, StatusReport,
};
use log::Level;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(run_logging::initialize_for_tests);
}

/// Clock and sleeper in one: sleeping advances time instantly, then yields
/// once so anything racing the sleeper gets polled.
pub struct ManualClock {
    base: Instant,
    base_utc: DateTime<Utc>,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            base_utc: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn sleep_secs(&self) -> Vec<u64> {
        self.sleeps().iter().map(Duration::as_secs).collect()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.base_utc + chrono::Duration::from_std(self.elapsed()).unwrap()
    }
}

#[async_trait::async_trait]
impl Sleeper for ManualClock {
    async fn sleep(&self, duration: Duration) {
        *self.offset.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(_, line)| line.contains(needle))
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl LogSink for RecordingSink {
    fn write_line(&self, level: Level, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}

/// Every call a fake platform received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Disconnect(String),
    CreateJob { scope: String, query: String },
    Start(String),
    GetStatus(String),
    CreateExport { job_id: String, target: MailboxRef },
    GetActionStatus(String),
    ListItems(String),
    Forward { source: String, item_id: String },
}

/// Scripted platform. Status scripts are consumed one entry per call; the
/// last entry repeats once the script runs out.
pub struct FakePlatform {
    pub calls: Mutex<Vec<Call>>,
    pub connect_error: Option<ApiError>,
    pub disconnect_error: Option<ApiError>,
    pub create_error: Option<ApiError>,
    pub list_error: Option<ApiError>,
    pub export_error: Option<ApiError>,
    pub search_statuses: Mutex<VecDeque<Result<StatusReport, ApiError>>>,
    pub action_statuses: Mutex<VecDeque<Result<StatusReport, ApiError>>>,
    pub items: Vec<String>,
    pub failing_items: HashSet<String>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            connect_error: None,
            disconnect_error: None,
            create_error: None,
            list_error: None,
            export_error: None,
            search_statuses: Mutex::new(VecDeque::from([Ok(StatusReport::new(
                JobStatus::Completed,
            ))])),
            action_statuses: Mutex::new(VecDeque::from([Ok(StatusReport::new(
                JobStatus::Completed,
            ))])),
            items: Vec::new(),
            failing_items: HashSet::new(),
        }
    }

    pub fn with_search_statuses(self, script: Vec<Result<StatusReport, ApiError>>) -> Self {
        *self.search_statuses.lock().unwrap() = script.into();
        self
    }

    pub fn with_action_statuses(self, script: Vec<Result<StatusReport, ApiError>>) -> Self {
        *self.action_statuses.lock().unwrap() = script.into();
        self
    }

    pub fn with_items(mut self, items: &[&str]) -> Self {
        self.items = items.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing(mut self, items: &[&str]) -> Self {
        self.failing_items = items.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn disconnects(&self) -> usize {
        self.count(|c| matches!(c, Call::Disconnect(_)))
    }

    pub fn status_checks(&self) -> usize {
        self.count(|c| matches!(c, Call::GetStatus(_)))
    }

    pub fn forwards(&self) -> usize {
        self.count(|c| matches!(c, Call::Forward { .. }))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_status(
        script: &Mutex<VecDeque<Result<StatusReport, ApiError>>>,
    ) -> Result<StatusReport, ApiError> {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}

#[async_trait::async_trait]
impl SessionService for FakePlatform {
    async fn connect(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        self.record(Call::Connect(credentials.username.clone()));
        if let Some(err) = &self.connect_error {
            return Err(err.clone());
        }
        Ok(Session {
            id: "session-1".to_string(),
            access_token: "token".to_string(),
        })
    }

    async fn disconnect(&self, session: &Session) -> Result<(), ApiError> {
        self.record(Call::Disconnect(session.id.clone()));
        match &self.disconnect_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ComplianceApi for FakePlatform {
    async fn create_job(
        &self,
        _session: &Session,
        scope: &str,
        query: &str,
    ) -> Result<String, ApiError> {
        self.record(Call::CreateJob {
            scope: scope.to_string(),
            query: query.to_string(),
        });
        match &self.create_error {
            Some(err) => Err(err.clone()),
            None => Ok("search-1".to_string()),
        }
    }

    async fn start(&self, _session: &Session, job_id: &str) -> Result<(), ApiError> {
        self.record(Call::Start(job_id.to_string()));
        Ok(())
    }

    async fn get_status(&self, _session: &Session, job_id: &str) -> Result<StatusReport, ApiError> {
        self.record(Call::GetStatus(job_id.to_string()));
        Self::next_status(&self.search_statuses)
    }

    async fn create_export_action(
        &self,
        _session: &Session,
        job_id: &str,
        target: &MailboxRef,
    ) -> Result<String, ApiError> {
        self.record(Call::CreateExport {
            job_id: job_id.to_string(),
            target: target.clone(),
        });
        match &self.export_error {
            Some(err) => Err(err.clone()),
            None => Ok("export-1".to_string()),
        }
    }

    async fn get_action_status(
        &self,
        _session: &Session,
        action_id: &str,
    ) -> Result<StatusReport, ApiError> {
        self.record(Call::GetActionStatus(action_id.to_string()));
        Self::next_status(&self.action_statuses)
    }

    async fn list_result_item_ids(
        &self,
        _session: &Session,
        job_id: &str,
    ) -> Result<Vec<String>, ApiError> {
        self.record(Call::ListItems(job_id.to_string()));
        match &self.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.items.clone()),
        }
    }

    async fn forward_item(
        &self,
        _session: &Session,
        source_scope: &str,
        item_id: &str,
        _target: &MailboxRef,
    ) -> Result<(), ApiError> {
        self.record(Call::Forward {
            source: source_scope.to_string(),
            item_id: item_id.to_string(),
        });
        if self.failing_items.contains(item_id) {
            return Err(ApiError::new(
                ApiFailureKind::HttpStatus(422),
                "recipient rejected item",
            ));
        }
        Ok(())
    }
}

/// Fires once the platform has answered `checks` status requests.
pub struct InterruptAfterChecks<'a> {
    pub platform: &'a FakePlatform,
    pub checks: usize,
}

#[async_trait::async_trait]
impl Interrupt for InterruptAfterChecks<'_> {
    async fn interrupted(&self) {
        while self.platform.status_checks() < self.checks {
            tokio::task::yield_now().await;
        }
    }
}

pub fn context<'a>(clock: &'a ManualClock, sink: &'a RecordingSink) -> RunContext<'a> {
    RunContext {
        clock,
        sleeper: clock,
        log: sink,
    }
}

pub fn session() -> Session {
    Session {
        id: "session-1".to_string(),
        access_token: "token".to_string(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn june_request() -> SearchRequest {
    SearchRequest::new("a@x.com", date(2024, 6, 1), date(2024, 6, 30)).unwrap()
}

pub fn plan(mode: RunMode, strategy: DeliveryStrategy) -> RunPlan {
    RunPlan {
        request: june_request(),
        target: MailboxRef::new("b@y.com", strategy.default_folder()),
        mode,
        strategy,
        poll: PollSettings::default(),
        poll_timeout: Duration::from_secs(300),
        export_timeout: Duration::from_secs(300),
        credentials: Some(Credentials::new("admin@x.com", "secret")),
        summary_path: None,
    }
}

pub fn running() -> Result<StatusReport, ApiError> {
    Ok(StatusReport::new(JobStatus::Running))
}

pub fn completed(items: u64, bytes: u64) -> Result<StatusReport, ApiError> {
    Ok(StatusReport::new(JobStatus::Completed).with_stats(items, bytes))
}
