use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use clap::{Parser, ValueEnum};
use forward_core::{parse_date, DeliveryStrategy, MailboxRef, RequestError, RunMode, SearchRequest};
use forward_engine::{Credentials, PollSettings, RunPlan};

/// Forward every message received in a date window from one mailbox to another.
#[derive(Debug, Parser)]
#[command(name = "mailbox-forward")]
#[command(author, version, about)]
pub struct Args {
    /// Mailbox whose mail is searched.
    #[arg(long)]
    pub source: String,
    /// Mailbox that receives the forwarded mail.
    #[arg(long)]
    pub target: String,
    /// First day of the window, inclusive (YYYY-MM-DD).
    #[arg(long, value_parser = parse_day)]
    pub start: NaiveDate,
    /// Last day of the window, inclusive (YYYY-MM-DD).
    #[arg(long, value_parser = parse_day)]
    pub end: NaiveDate,
    /// Folder in the target mailbox [default: Inbox, or ForwardedEmails for bulk-export].
    #[arg(long)]
    pub target_folder: Option<String>,
    /// Log file [default: ./forward-YYYYMMDD-HHMMSS.log].
    #[arg(long)]
    pub log_path: Option<PathBuf>,
    /// Simulate the run without contacting the platform.
    #[arg(long)]
    pub test_mode: bool,
    /// Copy log output to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
    #[arg(long, value_enum, default_value_t = Strategy::PerItem)]
    pub strategy: Strategy,
    /// Base URL of the platform API.
    #[arg(long, env = "MAILFWD_ENDPOINT")]
    pub endpoint: Option<String>,
    #[arg(long, env = "MAILFWD_USERNAME")]
    pub username: Option<String>,
    #[arg(long, env = "MAILFWD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Give up on a search that has not completed after this many seconds.
    #[arg(long, default_value_t = 1800)]
    pub poll_timeout_secs: u64,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
    /// Write a JSON record of the run here.
    #[arg(long)]
    pub summary_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Forward each matched item individually.
    PerItem,
    /// Export all matched items in one platform action.
    BulkExport,
}

impl From<Strategy> for DeliveryStrategy {
    fn from(value: Strategy) -> Self {
        match value {
            Strategy::PerItem => DeliveryStrategy::PerItem,
            Strategy::BulkExport => DeliveryStrategy::BulkExport,
        }
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

impl Args {
    pub fn mode(&self) -> RunMode {
        if self.test_mode {
            RunMode::Test
        } else {
            RunMode::Live
        }
    }

    pub fn log_path(&self, now: DateTime<Local>) -> PathBuf {
        self.log_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!("./forward-{}.log", now.format("%Y%m%d-%H%M%S")))
        })
    }

    pub fn run_plan(&self) -> Result<RunPlan, RequestError> {
        let strategy = DeliveryStrategy::from(self.strategy);
        let request = SearchRequest::new(&self.source, self.start, self.end)?;
        let folder = self
            .target_folder
            .clone()
            .unwrap_or_else(|| strategy.default_folder().to_string());
        let timeout = Duration::from_secs(self.poll_timeout_secs);
        let credentials = self
            .username
            .as_ref()
            .map(|user| Credentials::new(user, self.password.clone().unwrap_or_default()));

        Ok(RunPlan {
            request,
            target: MailboxRef::new(self.target.trim(), folder),
            mode: self.mode(),
            strategy,
            poll: PollSettings::default(),
            poll_timeout: timeout,
            export_timeout: timeout,
            credentials,
            summary_path: self.summary_path.clone(),
        })
    }
}
