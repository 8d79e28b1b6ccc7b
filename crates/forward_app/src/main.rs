mod args;
mod confirm;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use forward_engine::{
    execute, Collaborators, ConfirmationProvider, CtrlC, FacadeLogSink, FixedAnswer, HttpPlatform,
    HttpSettings, Platform, SystemClock, TokioSleeper,
};
use run_logging::{run_error, run_info};

use args::Args;
use confirm::ConsoleConfirmation;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            run_error!("{:#}", err);
            eprintln!("mailbox-forward: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<u8> {
    let log_path = args.log_path(Local::now());
    logging::initialize(&log_path, args.verbose)?;
    run_info!("Logging to {}", log_path.display());

    let plan = args.run_plan().context("invalid run request")?;
    let http = match (&args.endpoint, args.test_mode) {
        (Some(endpoint), false) => Some(
            HttpPlatform::new(HttpSettings::new(endpoint.as_str()))
                .context("invalid platform endpoint")?,
        ),
        _ => None,
    };

    let console = ConsoleConfirmation;
    let assume_yes = FixedAnswer(true);
    let confirm: &dyn ConfirmationProvider = if args.yes { &assume_yes } else { &console };
    let deps = Collaborators {
        platform: http.as_ref().map(|p| Platform {
            sessions: p,
            api: p,
        }),
        confirm,
        clock: &SystemClock,
        sleeper: &TokioSleeper,
        log: &FacadeLogSink,
        interrupt: &CtrlC,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not start the async runtime")?;
    let report = runtime.block_on(execute(&plan, &deps));
    Ok(report.exit_code())
}
