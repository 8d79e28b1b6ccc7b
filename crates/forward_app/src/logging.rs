//! Logger setup for the `mailbox-forward` binary.
//!
//! Every run writes its log to a file; `--verbose` copies the same records to
//! the terminal.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Installs the global logger. Fails if the log file cannot be created.
pub fn initialize(log_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = build_config();

    let file = File::create(log_path)
        .with_context(|| format!("could not create log file {}", log_path.display()))?;
    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![WriteLogger::new(level, config.clone(), file)];
    if verbose {
        loggers.push(TermLogger::new(
            level,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers).context("a logger is already installed")
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        // Only this tool's records; transport crates are noisy at debug.
        .add_filter_allow_str(run_logging::LOG_TARGET)
        .build()
}
