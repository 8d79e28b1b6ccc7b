use log::Level;

/// Append-only destination for auditable run events, one call per event.
pub trait LogSink: Send + Sync {
    fn write_line(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.write_line(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write_line(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write_line(Level::Error, message);
    }
}

/// Sends run events to the global `log` facade. Timestamps and destinations
/// (log file, optional terminal copy) are the installed logger's business.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLogSink;

impl LogSink for FacadeLogSink {
    fn write_line(&self, level: Level, message: &str) {
        log::log!(target: run_logging::LOG_TARGET, level, "{message}");
    }
}
