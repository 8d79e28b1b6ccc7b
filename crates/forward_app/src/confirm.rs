use std::io::{self, BufRead, Write};

use forward_engine::ConfirmationProvider;
use run_logging::run_warn;

/// Asks on stderr and reads one line from stdin. Only `y` or `yes` proceed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleConfirmation;

impl ConfirmationProvider for ConsoleConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "{prompt} [y/N] ");
        let _ = stderr.flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(err) => {
                run_warn!("Could not read confirmation, treating it as no: {}", err);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
