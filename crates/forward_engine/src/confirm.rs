/// Asks the operator whether a run may proceed.
pub trait ConfirmationProvider: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way; used for `--yes` and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmationProvider for FixedAnswer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
