use std::future;

use run_logging::run_warn;

/// Resolves when the operator asks the run to stop.
#[async_trait::async_trait]
pub trait Interrupt: Send + Sync {
    async fn interrupted(&self);
}

/// Ctrl-C from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct CtrlC;

#[async_trait::async_trait]
impl Interrupt for CtrlC {
    async fn interrupted(&self) {
        if let Err(err) = tokio::signal::ctrl_c().await {
            run_warn!("Could not listen for Ctrl-C: {}", err);
            future::pending::<()>().await;
        }
    }
}

/// Never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterrupt;

#[async_trait::async_trait]
impl Interrupt for NoInterrupt {
    async fn interrupted(&self) {
        future::pending::<()>().await;
    }
}
