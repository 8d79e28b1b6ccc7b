use forward_core::RunMode;

use crate::persist::{ensure_output_dir, parent_dir};
use crate::{RunError, RunPlan};

/// Readiness checks that must pass before any session is opened.
pub fn preflight(plan: &RunPlan, platform_available: bool) -> Result<(), RunError> {
    if let Some(path) = &plan.summary_path {
        let dir = parent_dir(path);
        ensure_output_dir(dir).map_err(|err| {
            RunError::EnvironmentUnready(format!("summary directory {}: {}", dir.display(), err))
        })?;
    }

    if plan.mode == RunMode::Live {
        if !platform_available {
            return Err(RunError::EnvironmentUnready(
                "live mode needs a platform endpoint".to_string(),
            ));
        }
        match &plan.credentials {
            Some(credentials) if !credentials.username.trim().is_empty() => {}
            _ => {
                return Err(RunError::EnvironmentUnready(
                    "live mode needs credentials (username and password)".to_string(),
                ))
            }
        }
    }

    Ok(())
}
