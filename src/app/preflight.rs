use thiserror::Error;
use tracing::debug;

use super::ContainerEngine;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PreflightError {
    #[error("Install docker cli before proceeding")]
    EngineNotInstalled,

    #[error("Start docker before proceeding")]
    EngineNotRunning,
}

/// Fails unless the engine is both installed and running. The running check is
/// skipped when the engine is not installed.
pub async fn ensure_engine_ready<E>(engine: &E) -> Result<(), PreflightError>
where
    E: ContainerEngine + Sync + ?Sized,
{
    if !engine.is_installed().await {
        return Err(PreflightError::EngineNotInstalled);
    }
    if !engine.is_running().await {
        return Err(PreflightError::EngineNotRunning);
    }

    debug!("container engine is installed and running");
    Ok(())
}
