//! Assistant error types.

use cs_maintenance::MaintenanceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Maintenance(#[from] MaintenanceError),

    #[error("no responder produced an answer")]
    NoAnswer,

    #[error("recommendation has no due date or distance: {0}")]
    NothingToRemind(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias.
pub type AssistantResult<T> = Result<T, AssistantError>;
