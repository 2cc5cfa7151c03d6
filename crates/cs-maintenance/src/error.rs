//! Maintenance error types.

use cs_protocol::ReminderError;
use thiserror::Error;

/// Errors raised by the rule catalogue loader and the stores.
///
/// The pure computations (estimator, engine, alerts) never fail.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid reminder: {0}")]
    InvalidReminder(#[from] ReminderError),

    #[error("invalid rule catalogue: {0}")]
    Catalog(String),

    #[error("invalid garage snapshot: {0}")]
    Snapshot(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl MaintenanceError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Convenience alias for maintenance results.
pub type MaintenanceResult<T> = Result<T, MaintenanceError>;
