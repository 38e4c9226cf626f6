use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::common::MenuItemId;

/// Errors surfaced by the option-set deduplication engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad candidate input. Reported per candidate, never aborts a batch.
    #[error("Malformed option set candidate: {0}")]
    MalformedCandidate(String),

    /// Transient datastore failure. Retryable with backoff at the batch level.
    #[error("Datastore unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),

    /// A constraint violation other than the expected fingerprint race.
    /// Non-retryable; logged for manual inspection.
    #[error("Unexpected constraint violation: {0}")]
    UnexpectedConstraintViolation(String),

    /// Failure scoped to one menu item's link reconciliation. The batch
    /// coordinator records it and continues with the remaining items.
    #[error("Failed to reconcile links for menu item {menu_item_id}: {source}")]
    ReconciliationFailure {
        menu_item_id: MenuItemId,
        #[source]
        source: Box<EngineError>,
    },

    /// Any other datastore error.
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl EngineError {
    /// Whether the caller may retry the failed operation with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable(_))
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Connection-level failures are transient from the engine's
            // point of view.
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Tls(_) => EngineError::StoreUnavailable(err),
            // The fingerprint race is caught before conversion (see the
            // master store's retry loop), so any violation reaching here is
            // unexpected.
            sqlx::Error::Database(dbe)
                if matches!(
                    dbe.kind(),
                    ErrorKind::UniqueViolation
                        | ErrorKind::ForeignKeyViolation
                        | ErrorKind::NotNullViolation
                        | ErrorKind::CheckViolation
                ) =>
            {
                EngineError::UnexpectedConstraintViolation(dbe.to_string())
            }
            _ => EngineError::Database(err),
        }
    }
}
