use axum::http::StatusCode;
use thiserror::Error;

use crate::TransactionError;
use crate::constants::ERR_DATABASE_OPERATION;

/// Failure of a ledger operation, returned to the HTTP layer as a typed result.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),
    /// A referenced user or currency does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The storage layer failed.
    #[error("storage failure: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal(context.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<libsql::Error> for LedgerError {
    fn from(e: libsql::Error) -> Self {
        LedgerError::Internal(e.to_string())
    }
}

impl From<TransactionError> for LedgerError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::Begin => LedgerError::internal("failed to begin transaction"),
            TransactionError::Commit => LedgerError::internal("failed to commit transaction"),
        }
    }
}

impl From<LedgerError> for (StatusCode, String) {
    fn from(e: LedgerError) -> Self {
        let status = e.status();
        match e {
            LedgerError::Internal(context) => {
                tracing::error!(%context, "ledger storage failure");
                (status, ERR_DATABASE_OPERATION.to_string())
            }
            other => {
                tracing::debug!(error = %other, "ledger request rejected");
                (status, other.to_string())
            }
        }
    }
}
