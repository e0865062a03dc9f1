use axum::http::StatusCode;
use thiserror::Error;

/// Errors produced by the companion store.
///
/// Every store operation returns `Result`; whether a failure degrades
/// (read paths) or propagates (write paths) is decided at the HTTP
/// boundary, not here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller is not the owner of the record, or no author was supplied.
    #[error("not authorized")]
    Unauthorized,

    /// The referenced record does not exist.
    #[error("record not found")]
    NotFound,

    /// The underlying database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// HTTP status this error maps to when surfaced to a client.
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::Unauthorized => StatusCode::FORBIDDEN,
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors produced by the session orchestrator.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested action is not valid in the current call status.
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    /// The voice engine rejected or dropped the request.
    #[error("voice engine error: {0}")]
    Engine(#[from] anyhow::Error),
}

impl SessionError {
    pub fn status(&self) -> StatusCode {
        match self {
            SessionError::InvalidTransition(_) => StatusCode::CONFLICT,
            SessionError::Engine(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
