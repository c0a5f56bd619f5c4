//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::UploadDraftError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors from the backend client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("backend rejected request (code {code}): {message}")]
    Business { code: i32, message: String },
    #[error("backend returned no data")]
    EmptyData,
}

impl ApiError {
    /// True when the backend answered but refused the request.
    #[must_use]
    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business { .. })
    }
}

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ClassService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassError {
    #[error("invitation token is not a valid UUID: {0}")]
    InvalidToken(String),
    #[error("class name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `UploadService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    #[error(transparent)]
    Invalid(#[from] UploadDraftError),
    #[error("upload rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `RecommendService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecommendError {
    #[error("recommendation could not be started")]
    Trigger(#[source] ApiError),
    #[error("no new recommendations yet")]
    NoneAvailable,
}

/// Errors emitted by `AssignmentService` writes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssignmentError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
