//! Shared error types for the services crate.

use thiserror::Error;

use learnflow_core::model::{RequestError, SchemaError, UserId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ContentGenerationService` and its backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("content generation is not configured")]
    Disabled,
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
    #[error("content generation is rate limited, try again later")]
    RateLimited,
    #[error("content generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("content generation returned an empty response")]
    EmptyResponse,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("generated content does not match the schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("quiz has no questions")]
    Empty,
    #[error("restart is only available for practice quizzes")]
    RestartUnavailable,
    #[error("quiz timers need a tokio runtime")]
    NoRuntime,
}

/// Errors emitted by `ProgressStore::complete_course`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("no signed-in user")]
    SignedOut,
    #[error("progress write failed: {0}")]
    Write(#[source] StorageError),
}

/// A failed progress read. Recovered locally and only logged, never returned.
#[derive(Debug, Error)]
#[error("progress load failed for {user}: {source}")]
pub struct ProgressLoadError {
    pub user: UserId,
    #[source]
    pub source: StorageError,
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is not a valid http(s) URL: {raw}")]
    InvalidUrl { var: &'static str, raw: String },
    #[error("{var} is not a valid number: {raw}")]
    InvalidNumber { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
