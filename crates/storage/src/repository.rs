use async_trait::async_trait;
use learnflow_core::model::{CompletedCourse, ProgressDocument, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// What `ProgressRepository::append_course` did to the user's document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The document did not exist and was created holding only this entry.
    Created,
    /// The entry was appended to an existing document.
    Appended,
    /// An entry for the course was already present; nothing was written.
    AlreadyPresent,
}

impl AppendOutcome {
    #[must_use]
    pub fn was_written(self) -> bool {
        !matches!(self, Self::AlreadyPresent)
    }
}

/// Repository contract for per-user progress documents, keyed by user id.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress document for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be read. A missing document is
    /// `Ok(None)`, not an error.
    async fn get_progress(&self, user: &UserId) -> Result<Option<ProgressDocument>, StorageError>;

    /// Atomically append a completion unless one already exists for the same course,
    /// creating the document when it does not exist yet.
    ///
    /// The existence check and the write happen as one unit, so concurrent appends
    /// for the same course persist exactly one entry and appends for different
    /// courses never overwrite each other.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write cannot be performed.
    async fn append_course(
        &self,
        user: &UserId,
        course: &CompletedCourse,
    ) -> Result<AppendOutcome, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<HashMap<UserId, ProgressDocument>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, user: &UserId) -> Result<Option<ProgressDocument>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned())
    }

    async fn append_course(
        &self,
        user: &UserId,
        course: &CompletedCourse,
    ) -> Result<AppendOutcome, StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get_mut(user) {
            Some(doc) => {
                if doc.append_if_absent(course.clone()) {
                    Ok(AppendOutcome::Appended)
                } else {
                    Ok(AppendOutcome::AlreadyPresent)
                }
            }
            None => {
                guard.insert(
                    user.clone(),
                    ProgressDocument::from_courses([course.clone()]),
                );
                Ok(AppendOutcome::Created)
            }
        }
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
