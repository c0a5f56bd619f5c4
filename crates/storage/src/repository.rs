use async_trait::async_trait;
use quiz_core::model::{AssignmentId, AssignmentProgress, ProgressRecord, UserSession};
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

/// Encode progress into its stored JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_progress(progress: &AssignmentProgress) -> Result<String, StorageError> {
    serde_json::to_string(&progress.to_record())
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode stored JSON text into progress.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the text is not a valid record.
pub fn decode_progress(payload: &str) -> Result<AssignmentProgress, StorageError> {
    let record: ProgressRecord =
        serde_json::from_str(payload).map_err(|e| StorageError::Serialization(e.to_string()))?;
    record
        .into_progress()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Per-assignment answer progress, one record per assignment id.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch stored progress for an assignment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored record is
    /// unreadable, or other storage errors.
    async fn load_progress(
        &self,
        assignment: AssignmentId,
    ) -> Result<Option<AssignmentProgress>, StorageError>;

    /// Persist progress, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_progress(
        &self,
        assignment: AssignmentId,
        progress: &AssignmentProgress,
    ) -> Result<(), StorageError>;
}

/// The single remembered sign-in of this device.
#[async_trait]
pub trait UserSessionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn load_session(&self) -> Result<Option<UserSession>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn save_session(&self, session: &UserSession) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be removed.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Progress is kept in its encoded form so reads exercise the same decoding
/// path as the SQLite backend.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<AssignmentId, String>>>,
    session: Arc<Mutex<Option<UserSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an already encoded progress payload as-is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_raw_progress(
        &self,
        assignment: AssignmentId,
        payload: impl Into<String>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(assignment, payload.into());
        Ok(())
    }

    /// The stored payload for an assignment, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw_progress(&self, assignment: AssignmentId) -> Result<Option<String>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&assignment).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(
        &self,
        assignment: AssignmentId,
    ) -> Result<Option<AssignmentProgress>, StorageError> {
        self.raw_progress(assignment)?
            .as_deref()
            .map(decode_progress)
            .transpose()
    }

    async fn save_progress(
        &self,
        assignment: AssignmentId,
        progress: &AssignmentProgress,
    ) -> Result<(), StorageError> {
        let payload = encode_progress(progress)?;
        self.put_raw_progress(assignment, payload)
    }
}

#[async_trait]
impl UserSessionRepository for InMemoryRepository {
    async fn load_session(&self) -> Result<Option<UserSession>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_session(&self, session: &UserSession) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub sessions: Arc<dyn UserSessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn UserSessionRepository> = Arc::new(repo);
        Self { progress, sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionId, UserId};

    fn progress_with(entries: &[(u64, i32)], completed: bool) -> AssignmentProgress {
        let mut progress = AssignmentProgress::new();
        for (qid, choice) in entries {
            progress.record(QuestionId::new(*qid), *choice);
        }
        progress.set_completed(completed);
        progress
    }

    #[tokio::test]
    async fn round_trips_progress() {
        let repo = InMemoryRepository::new();
        let aid = AssignmentId::new(3);
        let progress = progress_with(&[(7, 1), (9, 0), (11, 42)], true);

        repo.save_progress(aid, &progress).await.unwrap();
        let loaded = repo.load_progress(aid).await.unwrap();
        assert_eq!(loaded, Some(progress));
    }

    #[tokio::test]
    async fn missing_progress_is_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_progress(AssignmentId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_payload_is_serialization_error() {
        let repo = InMemoryRepository::new();
        let aid = AssignmentId::new(5);
        repo.put_raw_progress(aid, "{not json").unwrap();
        let err = repo.load_progress(aid).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn saves_and_clears_session() {
        let repo = InMemoryRepository::new();
        let session =
            UserSession::signed_in(Some(UserId::new(4)), "Kim", "kim@example.com", None);
        repo.save_session(&session).await.unwrap();
        assert_eq!(repo.load_session().await.unwrap(), Some(session));

        repo.clear_session().await.unwrap();
        assert!(repo.load_session().await.unwrap().is_none());
    }
}
