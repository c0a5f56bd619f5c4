use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::{AssignmentId, AssignmentProgress};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{assignment_id_to_i64, conn, ser};
use crate::repository::{ProgressRepository, StorageError, decode_progress, encode_progress};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(
        &self,
        assignment: AssignmentId,
    ) -> Result<Option<AssignmentProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT payload
            FROM assignment_progress
            WHERE assignment_id = ?1
            ",
        )
        .bind(assignment_id_to_i64(assignment)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload").map_err(ser)?;
        decode_progress(&payload).map(Some)
    }

    async fn save_progress(
        &self,
        assignment: AssignmentId,
        progress: &AssignmentProgress,
    ) -> Result<(), StorageError> {
        let payload = encode_progress(progress)?;

        sqlx::query(
            r"
            INSERT INTO assignment_progress (assignment_id, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(assignment_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(assignment_id_to_i64(assignment)?)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
