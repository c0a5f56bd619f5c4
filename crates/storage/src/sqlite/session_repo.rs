use async_trait::async_trait;
use quiz_core::model::UserSession;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, user_id_from_i64, user_id_to_i64};
use crate::repository::{StorageError, UserSessionRepository};

#[async_trait]
impl UserSessionRepository for SqliteRepository {
    async fn load_session(&self) -> Result<Option<UserSession>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, user_name, email, token, logged_in
            FROM user_session
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_id: Option<i64> = row.try_get("user_id").map_err(ser)?;
        let logged_in: i64 = row.try_get("logged_in").map_err(ser)?;

        Ok(Some(UserSession {
            user_id: user_id_from_i64(user_id)?,
            user_name: row.try_get("user_name").map_err(ser)?,
            email: row.try_get("email").map_err(ser)?,
            token: row.try_get("token").map_err(ser)?,
            logged_in: logged_in != 0,
        }))
    }

    async fn save_session(&self, session: &UserSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_session (id, user_id, user_name, email, token, logged_in)
            VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                user_name = excluded.user_name,
                email = excluded.email,
                token = excluded.token,
                logged_in = excluded.logged_in
            ",
        )
        .bind(user_id_to_i64(session.user_id)?)
        .bind(session.user_name.as_deref())
        .bind(session.email.as_deref())
        .bind(session.token.as_deref())
        .bind(i64::from(session.logged_in))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM user_session WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
