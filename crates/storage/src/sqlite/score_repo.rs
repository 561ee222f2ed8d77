use honyaku_core::model::{ScoreSubmission, SessionId};
use sqlx::Row;

use super::{SqliteRepository, mapping};
use crate::repository::{ScoreSink, StorageError};

impl SqliteRepository {
    /// Fetch the recorded score for a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session has no score, or
    /// another `StorageError` if the read fails.
    pub async fn get_score(&self, session_id: SessionId) -> Result<ScoreSubmission, StorageError> {
        let row = sqlx::query(
            r"
            SELECT session_id, score, difficulty, stage, time, created_at
            FROM scores
            WHERE session_id = ?1
            ",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        mapping::map_score_row(&row)
    }
}

#[async_trait::async_trait]
impl ScoreSink for SqliteRepository {
    async fn persist_score(&self, submission: &ScoreSubmission) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO scores (session_id, score, difficulty, stage, time, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(session_id) DO NOTHING
            ",
        )
        .bind(submission.session_id.to_string())
        .bind(i64::from(submission.score))
        .bind(i64::from(submission.difficulty))
        .bind(i64::from(submission.stage))
        .bind(submission.elapsed_seconds)
        .bind(submission.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() > 0 {
            return Ok(res.last_insert_rowid());
        }

        // The session was already recorded; hand back the original row id.
        let row = sqlx::query("SELECT id FROM scores WHERE session_id = ?1")
            .bind(submission.session_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        row.try_get("id")
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
