use honyaku_core::model::{QuestionId, ScoreSubmission, SessionId};
use sqlx::Row;

use crate::repository::{QuestionRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("question_id overflow".into()))
}

pub(crate) fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuestionRecord, StorageError> {
    Ok(QuestionRecord {
        id: question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        prompt: row.try_get("prompt").map_err(ser)?,
        expected_answer: row.try_get("expected_answer").map_err(ser)?,
        difficulty: u8_from_i64("difficulty", row.try_get::<i64, _>("difficulty").map_err(ser)?)?,
        category: row.try_get("category").map_err(ser)?,
        sub_category: row.try_get("sub_category").map_err(ser)?,
    })
}

pub(crate) fn map_score_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreSubmission, StorageError> {
    let session_id_text: String = row.try_get("session_id").map_err(ser)?;
    let session_id: SessionId = session_id_text.parse().map_err(ser)?;

    Ok(ScoreSubmission {
        session_id,
        score: u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        difficulty: u8_from_i64("difficulty", row.try_get::<i64, _>("difficulty").map_err(ser)?)?,
        stage: u32_from_i64("stage", row.try_get::<i64, _>("stage").map_err(ser)?)?,
        elapsed_seconds: row.try_get("time").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
