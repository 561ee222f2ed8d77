use honyaku_core::model::{Question, QuestionFilter, QuestionId};

use super::{SqliteRepository, mapping};
use crate::repository::{QuestionRecord, QuestionSource, StorageError};

impl SqliteRepository {
    /// Insert a question, replacing any existing row with the same id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let record = QuestionRecord::from_question(question);
        sqlx::query(
            r"
            INSERT INTO questions (id, prompt, expected_answer, difficulty, category, sub_category)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                prompt = excluded.prompt,
                expected_answer = excluded.expected_answer,
                difficulty = excluded.difficulty,
                category = excluded.category,
                sub_category = excluded.sub_category
            ",
        )
        .bind(mapping::question_id_to_i64(record.id)?)
        .bind(record.prompt)
        .bind(record.expected_answer)
        .bind(i64::from(record.difficulty))
        .bind(record.category)
        .bind(record.sub_category)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    /// Remove every question from the bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    pub async fn delete_all_questions(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM questions")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(res.rows_affected())
    }

    /// Fetch a single question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row has the id, or another
    /// `StorageError` if the read fails.
    pub async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, prompt, expected_answer, difficulty, category, sub_category
            FROM questions
            WHERE id = ?1
            ",
        )
        .bind(mapping::question_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        mapping::map_question_row(&row)?
            .into_question()
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait::async_trait]
impl QuestionSource for SqliteRepository {
    async fn fetch_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let mut sql = String::from(
            r"
            SELECT id, prompt, expected_answer, difficulty, category, sub_category
            FROM questions
            WHERE difficulty = ?1
            ",
        );

        let mut bind_index = 2;
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if filter.sub_category.is_some() {
            sql.push_str(" AND sub_category = ?");
            sql.push_str(&bind_index.to_string());
        }
        sql.push_str(" ORDER BY id ASC");

        let mut q = sqlx::query(&sql).bind(i64::from(filter.difficulty.as_u8()));
        if let Some(category) = &filter.category {
            q = q.bind(category);
        }
        if let Some(sub_category) = &filter.sub_category {
            q = q.bind(sub_category);
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            let record = mapping::map_question_row(&row)?;
            let id = record.id;
            match record.into_question() {
                Ok(question) => questions.push(question),
                Err(err) => {
                    tracing::warn!("skipping malformed question {id}: {err}");
                }
            }
        }
        Ok(questions)
    }
}
