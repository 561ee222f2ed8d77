use async_trait::async_trait;
use honyaku_core::model::{
    Difficulty, Question, QuestionError, QuestionFilter, QuestionId, ScoreSubmission,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a question.
///
/// This mirrors the domain `Question` so repositories can serialize and
/// deserialize without leaking storage concerns into the domain layer.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub prompt: String,
    pub expected_answer: String,
    pub difficulty: u8,
    pub category: Option<String>,
    pub sub_category: Option<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id(),
            prompt: question.prompt().to_owned(),
            expected_answer: question.expected_answer().to_owned(),
            difficulty: question.difficulty().as_u8(),
            category: question.category().map(ToOwned::to_owned),
            sub_category: question.sub_category().map(ToOwned::to_owned),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the texts are blank or the stored
    /// difficulty level is unknown.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        let difficulty = Difficulty::from_u8(self.difficulty)?;
        let mut question = Question::new(self.id, self.prompt, self.expected_answer, difficulty)?;
        if let Some(category) = self.category {
            question = question.with_category(category);
        }
        if let Some(sub_category) = self.sub_category {
            question = question.with_sub_category(sub_category);
        }
        Ok(question)
    }
}

/// External provider of drill questions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the questions matching the filter, in source order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on transport or availability failure. An empty
    /// result is not an error here; the session layer decides what an empty
    /// set means.
    async fn fetch_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<Question>, StorageError>;
}

/// External sink recording final session scores.
///
/// Implementations treat `session_id` as a uniqueness key: persisting the
/// same submission twice must not create a second record.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    /// Persist a submission and return the stored row id. Re-sending a
    /// submission for an already-recorded session returns the original id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the sink is unavailable or rejects the
    /// write.
    async fn persist_score(&self, submission: &ScoreSubmission) -> Result<i64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    scores: Arc<Mutex<HashMap<String, (i64, ScoreSubmission)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Arc::new(Mutex::new(Vec::new())),
            scores: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replace the question bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the bank lock is poisoned.
    pub fn put_questions(&self, questions: Vec<Question>) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = questions;
        Ok(())
    }

    /// Persisted scores in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the score lock is poisoned.
    pub fn scores(&self) -> Result<Vec<ScoreSubmission>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<(i64, ScoreSubmission)> = guard.values().cloned().collect();
        rows.sort_by_key(|(id, _)| *id);
        Ok(rows.into_iter().map(|(_, submission)| submission).collect())
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn fetch_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|question| filter.matches(question))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScoreSink for InMemoryRepository {
    async fn persist_score(&self, submission: &ScoreSubmission) -> Result<i64, StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let key = submission.session_id.to_string();
        if let Some((existing_id, _)) = guard.get(&key) {
            return Ok(*existing_id);
        }
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("score id overflow".into()))?;
        guard.insert(key, (id, submission.clone()));
        Ok(id)
    }
}

/// Aggregates the question source and score sink behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub scores: Arc<dyn ScoreSink>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from(InMemoryRepository::new())
    }
}

impl From<InMemoryRepository> for Storage {
    /// Wrap a repository (typically pre-seeded with `put_questions`) so both
    /// halves of the aggregate share its state.
    fn from(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let scores: Arc<dyn ScoreSink> = Arc::new(repo);
        Self { questions, scores }
    }
}
