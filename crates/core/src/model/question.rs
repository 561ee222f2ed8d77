use thiserror::Error;

use crate::model::ids::QuestionId;
use std::fmt;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building questions or filters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question prompt must not be empty")]
    EmptyPrompt,
    #[error("question expected answer must not be empty")]
    EmptyAnswer,
    #[error("invalid difficulty value: {0}")]
    InvalidDifficulty(u8),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Three-level difficulty chosen by the player before a session starts.
///
/// Carried numerically on the score wire: `Easy` = 1, `Normal` = 2,
/// `Hard` = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// Converts a numeric level (1-3) to a `Difficulty`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidDifficulty` if the value is not in the
    /// range 1-3.
    pub fn from_u8(value: u8) -> Result<Self, QuestionError> {
        match value {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Normal),
            3 => Ok(Self::Hard),
            _ => Err(QuestionError::InvalidDifficulty(value)),
        }
    }

    /// Maps this difficulty to its numeric wire value.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single translation drill item: a source-language prompt and the
/// target-language answer the player must reconstruct.
///
/// Immutable once fetched; a session holds a read-only ordered copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    expected_answer: String,
    difficulty: Difficulty,
    category: Option<String>,
    sub_category: Option<String>,
}

impl Question {
    /// Creates a validated question.
    ///
    /// Both texts are stored trimmed, so a question that would evaluate
    /// against a blank answer cannot exist.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` or `QuestionError::EmptyAnswer`
    /// when the respective text is empty or whitespace-only.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        expected_answer: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_string();
        let expected_answer = expected_answer.into().trim().to_string();

        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if expected_answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        Ok(Self {
            id,
            prompt,
            expected_answer,
            difficulty,
            category: None,
            sub_category: None,
        })
    }

    /// Attach a category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a sub-category label.
    #[must_use]
    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn expected_answer(&self) -> &str {
        &self.expected_answer
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn sub_category(&self) -> Option<&str> {
        self.sub_category.as_deref()
    }
}

//
// ─── FILTER ────────────────────────────────────────────────────────────────────
//

/// Selection criteria handed to a question source.
///
/// Difficulty always applies; category and sub-category narrow the set only
/// when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFilter {
    pub difficulty: Difficulty,
    pub category: Option<String>,
    pub sub_category: Option<String>,
}

impl QuestionFilter {
    /// Filter on difficulty alone.
    #[must_use]
    pub fn difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            category: None,
            sub_category: None,
        }
    }

    /// Narrow to a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Narrow to a sub-category.
    #[must_use]
    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    /// Whether the given question satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        if question.difficulty() != self.difficulty {
            return false;
        }
        if let Some(category) = &self.category {
            if question.category() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(sub_category) = &self.sub_category {
            if question.sub_category() != Some(sub_category.as_str()) {
                return false;
            }
        }
        true
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
