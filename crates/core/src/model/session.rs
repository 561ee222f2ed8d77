use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::answer::{AnswerOutcome, AnswerRecord};
use crate::time::seconds_between;

/// Points awarded per correctly answered question.
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many records for a single session: {len}")]
    TooManyRecords { len: usize },

    #[error("total questions ({total}) does not match outcome counts ({sum})")]
    CountMismatch { total: u32, sum: u32 },
}

/// Aggregate result view over a completed session's history.
///
/// Accuracy, score, and elapsed time are derived from the stored counts and
/// timestamps rather than kept as fields, so a summary can never disagree
/// with itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_questions: u32,
    correct_count: u32,
    incorrect_count: u32,
    unanswered_count: u32,
}

impl SessionSummary {
    /// Rehydrate a summary from already-counted parts, e.g. persisted rows.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidTimeRange` if `completed_at` is before
    /// `started_at`, or `SummaryError::CountMismatch` if the outcome counts
    /// do not sum to the total.
    pub fn from_parts(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total_questions: u32,
        correct_count: u32,
        incorrect_count: u32,
        unanswered_count: u32,
    ) -> Result<Self, SummaryError> {
        if completed_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        let sum = correct_count + incorrect_count + unanswered_count;
        if sum != total_questions {
            return Err(SummaryError::CountMismatch {
                total: total_questions,
                sum,
            });
        }

        Ok(Self {
            started_at,
            completed_at,
            total_questions,
            correct_count,
            incorrect_count,
            unanswered_count,
        })
    }

    /// Build a summary from a session's answer history.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidTimeRange` if `completed_at` is before
    /// `started_at`, or `SummaryError::TooManyRecords` if the history cannot
    /// fit in `u32`.
    pub fn from_records(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        records: &[AnswerRecord],
    ) -> Result<Self, SummaryError> {
        if completed_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        let mut unanswered = 0_u32;

        for record in records {
            match record.outcome {
                AnswerOutcome::Correct => correct = correct.saturating_add(1),
                AnswerOutcome::Incorrect => incorrect = incorrect.saturating_add(1),
                AnswerOutcome::Unanswered => unanswered = unanswered.saturating_add(1),
            }
        }

        let total_questions = u32::try_from(records.len())
            .map_err(|_| SummaryError::TooManyRecords { len: records.len() })?;

        Self::from_parts(
            started_at,
            completed_at,
            total_questions,
            correct,
            incorrect,
            unanswered,
        )
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    #[must_use]
    pub fn unanswered_count(&self) -> u32 {
        self.unanswered_count
    }

    /// Fraction of questions answered correctly, in `[0, 1]`.
    ///
    /// Defined as 0 for a session with no questions; never divides by zero.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.total_questions)
    }

    /// Accuracy as a percentage: 7 correct out of 10 gives 70.0.
    #[must_use]
    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy() * 100.0
    }

    /// Final score: `POINTS_PER_CORRECT` for every correct answer.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.correct_count.saturating_mul(POINTS_PER_CORRECT)
    }

    /// Whole-session elapsed time in seconds, from the stopwatch pair of
    /// timestamps.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        seconds_between(self.started_at, self.completed_at)
    }
}
