use chrono::{DateTime, Utc};

use crate::model::question::Question;

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Classification of one submitted answer.
///
/// - `Correct`: normalized submission matched the expected answer exactly
/// - `Incorrect`: submission did not match
/// - `Unanswered`: empty or whitespace-only submission, including the one
///   recorded when a per-question countdown expires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Unanswered,
}

impl AnswerOutcome {
    /// True only for `Correct`. `Unanswered` scores as incorrect but stays
    /// distinguishable in the summary.
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerOutcome::Correct => "correct",
            AnswerOutcome::Incorrect => "incorrect",
            AnswerOutcome::Unanswered => "unanswered",
        }
    }
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// Record of a single answered question within a session.
///
/// Appended exactly once per question and never mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub question: Question,
    pub submitted_text: String,
    pub outcome: AnswerOutcome,
    pub recorded_at: DateTime<Utc>,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(
        question: Question,
        submitted_text: impl Into<String>,
        outcome: AnswerOutcome,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            question,
            submitted_text: submitted_text.into(),
            outcome,
            recorded_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use crate::model::question::{Difficulty, QuestionError};
    use crate::time::fixed_now;

    #[test]
    fn only_correct_counts_as_correct() {
        assert!(AnswerOutcome::Correct.is_correct());
        assert!(!AnswerOutcome::Incorrect.is_correct());
        assert!(!AnswerOutcome::Unanswered.is_correct());
    }

    #[test]
    fn record_creation_works() -> Result<(), QuestionError> {
        let question = Question::new(
            QuestionId::new(7),
            "あなたはコーヒーが好きですか？",
            "Do you like coffee?",
            Difficulty::Easy,
        )?;
        let record = AnswerRecord::new(
            question.clone(),
            "do you like coffee",
            AnswerOutcome::Correct,
            fixed_now(),
        );

        assert_eq!(record.question, question);
        assert_eq!(record.outcome, AnswerOutcome::Correct);
        assert_eq!(record.recorded_at, fixed_now());
        Ok(())
    }
}
