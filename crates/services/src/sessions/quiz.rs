use chrono::{DateTime, Utc};
use std::fmt;

use honyaku_core::grading;
use honyaku_core::model::{
    AnswerOutcome, AnswerRecord, Difficulty, Question, ScoreSubmission, SessionId, SessionSummary,
};

use crate::error::SessionError;

//
// ─── SESSION MODE ──────────────────────────────────────────────────────────────
//

/// How the player composes an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Free-typed text, graded on submit.
    Text,
    /// Word blocks: the answer is assembled from a shuffled token tray.
    Block,
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Aggregated view of session progress, useful for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// One playthrough over a fixed question list.
///
/// Steps through the questions sequentially, grading each submission and
/// keeping the full answer history. `SessionController` owns the phase
/// machine and the clock; this type owns the facts of the playthrough.
pub struct QuizSession {
    id: SessionId,
    mode: SessionMode,
    difficulty: Difficulty,
    stage: u32,
    questions: Vec<Question>,
    current: usize,
    history: Vec<AnswerRecord>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    score_row_id: Option<i64>,
    submission_built: bool,
}

impl QuizSession {
    /// Create a session over the given question list.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub(crate) fn new(
        mode: SessionMode,
        difficulty: Difficulty,
        stage: u32,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            id: SessionId::generate(),
            mode,
            difficulty,
            stage,
            questions,
            current: 0,
            history: Vec::new(),
            started_at,
            completed_at: None,
            score_row_id: None,
            submission_built: false,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn stage(&self) -> u32 {
        self.stage
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Row id of the persisted score, once the recorder has confirmed it.
    #[must_use]
    pub fn score_row_id(&self) -> Option<i64> {
        self.score_row_id
    }

    #[must_use]
    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions that have already been answered.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.history.len()
    }

    /// Number of remaining questions that have not been answered yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.current)
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            remaining: self.remaining(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Grade a submission against the current question and advance.
    ///
    /// The record is appended and the cursor moved in one step, so the
    /// history length always equals the number of questions passed. The
    /// last answer stamps `completed_at` with its `recorded_at`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if every question has already been
    /// answered.
    pub(crate) fn record_answer(
        &mut self,
        submitted_text: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<&AnswerRecord, SessionError> {
        let Some(question) = self.questions.get(self.current).cloned() else {
            return Err(SessionError::Completed);
        };

        let outcome = grading::evaluate(submitted_text, question.expected_answer());
        self.history
            .push(AnswerRecord::new(question, submitted_text, outcome, recorded_at));

        self.current += 1;
        if self.current >= self.questions.len() {
            self.completed_at = Some(recorded_at);
        }

        self.history.last().ok_or(SessionError::Completed)
    }

    /// Outcome of the most recent answer, if any.
    #[must_use]
    pub fn last_outcome(&self) -> Option<AnswerOutcome> {
        self.history.last().map(|record| record.outcome)
    }

    /// Build the final summary from the answer history.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` while questions remain, and
    /// propagates summary validation via `SessionError::Summary`.
    pub(crate) fn summarize(&self) -> Result<SessionSummary, SessionError> {
        let completed_at = self.completed_at.ok_or(SessionError::Completed)?;
        Ok(SessionSummary::from_records(
            self.started_at,
            completed_at,
            &self.history,
        )?)
    }

    /// Hand out the score submission for this playthrough, exactly once.
    ///
    /// Returns `None` before completion, and `None` again on every call
    /// after the first successful build.
    pub(crate) fn build_submission(
        &mut self,
        summary: &SessionSummary,
        created_at: DateTime<Utc>,
    ) -> Option<ScoreSubmission> {
        if self.completed_at.is_none() || self.submission_built {
            return None;
        }
        self.submission_built = true;
        Some(ScoreSubmission::from_summary(
            self.id,
            self.difficulty,
            self.stage,
            summary,
            created_at,
        ))
    }

    pub(crate) fn set_score_row_id(&mut self, id: i64) {
        self.score_row_id = Some(id);
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("difficulty", &self.difficulty)
            .field("stage", &self.stage)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("history_len", &self.history.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use honyaku_core::model::QuestionId;
    use honyaku_core::time::fixed_now;

    fn question(id: u64, prompt: &str, answer: &str) -> Question {
        Question::new(QuestionId::new(id), prompt, answer, Difficulty::Easy).expect("question")
    }

    fn two_question_session() -> QuizSession {
        let questions = vec![
            question(1, "私は学生です。", "I am a student."),
            question(2, "これはペンです。", "This is a pen."),
        ];
        QuizSession::new(SessionMode::Text, Difficulty::Easy, 1, questions, fixed_now())
            .expect("session")
    }

    #[test]
    fn a_session_needs_at_least_one_question() {
        let result = QuizSession::new(
            SessionMode::Text,
            Difficulty::Easy,
            1,
            Vec::new(),
            fixed_now(),
        );
        assert!(matches!(result, Err(SessionError::Empty)));
    }

    #[test]
    fn answers_advance_the_cursor_and_complete_the_session() {
        let mut session = two_question_session();
        assert_eq!(session.current_question().map(Question::id), Some(QuestionId::new(1)));

        let first = fixed_now() + Duration::seconds(5);
        let record = session.record_answer("i am a STUDENT", first).expect("first answer");
        assert_eq!(record.outcome, AnswerOutcome::Correct);
        assert!(!session.is_complete());
        assert_eq!(session.current_question().map(Question::id), Some(QuestionId::new(2)));

        let second = fixed_now() + Duration::seconds(9);
        let record = session.record_answer("this is a dog", second).expect("second answer");
        assert_eq!(record.outcome, AnswerOutcome::Incorrect);
        assert!(session.is_complete());
        assert_eq!(session.completed_at(), Some(second));
        assert_eq!(session.current_question(), None);
    }

    #[test]
    fn history_stays_in_lockstep_with_progress() {
        let mut session = two_question_session();
        assert_eq!(session.progress(), SessionProgress {
            total: 2,
            answered: 0,
            remaining: 2,
            is_complete: false,
        });

        session.record_answer("", fixed_now()).expect("answer");
        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 1);
        assert_eq!(session.history().len(), progress.answered);
        assert_eq!(session.last_outcome(), Some(AnswerOutcome::Unanswered));
    }

    #[test]
    fn answering_a_finished_session_fails() {
        let mut session = two_question_session();
        session.record_answer("a", fixed_now()).expect("first");
        session.record_answer("b", fixed_now()).expect("second");

        let result = session.record_answer("c", fixed_now());
        assert!(matches!(result, Err(SessionError::Completed)));
    }

    #[test]
    fn the_summary_counts_every_outcome_kind() {
        let questions = vec![
            question(1, "私は学生です。", "I am a student."),
            question(2, "これはペンです。", "This is a pen."),
            question(3, "猫が好きです。", "I like cats."),
        ];
        let mut session =
            QuizSession::new(SessionMode::Text, Difficulty::Easy, 1, questions, fixed_now())
                .expect("session");

        session.record_answer("I am a student.", fixed_now()).expect("correct");
        session.record_answer("that is a pen", fixed_now()).expect("incorrect");
        let completed = fixed_now() + Duration::seconds(30);
        session.record_answer("   ", completed).expect("unanswered");

        let summary = session.summarize().expect("summary");
        assert_eq!(summary.total_questions(), 3);
        assert_eq!(summary.correct_count(), 1);
        assert_eq!(summary.incorrect_count(), 1);
        assert_eq!(summary.unanswered_count(), 1);
        assert_eq!(summary.score(), 10);
        assert!((summary.elapsed_seconds() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summarizing_an_unfinished_session_fails() {
        let mut session = two_question_session();
        session.record_answer("a", fixed_now()).expect("first");

        assert!(matches!(session.summarize(), Err(SessionError::Completed)));
    }

    #[test]
    fn the_submission_is_built_exactly_once() {
        let mut session = two_question_session();
        session.record_answer("I am a student.", fixed_now()).expect("first");
        session.record_answer("This is a pen.", fixed_now()).expect("second");

        let summary = session.summarize().expect("summary");
        let created_at = fixed_now() + Duration::seconds(31);

        let submission = session
            .build_submission(&summary, created_at)
            .expect("first build yields the submission");
        assert_eq!(submission.session_id, session.id());
        assert_eq!(submission.score, 20);
        assert_eq!(submission.difficulty, 1);
        assert_eq!(submission.stage, 1);
        assert_eq!(submission.created_at, created_at);

        assert!(session.build_submission(&summary, created_at).is_none());
    }

    #[test]
    fn no_submission_before_the_session_is_complete() {
        let mut session = two_question_session();
        session.record_answer("a", fixed_now()).expect("first");

        let probe = SessionSummary::from_parts(fixed_now(), fixed_now(), 0, 0, 0, 0)
            .expect("empty summary");
        assert!(session.build_submission(&probe, fixed_now()).is_none());
    }
}
