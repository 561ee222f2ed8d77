use std::fmt;
use std::sync::Arc;

use honyaku_core::model::{
    AnswerOutcome, AnswerRecord, Difficulty, Question, QuestionFilter, SessionId, SessionSummary,
    WordBlockState,
};
use honyaku_core::Clock;
use storage::repository::{QuestionSource, StorageError};

use crate::error::SessionError;
use crate::recorder::{RecordOutcome, ScoreRecorder};
use crate::word_blocks;
use super::plan::SessionBuilder;
use super::quiz::{QuizSession, SessionMode, SessionProgress};
use super::timer::{Countdown, CountdownTick};

//
// ─── PHASES AND OUTCOMES ───────────────────────────────────────────────────────
//

/// Where the engine currently is in a playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session; the only phase that accepts a new load.
    Idle,
    /// A question fetch is in flight.
    Loading,
    /// The current question is on screen and accepting an answer.
    Presenting,
    /// A submission is being graded.
    Evaluating,
    /// The graded answer is on screen, waiting for `advance`.
    Feedback,
    /// Every question has been answered; the summary is available.
    Complete,
}

/// What became of a finished question fetch.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The session is installed and the first question is presenting.
    Started,
    /// The fetch or session construction failed; the engine is idle again.
    Failed(SessionError),
    /// The engine was reset after this fetch began; the result was discarded.
    Stale,
}

/// What became of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Recorded(AnswerOutcome),
    /// Nothing was presenting, so the submission changed nothing.
    Ignored,
}

/// What became of an advance out of feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Nothing was in feedback, so there was nothing to advance.
    Ignored,
    NextQuestion,
    Complete(SessionSummary),
}

/// What became of one countdown second.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No countdown is running.
    Ignored,
    Running { remaining: u32 },
    /// The limit was reached: the question was recorded as unanswered and
    /// the session moved straight on, skipping feedback.
    Expired(AdvanceOutcome),
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Tunables for new sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on questions per session.
    pub session_size: usize,
    /// Shuffle the fetched pool before taking `session_size`.
    pub sample_questions: bool,
    /// Per-question limit in seconds; `None` disables the countdown.
    pub question_time_limit: Option<u32>,
    /// Stage reported on the score wire.
    pub stage: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_size: 10,
            sample_questions: false,
            question_time_limit: None,
            stage: 1,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_session_size(mut self, session_size: usize) -> Self {
        self.session_size = session_size;
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, sample_questions: bool) -> Self {
        self.sample_questions = sample_questions;
        self
    }

    #[must_use]
    pub fn with_question_time_limit(mut self, limit: Option<u32>) -> Self {
        self.question_time_limit = limit;
        self
    }

    #[must_use]
    pub fn with_stage(mut self, stage: u32) -> Self {
        self.stage = stage;
        self
    }
}

//
// ─── LOAD TICKET ───────────────────────────────────────────────────────────────
//

/// Pairs a question fetch with the engine generation that issued it.
///
/// Handed out by [`SessionController::begin_load`] and redeemed by
/// [`SessionController::finish_load`]; a reset in between makes the ticket
/// stale, so a slow fetch can never install a session the player abandoned.
#[derive(Debug)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
    mode: SessionMode,
    difficulty: Difficulty,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives a quiz playthrough from load to recorded score.
///
/// The controller is a phase machine: questions load in `Loading`, present
/// one at a time in `Presenting`, grade through `Evaluating` into
/// `Feedback`, and finish in `Complete`, where the summary has been handed
/// to the score recorder exactly once. Inputs that arrive in the wrong
/// phase are ignored rather than rejected, so stray UI events cannot
/// corrupt a session.
pub struct SessionController {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    recorder: ScoreRecorder,
    config: SessionConfig,
    phase: Phase,
    session: Option<QuizSession>,
    blocks: Option<WordBlockState>,
    countdown: Option<Countdown>,
    summary: Option<SessionSummary>,
    generation: u64,
}

impl SessionController {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<dyn QuestionSource>, recorder: ScoreRecorder) -> Self {
        Self {
            clock,
            questions,
            recorder,
            config: SessionConfig::default(),
            phase: Phase::Idle,
            session: None,
            blocks: None,
            countdown: None,
            summary: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────
    //

    /// Fetch questions and start a session in one call.
    ///
    /// The session difficulty is taken from the filter.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` unless the engine is idle,
    /// `SessionError::Storage` if the fetch fails, and `SessionError::Empty`
    /// if the filter matches nothing. On error the engine is idle again.
    pub async fn start(
        &mut self,
        mode: SessionMode,
        filter: QuestionFilter,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Idle {
            return Err(SessionError::AlreadyActive);
        }
        self.phase = Phase::Loading;

        let difficulty = filter.difficulty;
        let fetched = self
            .questions
            .fetch_questions(&filter)
            .await
            .map_err(SessionError::from);
        self.install_session(mode, difficulty, fetched)
    }

    /// Enter `Loading` and hand out a ticket for a caller-driven fetch.
    ///
    /// Use this instead of [`start`](Self::start) when the host owns the
    /// fetch, e.g. to run it on another task. `difficulty` should match the
    /// filter the host fetches with; it is what the session reports on the
    /// score wire.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` unless the engine is idle.
    pub fn begin_load(
        &mut self,
        mode: SessionMode,
        difficulty: Difficulty,
    ) -> Result<LoadTicket, SessionError> {
        if self.phase != Phase::Idle {
            return Err(SessionError::AlreadyActive);
        }
        self.phase = Phase::Loading;

        Ok(LoadTicket {
            generation: self.generation,
            mode,
            difficulty,
        })
    }

    /// Redeem a load ticket with the result of the host's fetch.
    ///
    /// A ticket issued before a [`reset`](Self::reset) comes back
    /// [`LoadOutcome::Stale`] and leaves the engine untouched.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<Vec<Question>, StorageError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            return LoadOutcome::Stale;
        }

        let fetched = fetched.map_err(SessionError::from);
        match self.install_session(ticket.mode, ticket.difficulty, fetched) {
            Ok(()) => LoadOutcome::Started,
            Err(err) => LoadOutcome::Failed(err),
        }
    }

    fn install_session(
        &mut self,
        mode: SessionMode,
        difficulty: Difficulty,
        fetched: Result<Vec<Question>, SessionError>,
    ) -> Result<(), SessionError> {
        let installed = fetched.and_then(|pool| {
            let plan = SessionBuilder::new(self.config.session_size)
                .with_sampling(self.config.sample_questions)
                .build(pool);
            QuizSession::new(
                mode,
                difficulty,
                self.config.stage,
                plan.questions,
                self.clock.now(),
            )
        });

        match installed {
            Ok(session) => {
                self.session = Some(session);
                self.phase = Phase::Presenting;
                self.arm_question();
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Idle;
                Err(err)
            }
        }
    }

    /// Set up the word tray and countdown for the question now presenting.
    fn arm_question(&mut self) {
        self.blocks = None;
        self.countdown = None;

        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(question) = session.current_question() else {
            return;
        };

        if session.mode() == SessionMode::Block {
            self.blocks = Some(word_blocks::assemble(question.expected_answer()));
        }
        if let Some(limit) = self.config.question_time_limit {
            self.countdown = Some(Countdown::new(limit));
        }
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────
    //

    /// Grade a typed submission against the current question.
    ///
    /// Cancels the countdown before anything else, so a submission and an
    /// expiry can never both fire for the same question. Outside
    /// `Presenting` this is a no-op.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if self.phase != Phase::Presenting {
            return SubmitOutcome::Ignored;
        }
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return SubmitOutcome::Ignored;
        };

        self.countdown = None;
        self.phase = Phase::Evaluating;
        let Ok(record) = session.record_answer(text, now) else {
            self.phase = Phase::Presenting;
            return SubmitOutcome::Ignored;
        };

        let outcome = record.outcome;
        self.blocks = None;
        self.phase = Phase::Feedback;
        SubmitOutcome::Recorded(outcome)
    }

    /// Move a token from the tray into the assembled answer.
    ///
    /// Returns `false` when no block-mode question is presenting or the
    /// token is not available.
    pub fn select_token(&mut self, token: &str) -> bool {
        if self.phase != Phase::Presenting {
            return false;
        }
        self.blocks.as_mut().is_some_and(|blocks| blocks.select(token))
    }

    /// Return the selected token at `index` to the tray.
    pub fn deselect_token(&mut self, index: usize) -> bool {
        if self.phase != Phase::Presenting {
            return false;
        }
        self.blocks
            .as_mut()
            .is_some_and(|blocks| blocks.deselect(index))
    }

    /// The word tray for the current block-mode question, if one is up.
    #[must_use]
    pub fn selection(&self) -> Option<&WordBlockState> {
        self.blocks.as_ref()
    }

    /// Submit the tokens selected so far as the answer.
    ///
    /// An empty selection grades as unanswered.
    pub fn submit_selection(&mut self) -> SubmitOutcome {
        if self.phase != Phase::Presenting {
            return SubmitOutcome::Ignored;
        }
        let Some(blocks) = self.blocks.as_ref() else {
            return SubmitOutcome::Ignored;
        };

        let text = blocks.materialize();
        self.submit(&text)
    }

    //
    // ─── ADVANCING ─────────────────────────────────────────────────────────
    //

    /// Leave feedback: present the next question, or complete the session.
    ///
    /// Completion builds the summary and hands it to the score recorder
    /// exactly once per session; the summary is returned regardless of
    /// whether recording succeeded. Outside `Feedback` this is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates summary validation via `SessionError::Summary`.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        if self.phase != Phase::Feedback {
            return Ok(AdvanceOutcome::Ignored);
        }
        self.finish_or_present().await
    }

    /// Count one elapsed second against the presenting question.
    ///
    /// On expiry the question is recorded as unanswered with an empty
    /// submission and the session moves straight on, skipping `Feedback`.
    /// Without a running countdown this is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates summary validation via `SessionError::Summary` when the
    /// expiry completes the session.
    pub async fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if self.phase != Phase::Presenting {
            return Ok(TickOutcome::Ignored);
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return Ok(TickOutcome::Ignored);
        };

        match countdown.tick() {
            CountdownTick::Running { remaining } => Ok(TickOutcome::Running { remaining }),
            CountdownTick::Expired => {
                self.countdown = None;
                self.blocks = None;

                let now = self.clock.now();
                let Some(session) = self.session.as_mut() else {
                    return Ok(TickOutcome::Ignored);
                };
                session.record_answer("", now)?;

                let outcome = self.finish_or_present().await?;
                Ok(TickOutcome::Expired(outcome))
            }
        }
    }

    async fn finish_or_present(&mut self) -> Result<AdvanceOutcome, SessionError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(AdvanceOutcome::Ignored);
        };

        if !session.is_complete() {
            self.phase = Phase::Presenting;
            self.arm_question();
            return Ok(AdvanceOutcome::NextQuestion);
        }

        let summary = session.summarize()?;
        if let Some(submission) = session.build_submission(&summary, self.clock.now()) {
            match self.recorder.record(&submission).await {
                RecordOutcome::Persisted(id) => session.set_score_row_id(id),
                RecordOutcome::Dropped => {}
            }
        }

        self.summary = Some(summary.clone());
        self.phase = Phase::Complete;
        Ok(AdvanceOutcome::Complete(summary))
    }

    /// Abandon whatever is in flight and return to `Idle`.
    ///
    /// Bumps the generation, so load tickets issued before the reset can no
    /// longer install a session. Valid in every phase.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.session = None;
        self.blocks = None;
        self.countdown = None;
        self.summary = None;
        self.phase = Phase::Idle;
    }

    //
    // ─── READ SURFACE ──────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Identifier of the running or just-finished session.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(QuizSession::id)
    }

    /// The question the player is looking at: the presenting question, or
    /// during feedback the question that was just graded.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        let session = self.session.as_ref()?;
        match self.phase {
            Phase::Presenting => session.current_question(),
            Phase::Evaluating | Phase::Feedback => {
                session.history().last().map(|record| &record.question)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.as_ref().map(QuizSession::progress)
    }

    /// The most recent graded answer.
    #[must_use]
    pub fn last_record(&self) -> Option<&AnswerRecord> {
        self.session.as_ref()?.history().last()
    }

    /// Seconds left on the presenting question, when a countdown is running.
    #[must_use]
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    /// The final summary, available once the session is complete.
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Row id of the persisted score, once the recorder has confirmed it.
    #[must_use]
    pub fn score_row_id(&self) -> Option<i64> {
        self.session.as_ref()?.score_row_id()
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("phase", &self.phase)
            .field("config", &self.config)
            .field("session", &self.session)
            .field("countdown", &self.countdown)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use honyaku_core::model::QuestionId;
    use honyaku_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn question(id: u64, prompt: &str, answer: &str) -> Question {
        Question::new(QuestionId::new(id), prompt, answer, Difficulty::Easy).expect("question")
    }

    fn question_bank() -> Vec<Question> {
        vec![
            question(1, "私は学生です。", "I am a student."),
            question(2, "これはペンです。", "This is a pen."),
        ]
    }

    fn controller_over(questions: Vec<Question>) -> (SessionController, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        repo.put_questions(questions).expect("seed");
        let controller = SessionController::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            ScoreRecorder::new(Arc::new(repo.clone())),
        );
        (controller, repo)
    }

    fn easy() -> QuestionFilter {
        QuestionFilter::difficulty(Difficulty::Easy)
    }

    #[tokio::test]
    async fn only_one_session_can_run_at_a_time() {
        let (mut controller, _) = controller_over(question_bank());
        controller.start(SessionMode::Text, easy()).await.expect("start");

        let result = controller.start(SessionMode::Text, easy()).await;
        assert!(matches!(result, Err(SessionError::AlreadyActive)));
        assert!(matches!(
            controller.begin_load(SessionMode::Text, Difficulty::Easy),
            Err(SessionError::AlreadyActive)
        ));
    }

    #[tokio::test]
    async fn a_reset_during_the_fetch_makes_the_ticket_stale() {
        let (mut controller, _) = controller_over(question_bank());
        let ticket = controller
            .begin_load(SessionMode::Text, Difficulty::Easy)
            .expect("ticket");

        controller.reset();

        let outcome = controller.finish_load(ticket, Ok(question_bank()));
        assert!(matches!(outcome, LoadOutcome::Stale));
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.session_id().is_none());
    }

    #[tokio::test]
    async fn a_failed_fetch_returns_the_engine_to_idle() {
        let (mut controller, _) = controller_over(question_bank());
        let ticket = controller
            .begin_load(SessionMode::Text, Difficulty::Easy)
            .expect("ticket");

        let outcome = controller.finish_load(
            ticket,
            Err(StorageError::Connection("socket closed".to_string())),
        );
        assert!(matches!(
            outcome,
            LoadOutcome::Failed(SessionError::Storage(_))
        ));
        assert_eq!(controller.phase(), Phase::Idle);

        // Idle again, so a fresh start goes through.
        controller.start(SessionMode::Text, easy()).await.expect("restart");
        assert_eq!(controller.phase(), Phase::Presenting);
    }

    #[tokio::test]
    async fn an_empty_pool_fails_the_load() {
        let (mut controller, _) = controller_over(question_bank());
        let ticket = controller
            .begin_load(SessionMode::Text, Difficulty::Easy)
            .expect("ticket");

        let outcome = controller.finish_load(ticket, Ok(Vec::new()));
        assert!(matches!(outcome, LoadOutcome::Failed(SessionError::Empty)));
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn submissions_outside_presenting_are_ignored() {
        let (mut controller, _) = controller_over(question_bank());
        assert_eq!(controller.submit("anything"), SubmitOutcome::Ignored);

        controller.start(SessionMode::Text, easy()).await.expect("start");
        let first = controller.submit("I am a student.");
        assert_eq!(first, SubmitOutcome::Recorded(AnswerOutcome::Correct));
        assert_eq!(controller.phase(), Phase::Feedback);

        // Already in feedback; a double-tap must not consume question two.
        assert_eq!(controller.submit("again"), SubmitOutcome::Ignored);
        assert_eq!(controller.progress().expect("progress").answered, 1);
    }

    #[tokio::test]
    async fn advance_outside_feedback_is_ignored() {
        let (mut controller, _) = controller_over(question_bank());
        assert!(matches!(
            controller.advance().await.expect("advance"),
            AdvanceOutcome::Ignored
        ));

        controller.start(SessionMode::Text, easy()).await.expect("start");
        assert!(matches!(
            controller.advance().await.expect("advance"),
            AdvanceOutcome::Ignored
        ));
        assert_eq!(controller.phase(), Phase::Presenting);
    }

    #[tokio::test]
    async fn ticks_without_a_countdown_are_ignored() {
        let (mut controller, _) = controller_over(question_bank());
        controller.start(SessionMode::Text, easy()).await.expect("start");

        assert_eq!(controller.tick().await.expect("tick"), TickOutcome::Ignored);
        assert!(controller.countdown_remaining().is_none());
    }

    #[tokio::test]
    async fn reset_clears_the_session_and_changes_the_id() {
        let (mut controller, _) = controller_over(question_bank());
        controller.start(SessionMode::Text, easy()).await.expect("start");
        let first_id = controller.session_id().expect("id");
        controller.submit("I am a student.");

        controller.reset();
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.session_id().is_none());
        assert!(controller.progress().is_none());
        assert!(controller.summary().is_none());
        assert!(controller.last_record().is_none());

        controller.start(SessionMode::Text, easy()).await.expect("restart");
        assert_ne!(controller.session_id().expect("id"), first_id);
    }

    #[tokio::test]
    async fn tokens_only_move_in_a_presenting_block_session() {
        let (mut controller, _) = controller_over(question_bank());
        assert!(!controller.select_token("I"));

        controller.start(SessionMode::Text, easy()).await.expect("start");
        // Text mode has no tray.
        assert!(!controller.select_token("I"));
        assert!(controller.selection().is_none());
        assert_eq!(controller.submit_selection(), SubmitOutcome::Ignored);
        assert_eq!(controller.phase(), Phase::Presenting);
        controller.reset();

        controller.start(SessionMode::Block, easy()).await.expect("start");
        assert!(controller.select_token("I"));
        assert!(!controller.select_token("not-in-the-answer"));
        assert!(controller.deselect_token(0));
        assert!(!controller.deselect_token(5));
    }
}
