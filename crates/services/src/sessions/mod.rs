mod controller;
mod plan;
mod quiz;
mod timer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{
    AdvanceOutcome, LoadOutcome, LoadTicket, Phase, SessionConfig, SessionController,
    SubmitOutcome, TickOutcome,
};
pub use plan::{SessionBuilder, SessionPlan};
pub use quiz::{QuizSession, SessionMode, SessionProgress};
pub use timer::{Countdown, CountdownTick, DEFAULT_QUESTION_TIME_LIMIT};
