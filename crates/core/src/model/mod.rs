mod answer;
mod blocks;
mod ids;
mod question;
mod score;
mod session;

pub use ids::{ParseIdError, QuestionId, SessionId};

pub use answer::{AnswerOutcome, AnswerRecord};
pub use blocks::WordBlockState;
pub use question::{Difficulty, Question, QuestionError, QuestionFilter};
pub use score::ScoreSubmission;
pub use session::{POINTS_PER_CORRECT, SessionSummary, SummaryError};
