#![forbid(unsafe_code)]

pub mod error;
pub mod http_sink;
pub mod recorder;
pub mod sessions;
pub mod word_blocks;

pub use honyaku_core::Clock;
pub use sessions as session;

pub use error::SessionError;
pub use http_sink::HttpScoreSink;
pub use recorder::{RecordOutcome, ScoreRecorder, ScoreRecorderConfig};

pub use sessions::{
    AdvanceOutcome, LoadOutcome, LoadTicket, Phase, QuizSession, SessionConfig, SessionController,
    SessionMode, SessionProgress, SubmitOutcome, TickOutcome,
};
