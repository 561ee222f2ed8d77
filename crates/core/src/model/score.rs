use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::SessionId;
use crate::model::question::Difficulty;
use crate::model::session::SessionSummary;

/// Final score payload sent to the score sink when a session completes.
///
/// Field names follow the sink's wire contract: elapsed time travels in a
/// field named `time` (seconds), `created_at` as an ISO-8601 timestamp, and
/// difficulty as its numeric level. Built exactly once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub session_id: SessionId,
    pub score: u32,
    pub difficulty: u8,
    pub stage: u32,
    #[serde(rename = "time")]
    pub elapsed_seconds: f64,
    pub created_at: DateTime<Utc>,
}

impl ScoreSubmission {
    /// Builds the wire payload from a completed session's summary.
    #[must_use]
    pub fn from_summary(
        session_id: SessionId,
        difficulty: Difficulty,
        stage: u32,
        summary: &SessionSummary,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            score: summary.score(),
            difficulty: difficulty.as_u8(),
            stage,
            elapsed_seconds: summary.elapsed_seconds(),
            created_at,
        }
    }
}
