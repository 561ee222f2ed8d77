//! Best-effort score recording with bounded retry.

use std::sync::Arc;
use std::time::Duration;

use honyaku_core::model::ScoreSubmission;
use storage::repository::ScoreSink;

/// Retry policy for score persistence.
#[derive(Debug, Clone)]
pub struct ScoreRecorderConfig {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Delay between attempts.
    pub retry_delay: Duration,
}

impl Default for ScoreRecorderConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// What happened to a submission handed to the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The sink stored the submission under this row id.
    Persisted(i64),
    /// Every attempt failed; the submission was dropped.
    Dropped,
}

/// Hands finished-session scores to a sink.
///
/// Recording is fire-and-forget from the player's perspective: `record`
/// never returns an error, and a dropped submission leaves the session
/// summary untouched.
#[derive(Clone)]
pub struct ScoreRecorder {
    sink: Arc<dyn ScoreSink>,
    config: ScoreRecorderConfig,
}

impl ScoreRecorder {
    #[must_use]
    pub fn new(sink: Arc<dyn ScoreSink>) -> Self {
        Self {
            sink,
            config: ScoreRecorderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ScoreRecorderConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist the submission, retrying transient failures with a fixed
    /// delay between attempts. Exhausted retries yield
    /// `RecordOutcome::Dropped`; each failure is logged.
    pub async fn record(&self, submission: &ScoreSubmission) -> RecordOutcome {
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }
            match self.sink.persist_score(submission).await {
                Ok(id) => return RecordOutcome::Persisted(id),
                Err(err) => {
                    tracing::warn!(
                        "score persist attempt {} for session {} failed: {err}",
                        attempt + 1,
                        submission.session_id
                    );
                }
            }
        }
        RecordOutcome::Dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use honyaku_core::model::{Difficulty, SessionId, SessionSummary};
    use honyaku_core::time::fixed_now;
    use std::sync::atomic::{AtomicU32, Ordering};
    use storage::repository::StorageError;

    struct FlakySink {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakySink {
        fn failing(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ScoreSink for FlakySink {
        async fn persist_score(
            &self,
            _submission: &ScoreSubmission,
        ) -> Result<i64, StorageError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(StorageError::Connection("score api offline".into()))
            } else {
                Ok(7)
            }
        }
    }

    fn build_submission() -> ScoreSubmission {
        let summary = SessionSummary::from_parts(fixed_now(), fixed_now(), 0, 0, 0, 0).unwrap();
        ScoreSubmission::from_summary(
            SessionId::generate(),
            Difficulty::Easy,
            1,
            &summary,
            fixed_now(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_to_success() {
        let sink = FlakySink::failing(2);
        let recorder = ScoreRecorder::new(Arc::clone(&sink) as Arc<dyn ScoreSink>);

        let outcome = recorder.record(&build_submission()).await;

        assert_eq!(outcome, RecordOutcome::Persisted(7));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_drop_the_submission() {
        let sink = FlakySink::failing(10);
        let recorder = ScoreRecorder::new(Arc::clone(&sink) as Arc<dyn ScoreSink>);

        let outcome = recorder.record(&build_submission()).await;

        // One initial attempt plus the two default retries.
        assert_eq!(outcome, RecordOutcome::Dropped);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_attempt_exactly_once() {
        let sink = FlakySink::failing(10);
        let recorder =
            ScoreRecorder::new(Arc::clone(&sink) as Arc<dyn ScoreSink>).with_config(
                ScoreRecorderConfig {
                    max_retries: 0,
                    retry_delay: Duration::from_secs(1),
                },
            );

        let outcome = recorder.record(&build_submission()).await;

        assert_eq!(outcome, RecordOutcome::Dropped);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }
}
