//! HTTP implementation of the score sink.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use honyaku_core::model::ScoreSubmission;
use storage::repository::{ScoreSink, StorageError};

/// POSTs finished-session scores to a remote score API.
#[derive(Clone)]
pub struct HttpScoreSink {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ScoreCreated {
    id: i64,
}

impl HttpScoreSink {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Replace the HTTP client, e.g. to set a request timeout.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/score", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ScoreSink for HttpScoreSink {
    async fn persist_score(&self, submission: &ScoreSubmission) -> Result<i64, StorageError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(submission)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Connection(format!(
                "score api returned status {status}"
            )));
        }

        let created: ScoreCreated = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(created.id)
    }
}
