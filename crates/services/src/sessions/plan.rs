use rand::rng;
use rand::seq::SliceRandom;

use honyaku_core::model::Question;

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    pub pool_size: usize,
}

impl SessionPlan {
    /// Number of questions selected for the session.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when no questions were selected for this session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Builds a session's question list from a fetched pool.
pub struct SessionBuilder {
    session_size: usize,
    sample: bool,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(session_size: usize) -> Self {
        Self {
            session_size,
            sample: false,
        }
    }

    /// Enable or disable uniform down-sampling of a larger pool.
    #[must_use]
    pub fn with_sampling(mut self, sample: bool) -> Self {
        self.sample = sample;
        self
    }

    /// Build the plan: with sampling the pool is shuffled first, so the cap
    /// keeps a uniform random subset; without it the pool is taken in source
    /// order up to the cap.
    #[must_use]
    pub fn build(self, pool: Vec<Question>) -> SessionPlan {
        let pool_size = pool.len();
        let mut questions = pool;
        if self.sample {
            let mut rng = rng();
            questions.as_mut_slice().shuffle(&mut rng);
        }
        questions.truncate(self.session_size);
        SessionPlan {
            questions,
            pool_size,
        }
    }
}
