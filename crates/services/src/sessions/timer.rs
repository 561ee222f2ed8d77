//! Per-question countdown for the timed variant.

/// Default per-question limit, in seconds.
pub const DEFAULT_QUESTION_TIME_LIMIT: u32 = 20;

/// One tick of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Running { remaining: u32 },
    Expired,
}

/// Per-question limit for the timed variant.
///
/// Advanced by one `tick()` per elapsed second; reaches `Expired` at the
/// limit and never before it. The holder drops an expired or cancelled
/// countdown, so a stale countdown can never fire against a question that
/// is no longer current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    limit: u32,
    elapsed: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { limit, elapsed: 0 }
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.elapsed)
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> CountdownTick {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed >= self.limit {
            CountdownTick::Expired
        } else {
            CountdownTick::Running {
                remaining: self.remaining(),
            }
        }
    }
}
