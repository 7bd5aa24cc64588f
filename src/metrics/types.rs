use std::time::Duration;

use tokio::time::Instant;

/// Why an attempt did not count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Response arrived with a non-2xx status.
    Status(u16),
    /// The attempt hit the per-request timeout.
    Timeout,
    /// Connection, TLS, or body-stream failure.
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Success { latency_ms: f64 },
    Failure(FailureKind),
}

/// Result of one attempt, stamped with the instant it completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestOutcome {
    pub completed_at: Instant,
    pub outcome: Outcome,
}

impl RequestOutcome {
    #[must_use]
    pub fn success(started_at: Instant, completed_at: Instant) -> Self {
        let latency = completed_at.saturating_duration_since(started_at);
        Self {
            completed_at,
            outcome: Outcome::Success {
                latency_ms: duration_ms(latency),
            },
        }
    }

    #[must_use]
    pub const fn failure(completed_at: Instant, kind: FailureKind) -> Self {
        Self {
            completed_at,
            outcome: Outcome::Failure(kind),
        }
    }
}

pub(crate) fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
