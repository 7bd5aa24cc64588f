use std::collections::BTreeMap;

use serde::Serialize;
use tokio::time::Instant;

use super::types::{FailureKind, Outcome, RequestOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureBreakdown {
    pub non_success_status: u64,
    pub timeouts: u64,
    pub transport_errors: u64,
    /// Count per non-success status code.
    pub status_codes: BTreeMap<u16, u64>,
}

/// Run-wide outcome sink.
///
/// One aggregator is owned by the collector task for the whole run, so every
/// mutation is serialized without a lock. Successes are bucketed by the
/// elapsed second (since `run_start`) in which the response completed.
#[derive(Debug)]
pub struct MetricsAggregator {
    run_start: Instant,
    successes: u64,
    failures: u64,
    latencies_ms: Vec<f64>,
    per_second: Vec<u64>,
    breakdown: FailureBreakdown,
}

impl MetricsAggregator {
    /// `expected_secs` pre-sizes the per-second series; later completions
    /// still extend it.
    #[must_use]
    pub fn new(run_start: Instant, expected_secs: usize) -> Self {
        Self {
            run_start,
            successes: 0,
            failures: 0,
            latencies_ms: Vec::new(),
            per_second: vec![0; expected_secs],
            breakdown: FailureBreakdown::default(),
        }
    }

    pub fn record(&mut self, outcome: &RequestOutcome) {
        match outcome.outcome {
            Outcome::Success { latency_ms } => {
                self.record_success(latency_ms, outcome.completed_at);
            }
            Outcome::Failure(kind) => self.record_failure(kind),
        }
    }

    pub fn record_success(&mut self, latency_ms: f64, completed_at: Instant) {
        self.successes = self.successes.saturating_add(1);
        self.latencies_ms.push(latency_ms);

        let second = completed_at
            .saturating_duration_since(self.run_start)
            .as_secs();
        let idx = usize::try_from(second).unwrap_or(usize::MAX);
        if idx >= self.per_second.len() {
            self.per_second.resize(idx.saturating_add(1), 0);
        }
        if let Some(slot) = self.per_second.get_mut(idx) {
            *slot = slot.saturating_add(1);
        }
    }

    pub fn record_failure(&mut self, kind: FailureKind) {
        self.failures = self.failures.saturating_add(1);
        match kind {
            FailureKind::Status(code) => {
                self.breakdown.non_success_status =
                    self.breakdown.non_success_status.saturating_add(1);
                let entry = self.breakdown.status_codes.entry(code).or_insert(0);
                *entry = entry.saturating_add(1);
            }
            FailureKind::Timeout => {
                self.breakdown.timeouts = self.breakdown.timeouts.saturating_add(1);
            }
            FailureKind::Transport => {
                self.breakdown.transport_errors = self.breakdown.transport_errors.saturating_add(1);
            }
        }
    }

    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successes
    }

    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }

    /// Success latencies in recording order.
    #[must_use]
    pub fn latencies_ms(&self) -> &[f64] {
        &self.latencies_ms
    }

    /// Successes per elapsed second.
    #[must_use]
    pub fn per_second(&self) -> &[u64] {
        &self.per_second
    }

    /// Highest per-second success count, 0 when nothing succeeded.
    #[must_use]
    pub fn peak_rate(&self) -> u64 {
        self.per_second.iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub const fn breakdown(&self) -> &FailureBreakdown {
        &self.breakdown
    }
}
