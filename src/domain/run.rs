use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use url::Url;

use crate::args::PacingMode;

/// Default per-request timeout for certificate issuance.
const ISSUE_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Default per-request timeout for OCSP queries.
const OCSP_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    Issue,
    Ocsp,
}

impl WorkloadKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WorkloadKind::Issue => "issue",
            WorkloadKind::Ocsp => "ocsp",
        }
    }

    #[must_use]
    pub const fn default_timeout(self) -> Duration {
        match self {
            WorkloadKind::Issue => ISSUE_TIMEOUT,
            WorkloadKind::Ocsp => OCSP_TIMEOUT,
        }
    }
}

/// Bearer-style credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTarget {
    /// Requests per second across all workers; `<= 0` behaves as 1.
    pub per_second: i64,
    pub pacing: PacingMode,
}

#[derive(Debug, Clone)]
pub enum WorkloadSpec {
    Issue {
        common_name: String,
        credential: Credential,
    },
    Ocsp {
        /// Encoded request, identical for every attempt.
        payload: Vec<u8>,
        rate: RateTarget,
    },
}

/// Immutable settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub endpoint: Url,
    pub duration: Duration,
    pub concurrency: usize,
    pub timeout: Duration,
    pub workload: WorkloadSpec,
}

impl RunConfig {
    #[must_use]
    pub const fn kind(&self) -> WorkloadKind {
        match self.workload {
            WorkloadSpec::Issue { .. } => WorkloadKind::Issue,
            WorkloadSpec::Ocsp { .. } => WorkloadKind::Ocsp,
        }
    }

    /// `None` for closed-loop workloads.
    #[must_use]
    pub const fn rate_target(&self) -> Option<RateTarget> {
        match self.workload {
            WorkloadSpec::Issue { .. } => None,
            WorkloadSpec::Ocsp { rate, .. } => Some(rate),
        }
    }
}

/// Instant after which no worker starts a new attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    #[must_use]
    pub fn after(start: Instant, duration: Duration) -> Self {
        Self(start.checked_add(duration).unwrap_or(start))
    }

    #[must_use]
    pub const fn instant(self) -> Instant {
        self.0
    }

    #[must_use]
    pub fn has_passed(self) -> bool {
        self.has_passed_at(Instant::now())
    }

    #[must_use]
    pub fn has_passed_at(self, now: Instant) -> bool {
        now >= self.0
    }
}
