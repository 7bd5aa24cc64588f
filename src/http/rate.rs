use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::debug;

use crate::args::PacingMode;
use crate::domain::{Deadline, RateTarget};

const MILLIS_PER_SEC: u64 = 1_000;
/// Floor for the spacing between two paced attempts.
const MIN_SPACING_MS: u64 = 1;

/// Spacing between successive attempts for an aggregate `rate` (req/s).
///
/// `max(1ms, floor(1000 / rate))`, with `rate <= 0` treated as 1.
#[must_use]
pub(crate) fn base_spacing(rate: i64) -> Duration {
    let rate = u64::try_from(rate).ok().filter(|rate| *rate > 0).unwrap_or(1);
    let spacing_ms = MILLIS_PER_SEC
        .checked_div(rate)
        .unwrap_or(MILLIS_PER_SEC)
        .max(MIN_SPACING_MS);
    Duration::from_millis(spacing_ms)
}

/// Per-worker sleep under cooperative pacing: `base_spacing(rate) * workers`.
#[must_use]
pub(crate) fn pacing_interval(rate: i64, workers: usize) -> Duration {
    let workers = u32::try_from(workers.max(1)).unwrap_or(u32::MAX);
    base_spacing(rate).saturating_mul(workers)
}

/// Spaces attempts so the aggregate rate of all workers approaches a target.
#[derive(Debug)]
pub(crate) enum Pacer {
    /// Every worker sleeps `interval` before each attempt. The first attempt
    /// of worker `i` waits `i * stagger` instead so workers interleave.
    Cooperative { interval: Duration, stagger: Duration },
    /// Workers take one permit per attempt from a shared scheduler.
    TokenBucket { permits: Arc<Semaphore> },
}

impl Pacer {
    /// Builds the pacer for `target`. Token-bucket pacing also returns the
    /// scheduler task, which stops at the deadline.
    pub(crate) fn start(
        target: RateTarget,
        workers: usize,
        deadline: Deadline,
    ) -> (Self, Option<JoinHandle<()>>) {
        match target.pacing {
            PacingMode::Cooperative => (
                Pacer::Cooperative {
                    interval: pacing_interval(target.per_second, workers),
                    stagger: base_spacing(target.per_second),
                },
                None,
            ),
            PacingMode::TokenBucket => {
                let permits = Arc::new(Semaphore::new(0));
                let handle = spawn_token_scheduler(
                    Arc::clone(&permits),
                    base_spacing(target.per_second),
                    workers.max(1),
                    deadline,
                );
                (Pacer::TokenBucket { permits }, Some(handle))
            }
        }
    }

    /// Waits until worker `worker_idx` may start attempt number `attempt`.
    ///
    /// Returns `false` when the deadline is reached first; the caller must not
    /// start another attempt in that case.
    pub(crate) async fn wait_turn(&self, worker_idx: usize, attempt: u64, deadline: Deadline) -> bool {
        match self {
            Pacer::Cooperative { interval, stagger } => {
                let delay = if attempt == 0 {
                    let idx = u32::try_from(worker_idx).unwrap_or(u32::MAX);
                    stagger.saturating_mul(idx)
                } else {
                    *interval
                };
                sleep_before_deadline(delay, deadline).await
            }
            Pacer::TokenBucket { permits } => {
                tokio::select! {
                    permit = permits.acquire() => match permit {
                        Ok(permit) => {
                            permit.forget();
                            !deadline.has_passed()
                        }
                        Err(_) => false,
                    },
                    () = sleep_until(deadline.instant()) => false,
                }
            }
        }
    }

    /// Spacing a single worker observes between attempts.
    pub(crate) const fn interval(&self) -> Option<Duration> {
        match self {
            Pacer::Cooperative { interval, .. } => Some(*interval),
            Pacer::TokenBucket { .. } => None,
        }
    }
}

async fn sleep_before_deadline(delay: Duration, deadline: Deadline) -> bool {
    let wake = Instant::now().checked_add(delay).unwrap_or_else(|| deadline.instant());
    if wake >= deadline.instant() {
        sleep_until(deadline.instant()).await;
        return false;
    }
    sleep_until(wake).await;
    true
}

fn spawn_token_scheduler(
    permits: Arc<Semaphore>,
    spacing: Duration,
    max_banked: usize,
    deadline: Deadline,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut release_tick = interval(spacing);
        release_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut released: u64 = 0;
        loop {
            tokio::select! {
                _ = release_tick.tick() => {
                    if permits.available_permits() < max_banked {
                        permits.add_permits(1);
                        released = released.saturating_add(1);
                    }
                },
                () = sleep_until(deadline.instant()) => break,
            }
        }
        permits.close();
        debug!("Token scheduler stopped after releasing {} permits", released);
    })
}
