use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::domain::{Deadline, RunConfig};
use crate::error::{AppError, AppResult, MetricsError};
use crate::http::{Pacer, WorkerShared, build_client, build_request_template, spawn_workers};
use crate::metrics::{MetricsAggregator, RequestOutcome, setup_metrics_collector};

use super::summary::{RunReport, build_report};

/// Bound on outcomes buffered between workers and the collector.
const OUTCOME_CHANNEL_CAPACITY: usize = 10_000;
/// Upper bound on the pre-sized per-second series; it still grows past this.
const MAX_PRESIZED_SECS: usize = 86_400;

#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    /// Attempts started by all workers; equals `report.total`.
    pub attempts: u64,
}

/// Drives one run to completion and reduces its outcomes into a report.
///
/// Workers stop starting attempts at the deadline; in-flight attempts finish
/// naturally and the wall-clock figure covers them.
///
/// # Errors
///
/// Returns an error when the client or request template cannot be built or a
/// worker or the collector task fails.
pub async fn run_load(config: &RunConfig) -> AppResult<RunOutcome> {
    let client = build_client(config)?;
    let template = build_request_template(&client, config)?;

    let run_start = Instant::now();
    let deadline = Deadline::after(run_start, config.duration);
    let (pacer, scheduler) = match config.rate_target() {
        Some(target) => {
            let (pacer, scheduler) = Pacer::start(target, config.concurrency, deadline);
            if let Some(interval) = pacer.interval() {
                info!(
                    "Pacing {} workers toward {} req/s ({}ms per worker)",
                    config.concurrency,
                    target.per_second,
                    interval.as_millis()
                );
            } else {
                info!(
                    "Pacing {} workers toward {} req/s with a shared token bucket",
                    config.concurrency, target.per_second
                );
            }
            (Some(pacer), scheduler)
        }
        None => (None, None),
    };

    let (outcome_tx, outcome_rx) = mpsc::channel::<RequestOutcome>(OUTCOME_CHANNEL_CAPACITY);
    let collector = setup_metrics_collector(
        MetricsAggregator::new(
            run_start,
            expected_seconds(config.duration, config.timeout),
        ),
        outcome_rx,
    );

    let shared = Arc::new(WorkerShared {
        client,
        template,
        pacer,
        deadline,
        timeout: config.timeout,
    });
    info!(
        "Starting {} run against {} with {} workers for {}s",
        config.kind().as_str(),
        config.endpoint,
        config.concurrency,
        config.duration.as_secs()
    );
    let handles = spawn_workers(&shared, config.concurrency, &outcome_tx);
    drop(outcome_tx);

    let (attempts, worker_failure) = join_workers(handles).await;
    let wall = run_start.elapsed();
    debug!("All workers finished after {}ms", wall.as_millis());

    let scheduler_result = match scheduler {
        Some(scheduler) => scheduler.await,
        None => Ok(()),
    };
    let collector_result = collector.await;
    if let Some(err) = worker_failure {
        return Err(AppError::from(err));
    }
    scheduler_result?;
    let aggregator = collector_result
        .map_err(|err| AppError::metrics(MetricsError::CollectorFailed { source: err }))?;

    Ok(RunOutcome {
        report: build_report(config, &aggregator, wall),
        attempts,
    })
}

/// Awaits every worker, summing attempts, and keeps the first join failure
/// so no worker is left running detached when another one fails.
pub(crate) async fn join_workers(handles: Vec<JoinHandle<u64>>) -> (u64, Option<JoinError>) {
    let mut attempts: u64 = 0;
    let mut first_failure: Option<JoinError> = None;
    for handle in handles {
        match handle.await {
            Ok(count) => attempts = attempts.saturating_add(count),
            Err(err) => {
                error!("Worker task failed: {}", err);
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }
    (attempts, first_failure)
}

/// Seconds the per-second series can span: the run plus one timeout for
/// attempts still in flight at the deadline.
pub(crate) fn expected_seconds(duration: Duration, timeout: Duration) -> usize {
    let timeout_secs = timeout
        .as_secs()
        .saturating_add(u64::from(timeout.subsec_nanos() > 0));
    let secs = duration
        .as_secs()
        .saturating_add(timeout_secs)
        .saturating_add(1);
    usize::try_from(secs)
        .unwrap_or(usize::MAX)
        .min(MAX_PRESIZED_SECS)
}
