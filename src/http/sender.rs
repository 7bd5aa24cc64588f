use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::args::DEFAULT_USER_AGENT;
use crate::domain::{Deadline, RunConfig};
use crate::error::HttpError;
use crate::metrics::RequestOutcome;

use super::execution::execute_attempt;
use super::rate::Pacer;
use super::workload::RequestTemplate;

/// Builds the shared HTTP client. Connections are pooled across workers.
///
/// # Errors
///
/// Returns an error when the client cannot be constructed.
pub(crate) fn build_client(config: &RunConfig) -> Result<Client, HttpError> {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .pool_max_idle_per_host(config.concurrency)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}

/// State shared by every worker of a run.
pub(crate) struct WorkerShared {
    pub client: Client,
    pub template: RequestTemplate,
    pub pacer: Option<Pacer>,
    pub deadline: Deadline,
    pub timeout: Duration,
}

/// Spawns `concurrency` workers. Each handle resolves to the number of
/// attempts that worker completed.
pub(crate) fn spawn_workers(
    shared: &Arc<WorkerShared>,
    concurrency: usize,
    outcome_tx: &mpsc::Sender<RequestOutcome>,
) -> Vec<JoinHandle<u64>> {
    let mut handles = Vec::with_capacity(concurrency);
    for worker_idx in 0..concurrency {
        let shared = Arc::clone(shared);
        let outcome_tx = outcome_tx.clone();
        handles.push(tokio::spawn(async move {
            run_worker(worker_idx, &shared, &outcome_tx).await
        }));
    }
    handles
}

async fn run_worker(
    worker_idx: usize,
    shared: &WorkerShared,
    outcome_tx: &mpsc::Sender<RequestOutcome>,
) -> u64 {
    let mut attempts: u64 = 0;
    loop {
        if shared.deadline.has_passed() {
            break;
        }
        if let Some(pacer) = shared.pacer.as_ref()
            && !pacer.wait_turn(worker_idx, attempts, shared.deadline).await
        {
            break;
        }
        if shared.deadline.has_passed() {
            break;
        }

        let request = match shared.template.instantiate() {
            Ok(request) => request,
            Err(err) => {
                error!("Worker {} stopped: {}", worker_idx, err);
                break;
            }
        };
        let outcome = execute_attempt(&shared.client, request, shared.timeout).await;
        attempts = attempts.saturating_add(1);

        if outcome_tx.send(outcome).await.is_err() {
            warn!("Metrics collector closed; worker {} stopping.", worker_idx);
            break;
        }
    }
    debug!("Worker {} finished after {} attempts", worker_idx, attempts);
    attempts
}
