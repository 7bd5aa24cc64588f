use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use super::{MetricsAggregator, RequestOutcome};

/// Spawns the task that owns the aggregator.
///
/// The task drains `outcome_rx` until every sender is dropped and then hands
/// the aggregator back through the join handle.
#[must_use]
pub fn setup_metrics_collector(
    aggregator: MetricsAggregator,
    mut outcome_rx: mpsc::Receiver<RequestOutcome>,
) -> JoinHandle<MetricsAggregator> {
    tokio::spawn(async move {
        let mut aggregator = aggregator;
        while let Some(outcome) = outcome_rx.recv().await {
            aggregator.record(&outcome);
        }
        debug!(
            successes = aggregator.successes(),
            failures = aggregator.failures(),
            "Metrics collector drained"
        );
        aggregator
    })
}
