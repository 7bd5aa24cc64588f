//! Outcome recording, aggregation, and latency statistics.
mod aggregator;
mod collector;
mod percentiles;
mod types;


pub use aggregator::{FailureBreakdown, MetricsAggregator};
pub use collector::setup_metrics_collector;
pub use percentiles::{LatencySummary, percentile, summarize_latencies};
pub use types::{FailureKind, Outcome, RequestOutcome};
