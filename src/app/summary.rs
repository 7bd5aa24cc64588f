use std::time::Duration;

use serde::Serialize;

use crate::args::OutputFormat;
use crate::domain::{RunConfig, WorkloadKind};
use crate::error::AppResult;
use crate::http::pacing_interval;
use crate::metrics::{FailureBreakdown, LatencySummary, MetricsAggregator, summarize_latencies};

/// Scale for percentage figures.
const PERCENT: f64 = 100.0;

/// Final figures for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub workload: WorkloadKind,
    pub url: String,
    pub duration_secs: u64,
    pub concurrency: usize,
    pub timeout_ms: u64,
    /// Target aggregate rate; absent for closed-loop workloads.
    pub target_rate: Option<i64>,
    pub pacing: Option<&'static str>,
    pub pacing_interval_ms: Option<u64>,
    /// From run start until the last in-flight attempt finished.
    pub wall_secs: f64,
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
    pub success_pct: f64,
    /// Successes divided by wall-clock seconds.
    pub steady_rate: f64,
    /// Highest success count observed within one second.
    pub peak_rate: u64,
    /// Absent when no attempt succeeded.
    pub latency: Option<LatencySummary>,
    pub failure_breakdown: FailureBreakdown,
}

pub fn build_report(config: &RunConfig, aggregator: &MetricsAggregator, wall: Duration) -> RunReport {
    let target = config.rate_target();
    let wall_secs = wall.as_secs_f64();
    let successes = aggregator.successes();
    let total = aggregator.total();

    RunReport {
        workload: config.kind(),
        url: config.endpoint.to_string(),
        duration_secs: config.duration.as_secs(),
        concurrency: config.concurrency,
        timeout_ms: u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
        target_rate: target.map(|target| target.per_second),
        pacing: target.map(|target| target.pacing.as_str()),
        pacing_interval_ms: target.map(|target| {
            let interval = pacing_interval(target.per_second, config.concurrency);
            u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
        }),
        wall_secs,
        total,
        successes,
        failures: aggregator.failures(),
        success_pct: ratio(successes, total) * PERCENT,
        steady_rate: if wall_secs > 0.0 {
            successes as f64 / wall_secs
        } else {
            0.0
        },
        peak_rate: aggregator.peak_rate(),
        latency: summarize_latencies(aggregator.latencies_ms()),
        failure_breakdown: aggregator.breakdown().clone(),
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

pub fn report_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Workload: {}", report.workload.as_str()));
    lines.push(format!("Target: {}", report.url));
    lines.push(format!(
        "Duration: {}s (wall {:.2}s)",
        report.duration_secs, report.wall_secs
    ));
    lines.push(format!("Concurrency: {}", report.concurrency));
    lines.push(format!("Timeout: {}ms", report.timeout_ms));
    if let (Some(rate), Some(pacing)) = (report.target_rate, report.pacing) {
        let interval = report
            .pacing_interval_ms
            .map_or_else(String::new, |ms| format!(", {}ms per worker", ms));
        lines.push(format!("Target Rate: {} req/s ({}{})", rate, pacing, interval));
    }

    lines.push(format!("Total Requests: {}", report.total));
    lines.push(format!(
        "Successful: {} ({:.2}%)",
        report.successes, report.success_pct
    ));
    lines.push(format!("Failed: {}", report.failures));
    let breakdown = &report.failure_breakdown;
    if report.failures > 0 {
        lines.push(format!(
            "  Non-Success Status: {}{}",
            breakdown.non_success_status,
            status_code_suffix(breakdown)
        ));
        lines.push(format!("  Timeouts: {}", breakdown.timeouts));
        lines.push(format!("  Transport Errors: {}", breakdown.transport_errors));
    }

    lines.push(format!("Steady Rate: {:.2} req/s", report.steady_rate));
    lines.push(format!("Peak Rate: {} req/s", report.peak_rate));

    match &report.latency {
        Some(latency) => {
            lines.push(format!(
                "Latency Min/Mean: {:.2}ms / {:.2}ms",
                latency.min_ms, latency.mean_ms
            ));
            lines.push(format!(
                "Latency P50/P95/P99: {:.2}ms / {:.2}ms / {:.2}ms",
                latency.p50_ms, latency.p95_ms, latency.p99_ms
            ));
            lines.push(format!("Latency Max: {:.2}ms", latency.max_ms));
        }
        None => lines.push("Latency: no data (no successful requests)".to_owned()),
    }
    lines
}

fn status_code_suffix(breakdown: &FailureBreakdown) -> String {
    if breakdown.status_codes.is_empty() {
        return String::new();
    }
    let codes: Vec<String> = breakdown
        .status_codes
        .iter()
        .map(|(code, count)| format!("{} x{}", code, count))
        .collect();
    format!(" ({})", codes.join(", "))
}

/// Prints the report to stdout.
///
/// # Errors
///
/// Returns an error when the JSON report cannot be serialised.
pub fn print_report(report: &RunReport, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in report_lines(report) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}
