use serde::Serialize;

/// Latency figures over successful attempts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySummary {
    pub samples: usize,
    pub min_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

/// Percentile over ascending samples using linear interpolation between the
/// two nearest ranks. `None` for an empty slice or a non-finite `p`.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !p.is_finite() {
        return None;
    }
    let last = sorted.len().saturating_sub(1);
    let rank = (p.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lo = (rank.floor() as usize).min(last);
    let hi = (rank.ceil() as usize).min(last);
    let low = *sorted.get(lo)?;
    let high = *sorted.get(hi)?;
    if lo == hi {
        return Some(low);
    }
    let weight = rank - lo as f64;
    Some(low * (1.0 - weight) + high * weight)
}

/// Sorts a copy of `samples` and reduces it. `None` when there are no samples.
#[must_use]
pub fn summarize_latencies(samples: &[f64]) -> Option<LatencySummary> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let min_ms = *sorted.first()?;
    let max_ms = *sorted.last()?;
    let mean_ms = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(LatencySummary {
        samples: sorted.len(),
        min_ms,
        mean_ms,
        p50_ms: percentile(&sorted, 50.0)?,
        p95_ms: percentile(&sorted, 95.0)?,
        p99_ms: percentile(&sorted, 99.0)?,
        max_ms,
    })
}
