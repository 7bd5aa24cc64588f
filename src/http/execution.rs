use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Request};
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::{FailureKind, RequestOutcome};

/// Sends `request`, drains the full body, and classifies the attempt.
///
/// Latency runs from just before dispatch to just after the last body byte.
/// The whole round trip is bounded by `timeout`; an attempt cut off by it
/// counts as a timeout failure.
pub(crate) async fn execute_attempt(
    client: &Client,
    request: Request,
    timeout: Duration,
) -> RequestOutcome {
    let started_at = Instant::now();
    let result = tokio::time::timeout(timeout, round_trip(client, request)).await;
    let completed_at = Instant::now();

    match result {
        Ok(Ok(status)) if is_success_status(status) => {
            RequestOutcome::success(started_at, completed_at)
        }
        Ok(Ok(status)) => {
            debug!("Non-success status {}", status);
            RequestOutcome::failure(completed_at, FailureKind::Status(status))
        }
        Ok(Err(err)) => {
            debug!("Request failed: {}", err);
            let kind = if err.is_timeout() {
                FailureKind::Timeout
            } else {
                FailureKind::Transport
            };
            RequestOutcome::failure(completed_at, kind)
        }
        Err(_elapsed) => {
            debug!("Request exceeded {}ms", timeout.as_millis());
            RequestOutcome::failure(completed_at, FailureKind::Timeout)
        }
    }
}

const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 300
}

async fn round_trip(client: &Client, request: Request) -> Result<u16, reqwest::Error> {
    let response = client.execute(request).await?;
    let status = response.status().as_u16();
    drain_response_body(response).await?;
    Ok(status)
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
