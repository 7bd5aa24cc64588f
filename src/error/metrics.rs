use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metrics collector task failed: {source}")]
    CollectorFailed {
        #[source]
        source: tokio::task::JoinError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
