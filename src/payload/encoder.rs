use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::error::PayloadError;

/// Inputs for one encoding run.
#[derive(Debug, Clone, Copy)]
pub struct EncodeJob<'job> {
    pub subject: &'job Path,
    pub issuer: &'job Path,
    pub endpoint: &'job Url,
    /// Where the encoder must write the binary request.
    pub output: &'job Path,
}

/// Produces a binary OCSP request at `job.output`.
#[async_trait]
pub trait PayloadEncoder: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the request could not be produced.
    async fn encode(&self, job: &EncodeJob<'_>) -> Result<(), PayloadError>;
}

/// Runs `openssl ocsp` to build a nonce-free request.
///
/// The child is killed if it has not exited within `timeout`.
#[derive(Debug, Clone)]
pub struct OpensslOcspEncoder {
    program: String,
    timeout: Duration,
}

impl OpensslOcspEncoder {
    #[must_use]
    pub const fn new(program: String, timeout: Duration) -> Self {
        Self { program, timeout }
    }

    fn command(&self, job: &EncodeJob<'_>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("ocsp")
            .arg("-issuer")
            .arg(job.issuer)
            .arg("-cert")
            .arg(job.subject)
            .arg("-url")
            .arg(job.endpoint.as_str())
            .arg("-reqout")
            .arg(job.output)
            .arg("-no_nonce")
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl PayloadEncoder for OpensslOcspEncoder {
    async fn encode(&self, job: &EncodeJob<'_>) -> Result<(), PayloadError> {
        let Ok(finished) = tokio::time::timeout(self.timeout, self.command(job).output()).await
        else {
            return Err(PayloadError::EncoderTimedOut {
                program: self.program.clone(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            });
        };
        let output = finished.map_err(|err| PayloadError::SpawnEncoder {
            program: self.program.clone(),
            source: err,
        })?;

        if !output.stdout.is_empty() {
            debug!("encoder stdout: {}", String::from_utf8_lossy(&output.stdout).trim());
        }
        if output.status.success() {
            return Ok(());
        }

        Err(PayloadError::EncoderFailed {
            program: self.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}
