//! OCSP request payload preparation.
//!
//! The status-query body is the same for every attempt, so it is encoded once
//! before any load is generated. Encoding is delegated to an external tool
//! behind [`PayloadEncoder`]; the tool writes its output to a scratch file that
//! is read back and removed immediately.
mod encoder;


use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use crate::error::{InputRole, PayloadError};

pub use encoder::{EncodeJob, OpensslOcspEncoder, PayloadEncoder};

/// File name of the scratch artifact inside the scratch directory.
const ARTIFACT_NAME: &str = "ocsp-request.der";

/// Encodes the OCSP request for `subject`/`issuer` addressed to `endpoint`.
///
/// # Errors
///
/// Returns an error when an input certificate is missing, the scratch
/// directory cannot be created, the encoder fails, or the encoded request is
/// unreadable or empty.
pub async fn prepare_ocsp_payload(
    encoder: &dyn PayloadEncoder,
    subject: &Path,
    issuer: &Path,
    endpoint: &Url,
) -> Result<Vec<u8>, PayloadError> {
    ensure_input(subject, InputRole::Subject)?;
    ensure_input(issuer, InputRole::Issuer)?;

    let scratch = tempfile::Builder::new()
        .prefix("pkiload-")
        .tempdir()
        .map_err(|err| PayloadError::ScratchDir { source: err })?;
    let artifact = scratch.path().join(ARTIFACT_NAME);

    let job = EncodeJob {
        subject,
        issuer,
        endpoint,
        output: &artifact,
    };
    debug!("Encoding OCSP request into {}", artifact.display());
    let read = match encoder.encode(&job).await {
        Ok(()) => tokio::fs::read(&artifact)
            .await
            .map_err(|err| PayloadError::ReadArtifact {
                path: artifact.clone(),
                source: err,
            }),
        Err(err) => Err(err),
    };

    discard_artifact(&artifact).await;
    if let Err(err) = scratch.close() {
        warn!("Failed to remove scratch directory: {}", err);
    }

    let payload = read?;
    if payload.is_empty() {
        return Err(PayloadError::EmptyPayload);
    }
    info!("Prepared OCSP request ({} bytes)", payload.len());
    Ok(payload)
}

fn ensure_input(path: &Path, role: InputRole) -> Result<(), PayloadError> {
    if path.is_file() {
        return Ok(());
    }
    Err(PayloadError::MissingInput {
        role,
        path: path.to_path_buf(),
    })
}

async fn discard_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!("Failed to remove {}: {}", path.display(), err),
    }
}
