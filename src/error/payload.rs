use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    #[error("subject certificate")]
    Subject,
    #[error("issuer certificate")]
    Issuer,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("{role} '{path}' does not exist.")]
    MissingInput { role: InputRole, path: PathBuf },
    #[error("Failed to create scratch directory: {source}")]
    ScratchDir {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to launch encoder '{program}': {source}")]
    SpawnEncoder {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Encoder '{program}' exited with {status}: {stderr}")]
    EncoderFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("Encoder '{program}' did not finish within {timeout_ms}ms.")]
    EncoderTimedOut { program: String, timeout_ms: u64 },
    #[error("Failed to read encoded request '{path}': {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Encoder produced an empty request.")]
    EmptyPayload,
}
