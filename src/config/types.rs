use std::path::PathBuf;

use serde::Deserialize;

use crate::args::{OutputFormat, PacingMode};

/// Settings file contents. Every key is optional; command-line values win.
///
/// The issuance credential is deliberately absent: it is only taken from
/// `--token` or the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub mount: Option<String>,
    pub duration: Option<u64>,
    pub concurrency: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub output_format: Option<OutputFormat>,
    pub issue: Option<IssueConfig>,
    pub ocsp: Option<OcspConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueConfig {
    pub role: Option<String>,
    pub common_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcspConfig {
    pub cert: Option<PathBuf>,
    pub issuer: Option<PathBuf>,
    pub rate: Option<i64>,
    pub pacing: Option<PacingMode>,
    pub encoder: Option<String>,
}
