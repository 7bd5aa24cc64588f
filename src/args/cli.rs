use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_BASE_URL, DEFAULT_COMMON_NAME, DEFAULT_ENCODER, DEFAULT_MOUNT, DEFAULT_OCSP_RATE,
    DEFAULT_ROLE, TOKEN_ENV,
};
use super::parsers::{parse_bool_env, parse_positive_u64, parse_positive_usize};
use super::types::{OutputFormat, PacingMode, PositiveU64, PositiveUsize};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Issue certificates back-to-back from every worker (closed loop)
    Issue(IssueArgs),
    /// Query OCSP status, pacing workers toward a target aggregate rate
    Ocsp(OcspArgs),
}

#[derive(Debug, Args, Clone)]
pub struct IssueArgs {
    /// Role used in the issue path (<url>/v1/<mount>/issue/<role>)
    #[arg(long, short, default_value = DEFAULT_ROLE)]
    pub role: String,

    /// Common name requested for every certificate
    #[arg(long = "common-name", short = 'n', default_value = DEFAULT_COMMON_NAME)]
    pub common_name: String,

    /// Credential sent as X-Vault-Token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct OcspArgs {
    /// Subject certificate whose status is queried (PEM)
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Issuer certificate of the subject (PEM)
    #[arg(long)]
    pub issuer: Option<PathBuf>,

    /// Target aggregate rate in requests per second (<= 0 is treated as 1)
    #[arg(long, default_value_t = DEFAULT_OCSP_RATE, allow_negative_numbers = true)]
    pub rate: i64,

    /// Pacing scheme used to hold the target rate
    #[arg(long, value_enum, default_value = "cooperative")]
    pub pacing: PacingMode,

    /// Executable used to encode the OCSP request
    #[arg(long, default_value = DEFAULT_ENCODER)]
    pub encoder: String,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Load harness for certificate-authority endpoints: certificate issuance and OCSP status queries."
)]
pub struct PkiArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the certificate authority
    #[arg(long, short, env = "PKILOAD_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub url: String,

    /// Mount path of the PKI engine
    #[arg(long, short, default_value = DEFAULT_MOUNT, global = true)]
    pub mount: String,

    /// Run duration in seconds
    #[arg(
        long = "duration",
        short = 't',
        default_value = "120",
        value_parser = parse_positive_u64,
        global = true
    )]
    pub duration: PositiveU64,

    /// Number of concurrent workers
    #[arg(
        long,
        short = 'c',
        default_value = "10",
        value_parser = parse_positive_usize,
        global = true
    )]
    pub concurrency: PositiveUsize,

    /// Per-request timeout in milliseconds (default: 10000 for issue, 5000 for ocsp)
    #[arg(long = "timeout-ms", value_parser = parse_positive_u64, global = true)]
    pub timeout_ms: Option<PositiveU64>,

    /// Report format
    #[arg(long = "output-format", value_enum, default_value = "text", global = true)]
    pub output_format: OutputFormat,

    /// Path to a .toml or .json config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env, global = true)]
    pub no_color: bool,
}
