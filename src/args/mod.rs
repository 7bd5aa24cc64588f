//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, IssueArgs, OcspArgs, PkiArgs};
pub use defaults::{
    DEFAULT_BASE_URL, DEFAULT_COMMON_NAME, DEFAULT_CONCURRENCY, DEFAULT_DURATION_SECS,
    DEFAULT_ENCODER, DEFAULT_MOUNT, DEFAULT_OCSP_RATE, DEFAULT_ROLE, TOKEN_ENV,
};
pub use types::{OutputFormat, PacingMode, PositiveU64, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
