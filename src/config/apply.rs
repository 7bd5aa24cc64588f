use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{Command, IssueArgs, OcspArgs, PkiArgs, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, IssueConfig, OcspConfig};

/// Fills options the user left unset with values from the config file.
///
/// An option counts as set when it came from the command line or its
/// environment variable.
///
/// # Errors
///
/// Returns an error when a numeric config value is out of range.
pub fn apply_config(
    args: &mut PkiArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_explicit(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = url;
    }

    if !is_explicit(matches, "mount")
        && let Some(mount) = config.mount.clone()
    {
        args.mount = mount;
    }

    if !is_explicit(matches, "duration")
        && let Some(duration) = config.duration
    {
        args.duration = ensure_positive_u64(duration, "duration")?;
    }

    if !is_explicit(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
    }

    if !is_explicit(matches, "timeout_ms")
        && let Some(timeout_ms) = config.timeout_ms
    {
        args.timeout_ms = Some(ensure_positive_u64(timeout_ms, "timeout_ms")?);
    }

    if !is_explicit(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    match &mut args.command {
        Command::Issue(issue) => {
            if let (Some(section), Some(sub_matches)) =
                (config.issue.as_ref(), matches.subcommand_matches("issue"))
            {
                apply_issue_config(issue, sub_matches, section);
            }
        }
        Command::Ocsp(ocsp) => {
            if let (Some(section), Some(sub_matches)) =
                (config.ocsp.as_ref(), matches.subcommand_matches("ocsp"))
            {
                apply_ocsp_config(ocsp, sub_matches, section);
            }
        }
    }
    Ok(())
}

fn apply_issue_config(args: &mut IssueArgs, matches: &ArgMatches, config: &IssueConfig) {
    if !is_explicit(matches, "role")
        && let Some(role) = config.role.clone()
    {
        args.role = role;
    }

    if !is_explicit(matches, "common_name")
        && let Some(common_name) = config.common_name.clone()
    {
        args.common_name = common_name;
    }
}

fn apply_ocsp_config(args: &mut OcspArgs, matches: &ArgMatches, config: &OcspConfig) {
    if !is_explicit(matches, "cert")
        && let Some(cert) = config.cert.clone()
    {
        args.cert = Some(cert);
    }

    if !is_explicit(matches, "issuer")
        && let Some(issuer) = config.issuer.clone()
    {
        args.issuer = Some(issuer);
    }

    if !is_explicit(matches, "rate")
        && let Some(rate) = config.rate
    {
        args.rate = rate;
    }

    if !is_explicit(matches, "pacing")
        && let Some(pacing) = config.pacing
    {
        args.pacing = pacing;
    }

    if !is_explicit(matches, "encoder")
        && let Some(encoder) = config.encoder.clone()
    {
        args.encoder = encoder;
    }
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn ensure_positive_u64(value: u64, field: &'static str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}
