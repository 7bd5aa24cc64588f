use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use tracing::error;

use pkiload::app::{print_report, run_load};
use pkiload::args::{Command, IssueArgs, OcspArgs, PkiArgs, PositiveU64, TOKEN_ENV};
use pkiload::config::{apply_config, load_config};
use pkiload::domain::{Credential, RateTarget, RunConfig, WorkloadKind, WorkloadSpec};
use pkiload::error::{AppError, AppResult, ValidationError};
use pkiload::http::{endpoint_url, parse_base_url};
use pkiload::payload::{OpensslOcspEncoder, prepare_ocsp_payload};
use url::Url;

/// Settings shared by both workloads, resolved before the workload itself.
struct RunSettings {
    base: Url,
    mount: String,
    duration: Duration,
    concurrency: usize,
    timeout_ms: Option<PositiveU64>,
}

pub(crate) fn run() -> AppResult<()> {
    let matches = PkiArgs::command().get_matches();
    let mut args = PkiArgs::from_arg_matches(&matches)?;

    crate::logger::init_logging(args.verbose, args.no_color);

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: PkiArgs) -> AppResult<()> {
    let output_format = args.output_format;
    let config = build_run_config(args).await?;
    let outcome = run_load(&config).await?;
    print_report(&outcome.report, output_format)
}

async fn build_run_config(args: PkiArgs) -> AppResult<RunConfig> {
    let mount = args.mount.trim_matches('/');
    if mount.is_empty() {
        error!("Mount path is empty.");
        return Err(AppError::validation(ValidationError::EmptyMount));
    }
    let settings = RunSettings {
        base: parse_base_url(&args.url)?,
        mount: mount.to_owned(),
        duration: Duration::from_secs(args.duration.get()),
        concurrency: args.concurrency.get(),
        timeout_ms: args.timeout_ms,
    };

    match args.command {
        Command::Issue(issue) => issue_run_config(&settings, issue),
        Command::Ocsp(ocsp) => ocsp_run_config(&settings, ocsp).await,
    }
}

fn resolve_timeout(timeout_ms: Option<PositiveU64>, kind: WorkloadKind) -> Duration {
    timeout_ms.map_or_else(
        || kind.default_timeout(),
        |value| Duration::from_millis(value.get()),
    )
}

fn issue_run_config(settings: &RunSettings, issue: IssueArgs) -> AppResult<RunConfig> {
    let Some(token) = issue.token.filter(|token| !token.trim().is_empty()) else {
        error!("Missing credential (set --token or {}).", TOKEN_ENV);
        return Err(AppError::validation(ValidationError::MissingToken {
            var: TOKEN_ENV,
        }));
    };
    let endpoint = endpoint_url(
        &settings.base,
        &settings.mount,
        WorkloadKind::Issue,
        &issue.role,
    )?;

    Ok(RunConfig {
        endpoint,
        duration: settings.duration,
        concurrency: settings.concurrency,
        timeout: resolve_timeout(settings.timeout_ms, WorkloadKind::Issue),
        workload: WorkloadSpec::Issue {
            common_name: issue.common_name,
            credential: Credential::new(token),
        },
    })
}

async fn ocsp_run_config(settings: &RunSettings, ocsp: OcspArgs) -> AppResult<RunConfig> {
    let Some(cert) = ocsp.cert else {
        error!("Missing subject certificate (set --cert or [ocsp] cert).");
        return Err(AppError::validation(ValidationError::MissingPath { flag: "--cert" }));
    };
    let Some(issuer) = ocsp.issuer else {
        error!("Missing issuer certificate (set --issuer or [ocsp] issuer).");
        return Err(AppError::validation(ValidationError::MissingPath { flag: "--issuer" }));
    };
    let endpoint = endpoint_url(&settings.base, &settings.mount, WorkloadKind::Ocsp, "")?;

    let timeout = resolve_timeout(settings.timeout_ms, WorkloadKind::Ocsp);
    let encoder = OpensslOcspEncoder::new(ocsp.encoder, timeout);
    let payload = prepare_ocsp_payload(&encoder, &cert, &issuer, &endpoint).await?;

    Ok(RunConfig {
        endpoint,
        duration: settings.duration,
        concurrency: settings.concurrency,
        timeout,
        workload: WorkloadSpec::Ocsp {
            payload,
            rate: RateTarget {
                per_second: ocsp.rate,
                pacing: ocsp.pacing,
            },
        },
    })
}
