
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use tempfile::tempdir;

use support_single::{pkiload_command, spawn_http_server_or_skip};

fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn json_report(output: &Output) -> Result<serde_json::Value, String> {
    if !output.status.success() {
        return Err(describe(output));
    }
    serde_json::from_slice(&output.stdout)
        .map_err(|err| format!("report is not JSON ({}): {}", err, describe(output)))
}

fn report_u64(report: &serde_json::Value, key: &str) -> Result<u64, String> {
    report
        .get(key)
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| format!("missing '{}' in {}", key, report))
}

fn write_fake_certs(dir: &Path) -> Result<(PathBuf, PathBuf), String> {
    let cert = dir.join("leaf.pem");
    let issuer = dir.join("issuer.pem");
    fs::write(&cert, "-----BEGIN CERTIFICATE-----\nleaf\n-----END CERTIFICATE-----\n")
        .map_err(|err| format!("write cert failed: {}", err))?;
    fs::write(&issuer, "-----BEGIN CERTIFICATE-----\nca\n-----END CERTIFICATE-----\n")
        .map_err(|err| format!("write issuer failed: {}", err))?;
    Ok((cert, issuer))
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf, String> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body))
        .map_err(|err| format!("write script failed: {}", err))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .map_err(|err| format!("chmod script failed: {}", err))?;
    Ok(path)
}

#[test]
fn e2e_issue_json_report() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(200, Duration::ZERO)? else {
        return Ok(());
    };

    let output = pkiload_command()?
        .args(["issue", "-u", url.as_str(), "-t", "1", "-c", "2", "--output-format", "json"])
        .env("VAULT_TOKEN", "s.e2e-token")
        .output()
        .map_err(|err| format!("run pkiload failed: {}", err))?;
    let report = json_report(&output)?;

    if report.get("workload").and_then(serde_json::Value::as_str) != Some("issue") {
        return Err(format!("unexpected workload in {}", report));
    }
    let successes = report_u64(&report, "successes")?;
    let total = report_u64(&report, "total")?;
    if successes == 0 || total != successes + report_u64(&report, "failures")? {
        return Err(format!("unexpected counts in {}", report));
    }
    if report.get("latency").is_none_or(serde_json::Value::is_null) {
        return Err(format!("expected latency summary in {}", report));
    }
    let url_field = report.get("url").and_then(serde_json::Value::as_str);
    if !url_field.is_some_and(|value| value.ends_with("/v1/pki/issue/default")) {
        return Err(format!("unexpected endpoint in {}", report));
    }
    Ok(())
}

#[test]
fn e2e_issue_without_token_fails() -> Result<(), String> {
    let output = pkiload_command()?
        .args(["issue", "-u", "http://127.0.0.1:9", "-t", "1"])
        .output()
        .map_err(|err| format!("run pkiload failed: {}", err))?;
    if output.status.success() {
        return Err(format!("expected failure without token\n{}", describe(&output)));
    }
    if !String::from_utf8_lossy(&output.stderr).contains("VAULT_TOKEN") {
        return Err(format!("error should name VAULT_TOKEN\n{}", describe(&output)));
    }
    if !output.stdout.is_empty() {
        return Err("no report may be printed before load starts".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_issue_all_failures_reports_no_data() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(500, Duration::ZERO)? else {
        return Ok(());
    };

    let output = pkiload_command()?
        .args(["issue", "-u", url.as_str(), "-t", "1", "-c", "2"])
        .env("VAULT_TOKEN", "s.e2e-token")
        .output()
        .map_err(|err| format!("run pkiload failed: {}", err))?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Successful: 0") || !stdout.contains("no data") {
        return Err(format!("expected an all-failure report\n{}", describe(&output)));
    }
    if !stdout.contains("500 x") {
        return Err(format!("expected status breakdown\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_config_file_fills_unset_options() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(200, Duration::ZERO)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config_path = dir.path().join("pkiload.toml");
    fs::write(
        &config_path,
        format!(
            "url = \"{}\"\nduration = 1\nconcurrency = 2\n\n[issue]\nrole = \"web\"\n",
            url
        ),
    )
    .map_err(|err| format!("write config failed: {}", err))?;
    let config_arg = config_path.to_string_lossy().into_owned();

    let output = pkiload_command()?
        .args(["issue", "--config", config_arg.as_str(), "--output-format", "json"])
        .env("VAULT_TOKEN", "s.e2e-token")
        .output()
        .map_err(|err| format!("run pkiload failed: {}", err))?;
    let report = json_report(&output)?;

    if report_u64(&report, "duration_secs")? != 1 || report_u64(&report, "concurrency")? != 2 {
        return Err(format!("config values not applied: {}", report));
    }
    let url_field = report.get("url").and_then(serde_json::Value::as_str);
    if !url_field.is_some_and(|value| value.ends_with("/v1/pki/issue/web")) {
        return Err(format!("config role not applied: {}", report));
    }
    Ok(())
}

#[test]
fn e2e_ocsp_missing_cert_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let (_cert, issuer) = write_fake_certs(dir.path())?;
    let issuer_arg = issuer.to_string_lossy().into_owned();

    let output = pkiload_command()?
        .args(["ocsp", "-u", "http://127.0.0.1:9", "--issuer", issuer_arg.as_str(), "-t", "1"])
        .output()
        .map_err(|err| format!("run pkiload failed: {}", err))?;
    if output.status.success() {
        return Err(format!("expected failure without --cert\n{}", describe(&output)));
    }
    if !String::from_utf8_lossy(&output.stderr).contains("--cert") {
        return Err(format!("error should name --cert\n{}", describe(&output)));
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn e2e_ocsp_with_external_encoder() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(200, Duration::ZERO)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let (cert, issuer) = write_fake_certs(dir.path())?;
    let encoder = write_script(
        dir.path(),
        "fake-openssl",
        r#"out=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "-reqout" ]; then out="$2"; shift; fi
  shift
done
[ -n "$out" ] || exit 2
printf 'ocsp-request' > "$out"
"#,
    )?;
    let cert_arg = cert.to_string_lossy().into_owned();
    let issuer_arg = issuer.to_string_lossy().into_owned();
    let encoder_arg = encoder.to_string_lossy().into_owned();

    let output = pkiload_command()?
        .args([
            "ocsp",
            "-u",
            url.as_str(),
            "--cert",
            cert_arg.as_str(),
            "--issuer",
            issuer_arg.as_str(),
            "--encoder",
            encoder_arg.as_str(),
            "--rate",
            "20",
            "-t",
            "1",
            "-c",
            "2",
            "--output-format",
            "json",
        ])
        .output()
        .map_err(|err| format!("run pkiload failed: {}", err))?;
    let report = json_report(&output)?;

    if report.get("workload").and_then(serde_json::Value::as_str) != Some("ocsp") {
        return Err(format!("unexpected workload in {}", report));
    }
    if report.get("target_rate").and_then(serde_json::Value::as_i64) != Some(20) {
        return Err(format!("unexpected target rate in {}", report));
    }
    let successes = report_u64(&report, "successes")?;
    if successes == 0 || successes > 30 {
        return Err(format!("unexpected paced successes in {}", report));
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn e2e_ocsp_encoder_failure_is_fatal() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let (cert, issuer) = write_fake_certs(dir.path())?;
    let encoder = write_script(dir.path(), "broken-openssl", "echo 'unable to load certificate' >&2\nexit 3\n")?;
    let cert_arg = cert.to_string_lossy().into_owned();
    let issuer_arg = issuer.to_string_lossy().into_owned();
    let encoder_arg = encoder.to_string_lossy().into_owned();

    let output = pkiload_command()?
        .args([
            "ocsp",
            "-u",
            "http://127.0.0.1:9",
            "--cert",
            cert_arg.as_str(),
            "--issuer",
            issuer_arg.as_str(),
            "--encoder",
            encoder_arg.as_str(),
            "-t",
            "1",
        ])
        .output()
        .map_err(|err| format!("run pkiload failed: {}", err))?;
    if output.status.success() {
        return Err(format!("expected encoder failure to be fatal\n{}", describe(&output)));
    }
    if !String::from_utf8_lossy(&output.stderr).contains("unable to load certificate") {
        return Err(format!("error should carry encoder stderr\n{}", describe(&output)));
    }
    if !output.stdout.is_empty() {
        return Err("no report may be printed after a setup failure".to_owned());
    }
    Ok(())
}
