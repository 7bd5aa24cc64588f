use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Request};
use serde::Serialize;
use url::Url;

use crate::domain::{RunConfig, WorkloadKind, WorkloadSpec};
use crate::error::HttpError;

const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";
const OCSP_REQUEST_TYPE: &str = "application/ocsp-request";
const OCSP_RESPONSE_TYPE: &str = "application/ocsp-response";
const JSON_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
struct IssueBody<'body> {
    common_name: &'body str,
}

/// Fully built request cloned for every attempt.
#[derive(Debug)]
pub(crate) struct RequestTemplate {
    request: Request,
}

impl RequestTemplate {
    pub(crate) fn instantiate(&self) -> Result<Request, HttpError> {
        self.request
            .try_clone()
            .ok_or(HttpError::CloneRequestFailed)
    }

    #[cfg(test)]
    pub(crate) const fn request(&self) -> &Request {
        &self.request
    }
}

/// Builds the endpoint for `kind` under `base`.
///
/// Issuance posts to `<base>/v1/<mount>/issue/<role>`, status queries to
/// `<base>/v1/<mount>/ocsp`. A multi-segment mount (`pki/int`) is kept as-is.
///
/// # Errors
///
/// Returns an error when `base` cannot carry a path.
pub fn endpoint_url(
    base: &Url,
    mount: &str,
    kind: WorkloadKind,
    role: &str,
) -> Result<Url, HttpError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| HttpError::UrlCannotBeBase {
                url: base.to_string(),
            })?;
        segments.pop_if_empty().push("v1");
        segments.extend(mount.split('/').filter(|segment| !segment.is_empty()));
        match kind {
            WorkloadKind::Issue => {
                segments.push("issue").push(role);
            }
            WorkloadKind::Ocsp => {
                segments.push("ocsp");
            }
        }
    }
    Ok(url)
}

/// Parses the user-supplied base URL.
///
/// # Errors
///
/// Returns an error when `raw` is not an absolute URL.
pub fn parse_base_url(raw: &str) -> Result<Url, HttpError> {
    Url::parse(raw.trim()).map_err(|err| HttpError::InvalidUrl {
        url: raw.to_owned(),
        source: err,
    })
}

pub(crate) fn build_request_template(
    client: &Client,
    config: &RunConfig,
) -> Result<RequestTemplate, HttpError> {
    let builder = client.post(config.endpoint.clone());
    let builder = match &config.workload {
        WorkloadSpec::Issue {
            common_name,
            credential,
        } => {
            let mut token = HeaderValue::from_str(credential.expose()).map_err(|err| {
                HttpError::InvalidHeaderValue {
                    name: VAULT_TOKEN_HEADER,
                    source: err,
                }
            })?;
            token.set_sensitive(true);
            builder
                .header(VAULT_TOKEN_HEADER, token)
                .header(ACCEPT, JSON_TYPE)
                .json(&IssueBody { common_name })
        }
        WorkloadSpec::Ocsp { payload, .. } => builder
            .header(CONTENT_TYPE, OCSP_REQUEST_TYPE)
            .header(ACCEPT, OCSP_RESPONSE_TYPE)
            .body(payload.clone()),
    };

    let request = builder
        .build()
        .map_err(|err| HttpError::BuildRequestFailed { source: err })?;
    Ok(RequestTemplate { request })
}
