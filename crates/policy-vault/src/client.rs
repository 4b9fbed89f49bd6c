//! Blocking Vault client for the ACL policy endpoints

use std::fs;
use std::path::Path;
use std::time::Duration;

use policy_core::{EndpointConfig, PolicyName, PolicyRuleset, PolicyStore, StoreError, StoreResult};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Certificate;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::{DataResponse, ErrorResponse, ListData, PolicyBody, PolicyData};
use crate::{Error, Result};

/// Header carrying the Vault token
pub const TOKEN_HEADER: &str = "X-Vault-Token";

/// Timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Path segments of the ACL policy endpoint below the address
const ACL_SEGMENTS: [&str; 4] = ["v1", "sys", "policies", "acl"];

/// Policy store backed by one Vault server.
///
/// # Invariants
/// - The base address is an absolute `http` or `https` URL.
/// - Every request carries the configured token, even when it is empty.
#[derive(Debug, Clone)]
pub struct VaultClient {
    /// HTTP client, with the custom CA installed when one is configured
    http: Client,
    /// Address requests are resolved against
    base: Url,
    /// Token sent in [`TOKEN_HEADER`]
    token: String,
}

impl VaultClient {
    /// Build a client for one endpoint
    ///
    /// # Errors
    ///
    /// - [`Error::MissingAddress`] if no address is configured
    /// - [`Error::InvalidAddress`] if the address is not an `http(s)` URL
    /// - [`Error::CaCertRead`] / [`Error::CaCertInvalid`] if a configured CA
    ///   certificate cannot be used
    /// - [`Error::Client`] if the HTTP client cannot be constructed
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let base = parse_address(config.address())?;

        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(path) = config.ca_cert_path() {
            let certificates = load_ca_bundle(path)?;
            debug!(path = %path.display(), count = certificates.len(), "Loaded CA certificates");
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        Ok(Self {
            http: builder.build()?,
            base,
            token: config.token().to_string(),
        })
    }

    /// Base address of the Vault server
    pub fn address(&self) -> &Url {
        &self.base
    }

    /// URL of the ACL endpoint, or of one policy below it
    fn acl_url(&self, policy: Option<&PolicyName>) -> Url {
        let mut url = self.base.clone();
        // parse_address guarantees a base URL, so path_segments_mut succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(ACL_SEGMENTS);
            if let Some(name) = policy {
                segments.push(name.as_str());
            }
        }
        url
    }

    fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        request
            .header(TOKEN_HEADER, &self.token)
            .send()
            .map_err(|e| StoreError::Transport {
                message: error_chain(&e),
            })
    }
}

impl PolicyStore for VaultClient {
    fn list_policies(&self) -> StoreResult<Vec<PolicyName>> {
        let mut url = self.acl_url(None);
        url.query_pairs_mut().append_pair("list", "true");
        debug!(url = %url, "Listing policies");

        // A Vault listing always holds `root`, so 404 means a misrouted address
        let response = self.send(self.http.get(url))?;
        let listing: DataResponse<ListData> = read_json(check_status(response)?)?;

        listing
            .data
            .keys
            .into_iter()
            .map(|key| {
                PolicyName::new(key).map_err(|e| StoreError::Decode {
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn get_policy(&self, name: &PolicyName) -> StoreResult<PolicyRuleset> {
        let url = self.acl_url(Some(name));
        debug!(url = %url, "Reading policy");

        let response = self.send(self.http.get(url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }
        let policy: DataResponse<PolicyData> = read_json(check_status(response)?)?;
        Ok(PolicyRuleset::from(policy.data.policy))
    }

    fn put_policy(&self, name: &PolicyName, rules: &PolicyRuleset) -> StoreResult<()> {
        let url = self.acl_url(Some(name));
        debug!(url = %url, "Writing policy");

        let body = PolicyBody {
            policy: rules.as_str(),
        };
        let response = self.send(self.http.put(url).json(&body))?;
        check_status(response)?;
        Ok(())
    }
}

/// Read every PEM certificate in a CA bundle file
fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>> {
    let pem = fs::read(path).map_err(|source| Error::CaCertRead {
        path: path.to_path_buf(),
        source,
    })?;
    let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| Error::CaCertInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if certificates.is_empty() {
        return Err(Error::CaCertInvalid {
            path: path.to_path_buf(),
            reason: "no PEM certificates found".to_string(),
        });
    }
    Ok(certificates)
}

/// Parse and validate a configured address
fn parse_address(address: &str) -> Result<Url> {
    let address = address.trim();
    if address.is_empty() {
        return Err(Error::MissingAddress);
    }
    let invalid = |reason: String| Error::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(invalid(format!("unsupported scheme '{scheme}'"))),
    }
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Map non-success statuses to store errors
fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_else(|e| error_chain(&e));
    let message = ErrorResponse::message(&body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(StoreError::Unauthorized { message })
        }
        _ => Err(StoreError::Status {
            status: status.as_u16(),
            message,
        }),
    }
}

fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let body = response.text().map_err(|e| StoreError::Transport {
        message: error_chain(&e),
    })?;
    serde_json::from_str(&body).map_err(|e| StoreError::Decode {
        message: e.to_string(),
    })
}

/// Render an error with all of its sources
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
