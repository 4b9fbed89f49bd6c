//! Request and response bodies of the Vault ACL policy API

use serde::{Deserialize, Serialize};

/// Envelope around the `data` field of a Vault response
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// `data` of a policy listing
#[derive(Debug, Default, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub keys: Vec<String>,
}

/// `data` of a policy read
#[derive(Debug, Deserialize)]
pub struct PolicyData {
    #[serde(default)]
    pub name: Option<String>,
    pub policy: String,
}

/// Body of a policy write
#[derive(Debug, Serialize)]
pub struct PolicyBody<'a> {
    pub policy: &'a str,
}

/// Body Vault sends with error statuses
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ErrorResponse {
    /// Human-readable message for an error body, falling back to the raw text
    pub fn message(body: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
            _ if body.trim().is_empty() => "no response body".to_string(),
            _ => body.trim().to_string(),
        }
    }
}
