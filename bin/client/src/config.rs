//! Client configuration

use crate::constants::{DEFAULT_SERVER_URL, SERVER_URL_ENV};
use anyhow::Result;
use common::ErrorResponse;
use reqwest::blocking::Response;

/// Resolve the server URL: explicit flag, then environment, then default
pub fn resolve_server(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var(SERVER_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Turn a non-success response into an error carrying the server's message
pub fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| format!("{} ({})", e.message, e.code))
        .unwrap_or(text);
    anyhow::bail!("{} failed: {} - {}", action, status, message)
}
