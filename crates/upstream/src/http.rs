//! Shared reqwest helpers.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;

/// Build the HTTP client shared by every upstream service.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, UpstreamError> {
    Ok(reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .build()?)
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`UpstreamError::ApiError`] with the status
/// and body text on failure.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(UpstreamError::ApiError {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
///
/// The body is decoded as text first so the charset declared in
/// `Content-Type` is honoured (AEMET answers in ISO-8859-15).
pub(crate) async fn parse_response<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let response = ensure_success(service, response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| UpstreamError::parse(service, e.to_string()))
}

pub(crate) fn parse_datetime(
    service: &'static str,
    value: &str,
    format: &str,
) -> Result<NaiveDateTime, UpstreamError> {
    NaiveDateTime::parse_from_str(value, format)
        .map_err(|e| UpstreamError::parse(service, format!("bad timestamp {value:?}: {e}")))
}

/// Element `i` of a column that may contain nulls.
pub(crate) fn at<T: Copy>(column: &[Option<T>], i: usize) -> Option<T> {
    column.get(i).copied().flatten()
}
