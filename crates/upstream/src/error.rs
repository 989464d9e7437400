//! Errors from the upstream HTTP layer.

/// Errors from calling a third-party service.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("{service} API error ({status}): {body}")]
    ApiError {
        service: &'static str,
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    /// The provider has no data for the requested location.
    #[error("{service} does not cover this location")]
    NotCovered { service: &'static str },

    /// The provider needs an API key that was not configured.
    #[error("{service} requires an API key")]
    MissingKey { service: &'static str },

    /// Every configured source failed; one message per attempt.
    #[error("All weather sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),
}

impl UpstreamError {
    pub(crate) fn parse(service: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            service,
            message: message.into(),
        }
    }
}
