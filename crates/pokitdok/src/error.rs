//! Error types for the PokitDok client
//!
//! Every fallible operation returns [`ApiError`]. The variants mirror the three
//! ways a call can fail (authentication, request, unsupported endpoint) plus
//! configuration problems caught before any network traffic happens.

use crate::endpoints::Endpoint;
use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// Token acquisition failed (endpoint unreachable, non-success status or bad token body)
    #[error("Authentication failed: {0}. Check the client ID and secret and that the token endpoint is reachable.")]
    Authentication(String),

    /// An implemented endpoint could not be called or returned an unusable response
    #[error("Request to '{endpoint}' failed: {message}")]
    Request {
        endpoint: Endpoint,
        /// HTTP status, when a response was received at all
        status: Option<StatusCode>,
        message: String,
    },

    /// The endpoint is not available in the remote API
    #[error("The PokitDok API does not currently support the '{0}' endpoint.")]
    NotSupported(Endpoint),

    /// Client configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a request error
    pub fn request(endpoint: Endpoint, status: Option<StatusCode>, msg: impl Into<String>) -> Self {
        Self::Request {
            endpoint,
            status,
            message: msg.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    /// HTTP status carried by a request error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }
}

/// Render an error together with its `source()` chain.
///
/// reqwest and oauth2 keep the useful part of a failure (connection refused,
/// DNS, decode position) in nested sources, so the top-level message alone is
/// rarely actionable.
pub(crate) fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(ApiError::authentication("denied").is_authentication());
        assert!(ApiError::request(Endpoint::Payers, None, "boom").is_request());
        assert!(ApiError::NotSupported(Endpoint::Deductible).is_not_supported());
        assert!(!ApiError::config("bad").is_request());
    }

    #[test]
    fn test_status_only_on_request_errors() {
        let err = ApiError::request(Endpoint::Payers, Some(StatusCode::BAD_GATEWAY), "upstream");
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(ApiError::NotSupported(Endpoint::CashPrices).status(), None);
    }

    #[test]
    fn test_display_names_endpoint() {
        let err = ApiError::NotSupported(Endpoint::CashPrices);
        assert_eq!(
            err.to_string(),
            "The PokitDok API does not currently support the 'cash_prices' endpoint."
        );

        let err = ApiError::request(Endpoint::InsurancePrices, None, "connection refused");
        assert_eq!(
            err.to_string(),
            "Request to 'insurance_prices' failed: connection refused"
        );
    }

    #[test]
    fn test_describe_walks_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let outer = std::io::Error::other(inner);
        assert_eq!(describe(&outer), "refused");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(describe(&json_err).contains("EOF"));
    }
}
