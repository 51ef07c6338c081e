//! Error types for the dispatcher.

use thiserror::Error;

/// Errors raised while resolving, building or dispatching a request.
///
/// [`RequestDispatcher::send`](crate::RequestDispatcher::send) never returns
/// these directly; they are folded into a [`SendResult`](crate::SendResult)
/// whose `status` comes from [`DispatchError::status_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No descriptor is registered under the requested name.
    #[error("type [{0}] is not in apis")]
    UnknownEndpoint(String),
    /// The dispatcher has no transport to send through.
    #[error("transport is not defined")]
    TransportUnavailable,
    /// The transport failed before producing a response.
    #[error("{0}")]
    Transport(String),
    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// Unrecognized HTTP method name.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
    /// The response body could not be read.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
    /// Configuration text could not be parsed or applied.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DispatchError {
    /// The `SendResult::status` this error is reported with.
    ///
    /// Transport failures map to `-1`; everything else is a local error (`0`).
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Transport(_) => -1,
            _ => 0,
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<url::ParseError> for DispatchError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<toml::de::Error> for DispatchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for DispatchError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for DispatchError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// A specialized Result type for dispatcher operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(DispatchError::Transport("Failed to fetch".into()).status_code(), -1);
        assert_eq!(DispatchError::TransportUnavailable.status_code(), 0);
        assert_eq!(DispatchError::UnknownEndpoint("x".into()).status_code(), 0);
        assert_eq!(DispatchError::Json("eof".into()).status_code(), 0);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DispatchError::UnknownEndpoint("missing".into()).to_string(),
            "type [missing] is not in apis"
        );
        assert_eq!(
            DispatchError::Transport("Failed to fetch".into()).to_string(),
            "Failed to fetch"
        );
    }
}
