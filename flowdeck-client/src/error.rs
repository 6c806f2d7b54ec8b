//! Client error types.

use flowdeck_engine::error::EngineError;
use thiserror::Error;

/// Errors that can occur at the session boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An outbound action was rejected by the backend. Local state is
    /// untouched: the view only changes when the confirming stream event
    /// arrives.
    #[error("request failed: HTTP {status}: {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The stream transport went away. Not fatal; the session drops to
    /// syncing and recovers on the next snapshot.
    #[error("transport dropped")]
    TransportDropped,

    /// Network error during an outbound action.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An inbound envelope or payload failed to decode.
    #[error("malformed message: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid base URL for the action client.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The engine rejected a mutation or a filter expression.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ClientError {
    /// Creates a new request failure from a status and body.
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }
}
