//! Error types for the authorization crate.

use thiserror::Error;

/// Errors raised by the policies client and its remote collaborators.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The targeted entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A required parameter is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote service rejected the credentials.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// Any other non-success response.
    #[error("remote service returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] cloudctl_core::ConfigError),
}

impl AuthzError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
