//! Error types for tokengate.

use thiserror::Error;

/// Primary error type for all proxy operations.
///
/// The routing layer that owns the HTTP surface is expected to translate
/// these into status codes: [`OAuthError::Api`] passes its status through,
/// [`OAuthError::InvalidArgument`] maps to 400, and
/// [`OAuthError::Configuration`] maps to 500.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Integrator misconfiguration: a required collaborator is missing or
    /// invalid. Never retryable; always a deploy-time bug.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller passed malformed input (empty scopes, empty tokens, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The authorization server responded with an error status.
    #[error("API error (status {status}): {reason}")]
    Api {
        status: u16,
        reason: String,
        body: String,
    },

    /// CSRF state verification failed; the current flow must be restarted.
    #[error("State verification failed: {0}")]
    StateVerification(String),

    /// A token expected in secure storage was not there: the flow has not
    /// started yet, the entry expired, or it was already cleaned up.
    #[error("{0}")]
    MissingToken(String),

    /// The authorization server returned 2xx but the body could not be
    /// parsed into the expected model.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A cipher operation failed. The message never includes plaintext or
    /// key material.
    #[error("Crypto failure: {0}")]
    Crypto(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl OAuthError {
    /// Create an API error from an upstream response.
    pub fn api(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }

    /// Whether retrying the same call could plausibly succeed. Only upstream
    /// server errors and transport failures qualify; everything else is a
    /// caller or integrator bug.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, OAuthError>;
