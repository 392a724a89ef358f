//! Error types for nodepad-core

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias using nodepad-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nodepad-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before anything was sent
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The server declined the credentials or the bearer token (401/403)
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// The referenced note no longer exists on the server
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Any other non-success status, carrying the server's reason
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network unreachable or request could not be sent
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// An authenticated operation was attempted without a session
    #[error("Not signed in")]
    NotAuthenticated,

    /// The session changed while the request was in flight; the response was dropped
    #[error("Session changed while the request was in flight")]
    SessionChanged,

    /// Credential store error
    #[error("Credential storage error: {0}")]
    CredentialStore(String),

    /// The server applied a mutation but the follow-up refresh failed
    #[error("Change saved, but refreshing notes failed: {0}")]
    RefreshFailed(#[source] Box<Error>),
}

impl Error {
    /// True when the session has been (or must be) torn down.
    pub fn is_session_expired(&self) -> bool {
        match self {
            Self::AuthRejected(_) | Self::NotAuthenticated => true,
            Self::RefreshFailed(inner) => inner.is_session_expired(),
            _ => false,
        }
    }

    /// True when re-invoking the same operation may succeed.
    ///
    /// Never true for [`Error::RefreshFailed`]: the change is already on the
    /// server and sending it again would apply it twice.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::MalformedResponse(_) | Self::NotFound(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::SessionChanged => true,
            Self::Validation(_)
            | Self::AuthRejected(_)
            | Self::NotAuthenticated
            | Self::CredentialStore(_)
            | Self::RefreshFailed(_) => false,
        }
    }

    /// True when the server accepted the mutation despite this error.
    pub const fn was_applied(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }

    /// Message suitable for showing to the person using the app.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::AuthRejected(_) | Self::NotAuthenticated => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::NotFound(_) => {
                "That note no longer exists. The list has been refreshed.".to_string()
            }
            Self::Api { status, message } if *status < 500 => message.clone(),
            Self::SessionChanged => {
                "You signed in or out while the request was running. Please try again."
                    .to_string()
            }
            Self::CredentialStore(message) => {
                format!("Could not access saved credentials: {message}")
            }
            Self::RefreshFailed(inner) if inner.is_session_expired() => {
                "Your change was saved, but your session has expired. Please log in again."
                    .to_string()
            }
            Self::RefreshFailed(_) => {
                "Your change was saved, but the note list could not be reloaded.".to_string()
            }
            Self::Api { .. } | Self::Transport(_) | Self::MalformedResponse(_) => {
                "Network or server error. Please try again.".to_string()
            }
        }
    }
}
