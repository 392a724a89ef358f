use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.user_message())]
    Core(#[from] nodepad_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Login failed: {0}")]
    LoginFailed(String),
    #[error("Not signed in. Run `nodepad login --username <NAME> --password <PASSWORD>` first.")]
    NotSignedIn,
    #[error(
        "API URL is not configured. Pass --api-url, set NODEPAD_API_BASE_URL, or run `nodepad config init --api-url <URL>`."
    )]
    ApiNotConfigured,
}

impl CliError {
    /// Wrap a core error raised while signing in, where a 401 means bad
    /// credentials rather than an expired session.
    pub fn from_login(error: nodepad_core::Error) -> Self {
        match error {
            nodepad_core::Error::AuthRejected(message) => Self::LoginFailed(message),
            other => Self::Core(other),
        }
    }
}
