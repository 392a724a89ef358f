//! nodepad-core - Core library for Nodepad
//!
//! Client-side session management and note synchronization against the
//! Nodepad REST API. The HTTP transport, credential storage and navigation
//! are collaborators behind traits so every interface (CLI, tests, future
//! UIs) can plug in its own.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notes;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::{
    CredentialStore, CredentialToken, MemoryCredentialStore, NavigationSink, Route, Session,
    SessionManager, SessionSnapshot,
};
pub use config::ApiConfig;
pub use error::{Error, Result};
pub use models::{Note, NoteFields, NoteId, User};
pub use notes::{Composer, DeleteConfirmation, DeleteOutcome, NoteStore, Submission, SyncState};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport, TransportError};
