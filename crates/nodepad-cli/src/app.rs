//! Wiring between the CLI and the core session/note components.

use std::sync::Arc;

use nodepad_core::{
    ApiConfig, HttpTransport, NavigationSink, NoteStore, ReqwestTransport, Route, SessionManager,
    User,
};

use crate::credentials::KeyringCredentialStore;
use crate::error::CliError;

/// Prints where the user should go next; a terminal has no views to switch.
#[derive(Debug, Default)]
pub struct TerminalNavigation;

impl NavigationSink for TerminalNavigation {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => {
                eprintln!("Sign in with `nodepad login --username <NAME> --password <PASSWORD>`.");
            }
            Route::Home => tracing::debug!("Session ready"),
        }
    }
}

pub struct App {
    notes: NoteStore<KeyringCredentialStore>,
}

impl App {
    pub fn connect(config: ApiConfig) -> Result<Self, CliError> {
        let transport = ReqwestTransport::new(config).map_err(nodepad_core::Error::from)?;
        Ok(Self::with_parts(
            Arc::new(transport),
            KeyringCredentialStore::new(),
            Arc::new(TerminalNavigation),
        ))
    }

    pub fn with_parts(
        transport: Arc<dyn HttpTransport>,
        store: KeyringCredentialStore,
        navigation: Arc<dyn NavigationSink>,
    ) -> Self {
        let session = SessionManager::new(transport, store, navigation);
        Self {
            notes: NoteStore::new(Arc::new(session)),
        }
    }

    pub fn session(&self) -> &SessionManager<KeyringCredentialStore> {
        self.notes.session()
    }

    pub const fn notes(&self) -> &NoteStore<KeyringCredentialStore> {
        &self.notes
    }

    /// Restore the persisted session, failing when nobody is signed in.
    pub async fn require_session(&self) -> Result<User, CliError> {
        self.session().restore().await.ok_or(CliError::NotSignedIn)
    }
}
