//! Local note collection kept in step with the server.
//!
//! Every mutation is followed by a full `GET /notes`; the local collection
//! is never patched in place, so it can only ever hold what the server
//! last returned.

mod draft;

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::{CredentialStore, SessionManager};
use crate::models::{Note, NoteFields, NoteId};
use crate::transport::ApiRequest;
use crate::{Error, Result};

pub use draft::{Composer, Draft, Submission};

const NOTES_PATH: &str = "/notes";

/// Progress of the most recent refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    Synced,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Asked before a delete request goes out. `note` is the local copy, if any.
pub trait DeleteConfirmation {
    fn confirm_delete(&self, id: &NoteId, note: Option<&Note>) -> bool;
}

impl<F> DeleteConfirmation for F
where
    F: Fn(&NoteId, Option<&Note>) -> bool,
{
    fn confirm_delete(&self, id: &NoteId, note: Option<&Note>) -> bool {
        self(id, note)
    }
}

pub struct NoteStore<S: CredentialStore> {
    session: Arc<SessionManager<S>>,
    notes: watch::Sender<Vec<Note>>,
    sync_state: watch::Sender<SyncState>,
}

impl<S: CredentialStore> NoteStore<S> {
    pub fn new(session: Arc<SessionManager<S>>) -> Self {
        let (notes, _) = watch::channel(Vec::new());
        let (sync_state, _) = watch::channel(SyncState::Idle);
        Self {
            session,
            notes,
            sync_state,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager<S>> {
        &self.session
    }

    /// Snapshot of the collection in server order.
    pub fn notes(&self) -> Vec<Note> {
        self.notes.borrow().clone()
    }

    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.notes.borrow().iter().find(|note| &note.id == id).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Note>> {
        self.notes.subscribe()
    }

    pub fn sync_state(&self) -> SyncState {
        *self.sync_state.borrow()
    }

    /// Drop the cached collection, e.g. when the view is torn down.
    pub fn clear(&self) {
        self.notes.send_replace(Vec::new());
        self.sync_state.send_replace(SyncState::Idle);
    }

    /// Replace the local collection with the server's.
    ///
    /// The previous collection stays visible until the new one has arrived,
    /// and stays untouched if the fetch fails.
    pub async fn refresh(&self) -> Result<()> {
        self.sync_state.send_replace(SyncState::Syncing);
        let result = self.fetch_all().await;

        match result {
            Ok(notes) => {
                let count = notes.len();
                self.notes.send_if_modified(|current| {
                    if *current == notes {
                        false
                    } else {
                        *current = notes;
                        true
                    }
                });
                self.sync_state.send_replace(SyncState::Synced);
                tracing::debug!(count, "Notes refreshed");
                Ok(())
            }
            Err(Error::SessionChanged) => {
                self.sync_state.send_replace(SyncState::Idle);
                Err(Error::SessionChanged)
            }
            Err(error) => {
                tracing::warn!("Failed to refresh notes: {}", error);
                self.sync_state.send_replace(SyncState::Error);
                Err(error)
            }
        }
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<()> {
        let fields = NoteFields::new(title, content).validated()?;
        let request = ApiRequest::post(NOTES_PATH).with_json(&fields)?;
        self.session.execute(request).await?;
        tracing::info!("Created note");
        self.refresh_after_mutation().await
    }

    /// Full replacement of an existing note's title and content.
    pub async fn update(&self, id: &NoteId, title: &str, content: &str) -> Result<()> {
        let fields = NoteFields::new(title, content).validated()?;
        let request = ApiRequest::put(note_path(id)).with_json(&fields)?;
        match self.session.execute(request).await {
            Ok(_) => {
                tracing::info!(note_id = %id, "Updated note");
                self.refresh_after_mutation().await
            }
            Err(Error::NotFound(message)) => {
                self.refresh_after_missing(id).await;
                Err(Error::NotFound(message))
            }
            Err(error) => Err(error),
        }
    }

    pub async fn delete(
        &self,
        id: &NoteId,
        confirmation: &impl DeleteConfirmation,
    ) -> Result<DeleteOutcome> {
        let local = self.get(id);
        if !confirmation.confirm_delete(id, local.as_ref()) {
            tracing::debug!(note_id = %id, "Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.session.execute(ApiRequest::delete(note_path(id))).await {
            Ok(_) => {
                tracing::info!(note_id = %id, "Deleted note");
                self.refresh_after_mutation().await?;
                Ok(DeleteOutcome::Deleted)
            }
            Err(Error::NotFound(message)) => {
                self.refresh_after_missing(id).await;
                Err(Error::NotFound(message))
            }
            Err(error) => Err(error),
        }
    }

    /// Send whatever a [`Composer`] handed out.
    pub async fn submit(&self, submission: &Submission) -> Result<()> {
        match submission {
            Submission::Create(fields) => self.create(&fields.title, &fields.content).await,
            Submission::Update { id, fields } => {
                self.update(id, &fields.title, &fields.content).await
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Note>> {
        let response = self.session.execute(ApiRequest::get(NOTES_PATH)).await?;
        response.decode()
    }

    /// The mutation already landed; a failed refresh must not read as a
    /// failed mutation, or the caller would resend it.
    async fn refresh_after_mutation(&self) -> Result<()> {
        self.refresh()
            .await
            .map_err(|error| Error::RefreshFailed(Box::new(error)))
    }

    async fn refresh_after_missing(&self, id: &NoteId) {
        tracing::warn!(note_id = %id, "Note no longer exists on the server; refreshing");
        if let Err(error) = self.refresh().await {
            tracing::warn!("Refresh after missing note failed: {}", error);
        }
    }
}

fn note_path(id: &NoteId) -> String {
    format!("{NOTES_PATH}/{}", urlencoding::encode(id.as_str()))
}
