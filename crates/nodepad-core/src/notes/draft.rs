//! UI-held draft state for the create/edit form.
//!
//! The core never stores a [`Composer`]; the view owns one and uses it to
//! keep "creating" and "editing" apart and to refuse a second submission
//! while the first one is outstanding.

use crate::models::{Note, NoteFields, NoteId};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    /// A note that has no id yet
    Creating(NoteFields),
    /// Changes to an existing note
    Editing { id: NoteId, fields: NoteFields },
}

impl Default for Draft {
    fn default() -> Self {
        Self::Creating(NoteFields::default())
    }
}

impl Draft {
    pub const fn fields(&self) -> &NoteFields {
        match self {
            Self::Creating(fields) | Self::Editing { fields, .. } => fields,
        }
    }

    fn fields_mut(&mut self) -> &mut NoteFields {
        match self {
            Self::Creating(fields) | Self::Editing { fields, .. } => fields,
        }
    }

    pub const fn editing_id(&self) -> Option<&NoteId> {
        match self {
            Self::Creating(_) => None,
            Self::Editing { id, .. } => Some(id),
        }
    }
}

/// What a [`Composer`] hands to [`NoteStore::submit`](super::NoteStore::submit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(NoteFields),
    Update { id: NoteId, fields: NoteFields },
}

#[derive(Debug, Default)]
pub struct Composer {
    draft: Draft,
    pending: Option<Submission>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    pub const fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Start editing `note`. Refused while a submission is outstanding.
    pub fn edit(&mut self, note: &Note) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.draft = Draft::Editing {
            id: note.id.clone(),
            fields: note.fields(),
        };
        true
    }

    /// Drop the current draft and go back to an empty new note.
    pub fn reset(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.draft = Draft::default();
        true
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.draft.fields_mut().title = title.into();
        true
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.draft.fields_mut().content = content.into();
        true
    }

    /// Freeze the draft and hand out what to send.
    ///
    /// `Ok(None)` means a submission is already outstanding. Validation
    /// errors leave the composer untouched.
    pub fn begin_submit(&mut self) -> Result<Option<Submission>> {
        if self.is_submitting() {
            return Ok(None);
        }
        let fields = self.draft.fields().validated()?;
        let submission = match &self.draft {
            Draft::Creating(_) => Submission::Create(fields),
            Draft::Editing { id, .. } => Submission::Update {
                id: id.clone(),
                fields,
            },
        };
        self.pending = Some(submission.clone());
        Ok(Some(submission))
    }

    /// Unfreeze with the outcome of the submission.
    ///
    /// The form goes back to an empty new note once the server has the
    /// change, including when only the follow-up refresh failed. Any other
    /// failure keeps the draft so the user can retry.
    pub fn finish_submit(&mut self, outcome: &Result<()>) {
        let landed = match outcome {
            Ok(()) => true,
            Err(error) => error.was_applied(),
        };
        if self.pending.take().is_some() && landed {
            self.draft = Draft::default();
        }
    }
}
