use std::io;

use nodepad_core::{DeleteOutcome, Note, NoteId};

use crate::app::App;
use crate::commands::common::{normalize_note_identifier, prompt_yes_no, settle_mutation};
use crate::error::CliError;

pub async fn run_delete(app: &App, id: &str, skip_prompt: bool) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    app.require_session().await?;
    app.notes().refresh().await?;

    let confirm = |id: &NoteId, note: Option<&Note>| {
        if skip_prompt {
            return true;
        }
        let question = delete_question(id, note);
        prompt_yes_no(&mut io::stdin().lock(), &mut io::stderr(), &question).unwrap_or_else(
            |error| {
                tracing::warn!("Could not read confirmation: {}", error);
                false
            },
        )
    };

    let outcome = app.notes().delete(&note_id, &confirm).await;
    match settle_mutation(outcome, DeleteOutcome::Deleted)? {
        DeleteOutcome::Deleted => println!("{note_id}"),
        DeleteOutcome::Cancelled => println!("Delete cancelled"),
    }
    Ok(())
}

pub fn delete_question(id: &NoteId, note: Option<&Note>) -> String {
    note.map_or_else(
        || format!("Delete note {id}?"),
        |note| format!("Delete \"{}\" ({id})?", note.title),
    )
}
