use nodepad_core::{Composer, Note};

use crate::app::App;
use crate::commands::common::{
    capture_editor_input, normalize_note_identifier, settle_mutation,
};
use crate::error::CliError;

pub async fn run_edit(
    app: &App,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    app.require_session().await?;
    app.notes().refresh().await?;
    let note = app
        .notes()
        .get(&note_id)
        .ok_or_else(|| CliError::NoteNotFound(note_id.to_string()))?;

    let content = match (&title, content) {
        (None, None) => Some(capture_editor_input(&note.content)?.ok_or(CliError::EmptyContent)?),
        (_, content) => content,
    };

    let mut composer = draft_for(&note, title, content);
    let Some(submission) = composer.begin_submit()? else {
        return Ok(());
    };
    let result = app.notes().submit(&submission).await;
    composer.finish_submit(&result);
    settle_mutation(result, ())?;

    println!("{note_id}");
    Ok(())
}

/// Start from the stored note and apply whatever the user changed.
pub fn draft_for(note: &Note, title: Option<String>, content: Option<String>) -> Composer {
    let mut composer = Composer::new();
    composer.edit(note);
    if let Some(title) = title {
        composer.set_title(title);
    }
    if let Some(content) = content {
        composer.set_content(content);
    }
    composer
}
