use crate::app::App;
use crate::commands::common::{resolve_note_content, settle_mutation};
use crate::error::CliError;

pub async fn run_add(app: &App, title: &str, content_parts: &[String]) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    app.require_session().await?;

    settle_mutation(app.notes().create(title, &content).await, ())?;
    let created = app
        .notes()
        .notes()
        .into_iter()
        .rev()
        .find(|note| note.title == title && note.content == content);
    match created {
        Some(note) => println!("{}", note.id),
        None => println!("Note created"),
    }
    Ok(())
}
