use crate::app::App;
use crate::error::CliError;

pub async fn run_register(app: &App, username: &str, password: &str) -> Result<(), CliError> {
    let registration = app.session().register(username, password).await?;
    let message = registration
        .message
        .unwrap_or_else(|| "Account created".to_string());
    println!("{message}");
    Ok(())
}

pub async fn run_login(app: &App, username: &str, password: &str) -> Result<(), CliError> {
    app.session().restore().await;
    let user = app
        .session()
        .login(username, password)
        .await
        .map_err(CliError::from_login)?;
    println!("Signed in as {}", user.username);
    Ok(())
}

pub fn run_logout(app: &App) {
    app.session().logout();
    println!("Signed out");
}

pub async fn run_status(app: &App) {
    match app.session().restore().await {
        Some(user) => println!("Signed in as {} ({})", user.username, user.id),
        None => println!("Not signed in"),
    }
}
