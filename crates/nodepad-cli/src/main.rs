//! Nodepad CLI - sign in and manage notes on a Nodepad server from the terminal.

mod app;
mod cli;
mod commands;
mod config;
mod credentials;
mod error;


use clap::Parser;

use crate::app::App;
use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::{run_login, run_logout, run_register, run_status};
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::config::ApiSources;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "nodepad=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Cli { command, api_url } = Cli::parse();
    match command {
        Commands::Config { command } => run_config(command, api_url),
        command => {
            let app = App::connect(ApiSources::gather(api_url)?.resolve()?)?;
            dispatch(&app, command).await
        }
    }
}

async fn dispatch(app: &App, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Register { username, password } => {
            run_register(app, &username, &password).await?;
        }
        Commands::Login { username, password } => run_login(app, &username, &password).await?,
        Commands::Logout => run_logout(app),
        Commands::Status => run_status(app).await,
        Commands::List { json } => run_list(app, json).await?,
        Commands::Add { title, content } => run_add(app, &title, &content).await?,
        Commands::Edit { id, title, content } => run_edit(app, &id, title, content).await?,
        Commands::Delete { id, yes } => run_delete(app, &id, yes).await?,
        // needs no server; handled before connecting
        Commands::Config { .. } => {}
    }

    Ok(())
}
