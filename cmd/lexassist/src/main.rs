//! # LexAssist CLI
//!
//! Drives the guest quota and forum search from a terminal against the
//! same storage file and search API the app uses.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use configs::Settings;
use domains::{SearchOptions, SortBy};

mod app;
mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "lexassist")]
#[command(about = "LexAssist guest session and forum search client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change the guest prompt quota
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Search the forum, falling back to cached posts when offline
    Search {
        query: String,
        /// Restrict to one category (aliases such as "labour" work)
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "relevance")]
        sort: SortBy,
        #[arg(long)]
        limit: Option<usize>,
        /// Skip the remote API
        #[arg(long)]
        offline: bool,
    },
    /// Autocomplete suggestions for a partial query
    Suggest { query: String },
    /// Search as you type: reads one query per line from stdin and prints
    /// results once typing settles. A blank line cancels.
    Live {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "relevance")]
        sort: SortBy,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Create a session if none is active
    Start,
    /// Show state, remaining prompts and time until reset
    Status,
    /// Spend one guest prompt
    Prompt,
    /// Replace the session id (e.g. after the server issues one)
    Rotate { id: String },
    /// Forget the session
    Clear,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load()?;
    logging::init(&settings.log);

    let app = app::App::build(&settings)?;

    let code = match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Start => commands::session::start(&app).await?,
            SessionAction::Status => commands::session::status(&app).await?,
            SessionAction::Prompt => commands::session::prompt(&app).await?,
            SessionAction::Rotate { id } => commands::session::rotate(&app, &id).await?,
            SessionAction::Clear => commands::session::clear(&app).await?,
        },
        Commands::Search {
            query,
            category,
            sort,
            limit,
            offline,
        } => commands::search::search(&app, &query, category, sort, limit, offline).await?,
        Commands::Suggest { query } => commands::search::suggest(&app, &query).await?,
        Commands::Live {
            category,
            sort,
            limit,
        } => {
            let options = SearchOptions {
                sort_by: sort,
                limit,
                category,
            };
            commands::live::live(&app, options).await?
        }
    };

    Ok(code)
}
