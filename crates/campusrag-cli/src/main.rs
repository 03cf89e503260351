//! Campusrag CLI
//!
//! Retrieval pipeline over a local knowledge base of document fragments.

use anyhow::Result;
use campusrag_core::{CampusRagError, Config, KnowledgeBase};
use clap::Parser;
use std::path::PathBuf;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<CampusRagError>()
            .map(CampusRagError::exit_code)
            .unwrap_or(campusrag_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let format = cli.format;

    match cli.command {
        Commands::Config(args) => commands::config::run(args, &config_path, format),
        Commands::Route(args) => {
            let config = Config::load_from(&config_path)?;
            commands::route::run(args, &config, format).await
        }
        Commands::Retrieve(args) => {
            let config = Config::load_from(&config_path)?;
            let (db, _) = open_knowledge_base()?;
            commands::retrieve::run(args, db, &config, format).await
        }
        Commands::Compare(args) => {
            let config = Config::load_from(&config_path)?;
            let (db, _) = open_knowledge_base()?;
            commands::compare::run(args, db, &config, format).await
        }
        Commands::Import(args) => {
            let config = Config::load_from(&config_path)?;
            let (db, _) = open_knowledge_base()?;
            commands::import::run(args, &db, &config, format).await
        }
        Commands::Status => {
            let (db, db_path) = open_knowledge_base()?;
            commands::status::run(&db, &db_path, format)
        }
    }
}

/// Open the database (CAMPUSRAG_DB overrides the default location)
fn open_knowledge_base() -> Result<(KnowledgeBase, PathBuf)> {
    let db_path = KnowledgeBase::default_path();
    let db = KnowledgeBase::open(&db_path)?;
    db.initialize()?;
    Ok((db, db_path))
}
