//! anirelay - command-line consumer of the resolution engine
//!
//! Walks the same chain a presentation layer would (catalog, detail,
//! episode, server) and prints canonical records as JSON.

use std::path::PathBuf;

use anirelay_common::config::ConfigResolver;
use anirelay_common::logging::init_tracing;
use anirelay_common::{Category, Source};
use anirelay_core::ResolutionEngine;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Command-line arguments for anirelay
#[derive(Parser, Debug)]
#[command(name = "anirelay")]
#[command(about = "Aggregated anime catalog, detail and stream resolution")]
#[command(version)]
struct Args {
    /// Config file path (overrides ANIRELAY_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Upstream provider key; defaults to the configured source
    #[arg(short, long, global = true)]
    source: Option<Source>,

    /// Log level or filter directive
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Currently airing titles
    Ongoing {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Finished titles
    Completed {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Full title index
    All,
    /// Available genres
    Genres,
    /// Titles in a genre
    Genre {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Movies
    Movies {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// OVAs
    Ovas {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search titles
    Search { query: String },
    /// Title detail with episode list
    Detail {
        id: String,
        /// Wait for enrichment and print the merged record
        #[arg(long)]
        enrich: bool,
    },
    /// Stream servers for an episode
    Episode { id: String },
    /// Playable URL for a server id
    Server { id: String },
    /// Most popular titles from the enrichment provider
    Top {
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// High-resolution poster for a title
    Poster { title: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, report) = ConfigResolver::new()
        .with_cli_path(args.config.clone())
        .load_with_report();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging).context("Failed to initialize tracing")?;
    report.log();

    let source = args.source.unwrap_or(config.default_source);
    let engine =
        ResolutionEngine::from_config(&config).context("Failed to build resolution engine")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    info!(source = %source, command = ?args.command, "Running command");

    match args.command {
        Command::Ongoing { page } => {
            print_json(&engine.list_catalog(source, &Category::Ongoing, page, &cancel).await)?
        }
        Command::Completed { page } => {
            print_json(&engine.list_catalog(source, &Category::Completed, page, &cancel).await)?
        }
        Command::All => print_json(&engine.list_catalog(source, &Category::All, 1, &cancel).await)?,
        Command::Genres => print_json(&engine.list_genres(source, &cancel).await)?,
        Command::Genre { id, page } => {
            print_json(&engine.list_catalog(source, &Category::Genre(id), page, &cancel).await)?
        }
        Command::Movies { page } => {
            print_json(&engine.list_catalog(source, &Category::Movie, page, &cancel).await)?
        }
        Command::Ovas { page } => {
            print_json(&engine.list_catalog(source, &Category::Ova, page, &cancel).await)?
        }
        Command::Search { query } => print_json(&engine.search(source, &query, &cancel).await)?,
        Command::Detail { id, enrich } => {
            if enrich {
                let view = engine.open_detail(source, &id, &cancel).await;
                match view {
                    Some(view) => print_json(&view.merged().await)?,
                    None => print_json(&Option::<()>::None)?,
                }
            } else {
                print_json(&engine.get_detail(source, &id, &cancel).await)?
            }
        }
        Command::Episode { id } => {
            print_json(&engine.get_episode_stream(source, &id, &cancel).await)?
        }
        Command::Server { id } => {
            print_json(&engine.resolve_server_url(source, &id, &cancel).await)?
        }
        Command::Top { limit } => print_json(&engine.top_anime(limit, &cancel).await)?,
        Command::Poster { title } => {
            print_json(&engine.enrichment().high_quality_poster(&title, &cancel).await)?
        }
    }

    engine.enrichment().queue().shutdown().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, cancelling");
        cancel.cancel();
    }
}
