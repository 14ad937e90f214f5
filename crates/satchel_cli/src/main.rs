//! Satchel CLI
//!
//! Command-line tools for inspecting and driving a Satchel store.
//!
//! # Commands
//!
//! - `inspect` - show collections, document counts, and sync status
//! - `pending` - list the pending write queue
//! - `flush` - attempt to drain the pending queue
//! - `get` - print a collection's cached documents
//! - `put` - upsert a JSON document into a collection
//! - `delete` - remove a document by id

mod commands;

use clap::{Parser, Subcommand};
use satchel_core::{FileBackend, HttpEndpointClient, SyncContext};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Satchel command-line store tools.
#[derive(Parser)]
#[command(name = "satchel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Remote endpoint URL (omit for local-only mode)
    #[arg(global = true, short, long)]
    endpoint: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show collections, document counts, and sync status
    Inspect,

    /// List the pending write queue
    Pending {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Attempt to drain the pending queue
    Flush,

    /// Print a collection's cached documents
    Get {
        /// Collection name
        collection: String,
    },

    /// Upsert a JSON document into a collection
    Put {
        /// Collection name
        collection: String,
        /// The document as a JSON object with an `id` field
        record: String,
    },

    /// Remove a document by id
    Delete {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let context = open_context(&cli)?;

    match cli.command {
        Commands::Inspect => commands::inspect::run(&context)?,
        Commands::Pending { format } => commands::pending::run(&context, &format)?,
        Commands::Flush => commands::flush::run(&context),
        Commands::Get { collection } => commands::get::run(&context, &collection),
        Commands::Put { collection, record } => {
            commands::put::run(&context, &collection, &record)?;
        }
        Commands::Delete { collection, id } => {
            commands::delete::run(&context, &collection, &id);
        }
    }

    Ok(())
}

fn open_context(cli: &Cli) -> Result<SyncContext, Box<dyn std::error::Error>> {
    let path = cli.path.clone().ok_or("store path required (--path)")?;

    let mut builder = SyncContext::builder().backend(FileBackend::open(&path)?);
    if let Some(url) = &cli.endpoint {
        builder = builder.endpoint(HttpEndpointClient::new(url.clone()));
    }

    Ok(builder.build())
}
