//! Vegeket CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! vegeket-cli migrate
//!
//! # Seed the catalog from the default YAML file
//! vegeket-cli seed
//!
//! # Seed from a specific file, replacing the existing catalog
//! vegeket-cli seed --file fixtures/catalog.yaml --clear
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run catalog database migrations
//! - `seed` - Upsert categories, tags, and items from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vegeket-cli")]
#[command(author, version, about = "Vegeket CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run catalog database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the YAML seed file
        #[arg(short, long, default_value = "crates/cli/seeds/catalog.yaml")]
        file: String,

        /// Delete existing catalog rows before seeding
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Migrate => commands::migrate::run().await.map_err(Into::into),
        Commands::Seed { file, clear } => commands::seed::run(&file, clear).await,
    };

    if let Err(e) = result {
        tracing::error!("command failed: {e}");
        std::process::exit(1);
    }
}
