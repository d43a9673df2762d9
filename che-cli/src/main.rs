//! # che CLI
//!
//! Command-line interface for the che static site builder.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "che")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "che.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new che project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Build the pages that changed since the last build
    Build {
        /// Render every page regardless of detected changes
        #[arg(long)]
        force_rebuild: bool,
    },

    /// Show what the next build would do without writing anything
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new draft page
    New {
        /// Page name, slugified into the file basename
        name: String,
    },

    /// Publish a page
    Activate {
        /// Page basename
        page: String,
    },

    /// Return a page to draft
    Deactivate {
        /// Page basename
        page: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build { force_rebuild } => commands::build_site(&cli.config, force_rebuild),
        Commands::Status { json } => commands::show_status(&cli.config, json),
        Commands::New { name } => commands::new_page(&cli.config, &name),
        Commands::Activate { page } => {
            commands::change_status(&cli.config, &page, che_core::PageStatus::Published)
        }
        Commands::Deactivate { page } => {
            commands::change_status(&cli.config, &page, che_core::PageStatus::Draft)
        }
    }
}
