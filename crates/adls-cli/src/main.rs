//! ADLS Artifacts CLI
//!
//! Inspect, upload and download artifacts stored under an `abfss://` URI.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "adls-artifacts")]
#[command(author, version, about = "Artifact repository on Azure Data Lake Storage Gen2", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bearer token for the storage account
    #[arg(long, global = true, env = "AZURE_STORAGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Upload/download timeout in seconds, overrides settings
    #[arg(long, global = true)]
    timeout: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how an abfss:// URI resolves
    Parse {
        /// Artifact URI
        uri: String,
    },

    /// List artifacts one level below a path
    #[command(name = "ls")]
    List {
        /// Artifact URI
        uri: String,

        /// Path relative to the artifact root
        path: Option<String>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a local directory
    Upload {
        /// Artifact URI
        uri: String,

        /// Local directory to upload
        local_dir: PathBuf,

        /// Destination path relative to the artifact root
        #[arg(short, long)]
        artifact_path: Option<String>,
    },

    /// Upload a single local file (not supported by Data Lake repositories)
    Log {
        /// Artifact URI
        uri: String,

        /// Local file to upload
        local_file: PathBuf,

        /// Destination path relative to the artifact root
        #[arg(short, long)]
        artifact_path: Option<String>,
    },

    /// Delete artifacts (not supported by Data Lake repositories)
    #[command(name = "rm")]
    Delete {
        /// Artifact URI
        uri: String,

        /// Path relative to the artifact root
        path: Option<String>,
    },

    /// Download a file or a directory tree
    Download {
        /// Artifact URI
        uri: String,

        /// Path relative to the artifact root (empty for everything)
        #[arg(default_value = "")]
        path: String,

        /// Local destination directory
        #[arg(short, long, default_value = ".")]
        dst: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "adls_cli=debug,adls_core=debug"
        } else {
            "adls_cli=info,adls_core=info"
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    debug!("Starting ADLS artifacts CLI");

    let options = commands::RepositoryOptions {
        token: cli.token,
        config: cli.config,
        timeout: cli.timeout,
    };

    let result = match cli.command {
        Commands::Parse { uri } => commands::parse::run(&uri),
        Commands::List { uri, path, json } => {
            commands::list::run(&options, &uri, path.as_deref(), json).await
        }
        Commands::Upload {
            uri,
            local_dir,
            artifact_path,
        } => commands::upload::run(&options, &uri, &local_dir, artifact_path.as_deref()).await,
        Commands::Download { uri, path, dst } => {
            commands::download::run(&options, &uri, &path, &dst).await
        }
        Commands::Log {
            uri,
            local_file,
            artifact_path,
        } => commands::log::run(&options, &uri, &local_file, artifact_path.as_deref()).await,
        Commands::Delete { uri, path } => {
            commands::delete::run(&options, &uri, path.as_deref()).await
        }
    };

    if let Err(ref e) = result {
        error!("Command failed: {:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}
