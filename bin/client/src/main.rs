//! File backup client

mod catalog;
mod config;
mod constants;
mod download;
mod logger;
mod upload;

use clap::{Parser, Subcommand};
use constants::{DEFAULT_CATALOG_PATH, DEFAULT_UPLOAD_FIELD};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "File backup client")]
struct Cli {
    /// Server URL (default: http://127.0.0.1:8080, or BACKUP_SERVER_URL env var)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files to the server in a single request
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Multipart field name the server expects
        #[arg(short, long, default_value = DEFAULT_UPLOAD_FIELD)]
        field_name: String,
    },
    /// List stored files
    List {
        /// Catalog listing path on the server
        #[arg(short, long, default_value = DEFAULT_CATALOG_PATH)]
        catalog_path: String,
    },
    /// Download a stored file
    Download {
        /// Stored filename as shown by `list`
        stored_name: String,
        /// Output directory for downloaded file (default: downloaded/)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();
    let server = config::resolve_server(cli.server);

    match cli.command {
        Commands::Upload { paths, field_name } => {
            upload::upload_files(&server, &field_name, &paths)?;
        }
        Commands::List { catalog_path } => {
            catalog::list_files(&server, &catalog_path)?;
        }
        Commands::Download {
            stored_name,
            output_dir,
        } => {
            download::download_file(&server, &stored_name, output_dir.as_ref())?;
        }
    }

    Ok(())
}
