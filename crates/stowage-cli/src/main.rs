//! Stowage CLI: bucket provisioning, maintenance and manual uploads against the configured store.
//!
//! Reads the STORAGE_* environment variables (a `.env` file is loaded first).

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use stowage_cli::{init_tracing, log_app_error, ErrorReport, ValidationReport};
use stowage_core::{AppError, Config, UploadCategory};
use stowage_services::{ObjectService, UploadValidator};

#[derive(Parser)]
#[command(name = "stowage", about = "Secure object storage gateway CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the bucket and its public-read policy if missing
    EnsureBucket,
    /// Check that the bucket exists and answers
    Health,
    /// Validate and store a file
    Upload {
        /// Owner of the object
        user_id: String,
        /// picture, preview or document
        category: UploadCategory,
        /// Path to the file to upload
        file: PathBuf,
        /// Filename to store under; defaults to the file's name
        #[arg(long)]
        name: Option<String>,
        /// Store under a generated name instead of a filename
        #[arg(long, conflicts_with = "name")]
        anonymous: bool,
    },
    /// Delete one object by the filename returned at upload
    Delete {
        user_id: String,
        category: UploadCategory,
        filename: String,
    },
    /// Delete every object under a key prefix
    DeleteFolder {
        /// Key prefix, e.g. `user-1/` or `user-1/pictures/`
        prefix: String,
    },
    /// Delete every object of one user
    DeleteUser { user_id: String },
    /// Validate a file locally without contacting the store
    Validate {
        category: UploadCategory,
        file: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<Bytes> {
    let data = std::fs::read(path).with_context(|| format!("Read {}", path.display()))?;
    Ok(Bytes::from(data))
}

async fn connect() -> anyhow::Result<ObjectService> {
    let config = Config::from_env().context(
        "Failed to load storage configuration. Set STORAGE_BUCKET and STORAGE_URL",
    )?;
    ObjectService::from_config(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create blob store: {}", e))
}

async fn run(command: Commands) -> anyhow::Result<Result<(), AppError>> {
    let outcome = match command {
        Commands::Validate { category, file } => {
            let data = read_file(&file)?;
            let filename = file.file_name().and_then(|n| n.to_str());
            UploadValidator::new()
                .validate(&data, category, filename)
                .map_err(AppError::from)
                .map(|validated| print_json(&ValidationReport::from(&validated)))
        }
        Commands::EnsureBucket => {
            let service = connect().await?;
            service.ensure_bucket().await.map(|status| {
                print_json(&serde_json::json!({
                    "bucket": service.bucket(),
                    "status": status.to_string(),
                }))
            })
        }
        Commands::Health => {
            let service = connect().await?;
            service.health().await.map(|()| {
                print_json(&serde_json::json!({ "bucket": service.bucket(), "healthy": true }))
            })
        }
        Commands::Upload {
            user_id,
            category,
            file,
            name,
            anonymous,
        } => {
            let service = connect().await?;
            let data = read_file(&file)?;
            let filename = match (anonymous, name) {
                (true, _) => None,
                (false, Some(name)) => Some(name),
                (false, None) => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string),
            };
            service
                .put(&user_id, category, data, filename.as_deref())
                .await
                .map(|result| print_json(&result))
        }
        Commands::Delete {
            user_id,
            category,
            filename,
        } => {
            let service = connect().await?;
            service
                .delete_one(&user_id, category, &filename)
                .await
                .map(|()| {
                    print_json(&serde_json::json!({ "success": true, "filename": filename }))
                })
        }
        Commands::DeleteFolder { prefix } => {
            let service = connect().await?;
            service
                .delete_folder(&prefix)
                .await
                .map(|deleted| {
                    print_json(&serde_json::json!({ "prefix": prefix, "deleted": deleted }))
                })
        }
        Commands::DeleteUser { user_id } => {
            let service = connect().await?;
            service
                .delete_user(&user_id)
                .await
                .map(|deleted| {
                    print_json(&serde_json::json!({ "user_id": user_id, "deleted": deleted }))
                })
        }
    };

    match outcome {
        Ok(printed) => printed.map(Ok),
        Err(err) => Ok(Err(err)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(err) = run(cli.command).await? {
        log_app_error(&err);
        print_json(&ErrorReport::from(&err))?;
        std::process::exit(1);
    }

    Ok(())
}
