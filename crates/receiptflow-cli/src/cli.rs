//! Command-line interface.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use receiptflow_client::{ClientConfig, DocumentClient};
use receiptflow_core::{GroupedTransactions, normalize_str, normalize_value};
use tracing::info;

use crate::display;

#[derive(Parser)]
#[command(name = "receiptflow")]
#[command(about = "Upload receipts for extraction and review their line items by date and store")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Document service connection settings.
#[derive(Args, Debug, Clone)]
struct ServiceArgs {
    /// Document service base URL
    #[arg(long = "url", env = "ROSSUM_URL")]
    base_url: String,

    /// Account user name
    #[arg(long, env = "ROSSUM_USERNAME")]
    username: String,

    /// Account password
    #[arg(long, env = "ROSSUM_PASSWORD", hide_env_values = true)]
    password: String,

    /// Queue receiving uploads and serving exports
    #[arg(long = "queue", env = "QUEUE_ID")]
    queue_id: String,
}

impl ServiceArgs {
    fn config(&self) -> ClientConfig {
        ClientConfig::new(
            self.base_url.as_str(),
            self.username.as_str(),
            self.password.as_str(),
            self.queue_id.as_str(),
        )
    }

    fn client(&self) -> anyhow::Result<DocumentClient> {
        DocumentClient::new(self.config()).context("configuring document service client")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the document service and print the API token
    Auth {
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Upload a receipt image for extraction
    Upload {
        /// Image file to upload
        file: PathBuf,
        /// Upload as receipt_<YYYYmmdd_HHMMSS>.<ext> instead of the file's own name
        #[arg(long)]
        stamp: bool,
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Export processed receipts and show their line items by date and store
    Transactions {
        /// Print the grouping as JSON instead of tables
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Show line items from an export payload saved to disk
    Render {
        /// Export payload JSON file ("-" reads stdin)
        payload: PathBuf,
        /// Print the grouping as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Auth { service } => {
            let token = service.client()?.authenticate().await.context("authenticating")?;
            println!("{token}");
        }
        Commands::Upload {
            file,
            stamp,
            service,
        } => {
            let client = service.client()?;
            let uploaded = if stamp {
                let name = stamped_file_name(&file, Local::now().naive_local());
                let bytes = tokio::fs::read(&file)
                    .await
                    .with_context(|| format!("reading {}", file.display()))?;
                info!(file = %file.display(), name = %name, "uploading under stamped name");
                client.upload_bytes(&name, bytes).await
            } else {
                client.upload_document(&file).await
            };
            let receipt = uploaded.with_context(|| format!("uploading {}", file.display()))?;

            println!("Receipt uploaded successfully");
            match receipt.document_id {
                Some(id) => println!("Document ID: {id}"),
                None => println!("Document ID: (not returned)"),
            }
        }
        Commands::Transactions { json, service } => {
            let payload = service
                .client()?
                .export_annotations()
                .await
                .context("exporting annotations")?;
            let grouped = normalize_value(&payload).context("reading export payload")?;
            show(&grouped, json)?;
        }
        Commands::Render { payload, json } => {
            let text = load_payload(&payload).await?;
            let grouped = normalize_str(&text)
                .with_context(|| format!("reading export payload {}", payload.display()))?;
            show(&grouped, json)?;
        }
    }

    Ok(())
}

fn show(grouped: &GroupedTransactions, json: bool) -> anyhow::Result<()> {
    info!(
        dates = grouped.len(),
        items = grouped.item_count(),
        "showing transactions"
    );
    if json {
        display::print_json(grouped)
    } else {
        display::print_transactions(grouped)
    }
}

async fn load_payload(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading payload from stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

/// `receipt_<YYYYmmdd_HHMMSS>.<ext>`, keeping the source extension (`jpg` if none).
fn stamped_file_name(path: &Path, now: NaiveDateTime) -> String {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("jpg");
    format!("receipt_{}.{ext}", now.format("%Y%m%d_%H%M%S"))
}
