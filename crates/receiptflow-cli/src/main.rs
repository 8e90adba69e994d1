mod cli;
mod display;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before parsing, so env-backed flags see it)
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "receiptflow=info"
    } else {
        "receiptflow=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("receiptflow v{}", env!("CARGO_PKG_VERSION"));
    cli::run().await
}
