use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_backend::cli::{SyncArgs, run};
use course_backend::config::StoreBackend;
use course_backend::store::open_store;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "course_backend=info,sync_content=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = SyncArgs::parse();

    let backend = StoreBackend::new_from_env()?;
    info!("syncing into {}", backend.describe());
    let store = open_store(&backend).await?;

    let summary = run(args, store).await?;
    Ok(summary.exit_code())
}
