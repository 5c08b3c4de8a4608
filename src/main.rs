mod cli;
mod config;
mod platform;
mod reader;
mod relay;
mod sender;

use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Args;
use crate::config::Config;
use crate::platform::telegram::TelegramClient;
use crate::reader::InputReader;
use crate::sender::Sender;

fn main() -> Result<()> {
    // Initialize logging; stdout is left alone for the surrounding pipeline
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,botcat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::load(args).context("Failed to load configuration")?;

    info!(
        "Relaying stdin as {} to {} (split lines: {}, retries: {})",
        config.message_kind,
        config.destination,
        config.split_newlines,
        config.retry.retries()
    );

    // One scheduler thread for the relay, one worker for blocking stdin reads.
    // Both go away when the runtime is dropped, on success or error.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .max_blocking_threads(1)
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    let client = TelegramClient::new(&config);
    let sender = Sender::new(client, &config);
    let reader = InputReader::new(BufReader::new(io::stdin()));

    let summary = relay::relay(reader, &sender, &config).await?;

    info!(
        "Done: {} message(s) sent, {} blank skipped",
        summary.sent, summary.skipped
    );
    Ok(())
}
