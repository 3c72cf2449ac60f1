//! botlist.space command-line client.

mod config;
mod logging;

use anyhow::{Context, Result};
use botlist::{
    Client, CountOrShards, FetchOptions, Fetched, FetchedList, MultiFetchOptions, PostOptions,
};
use clap::{Parser, Subcommand};
use config::Config;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "botlist.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Site statistics
    Stats,
    /// One page of listed bots
    Bots {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// A single bot (defaults to the configured bot ID)
    Bot { id: Option<String> },
    /// A bot's upvotes from the past month (requires a bot token)
    Upvotes {
        id: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// A single user
    User { id: String },
    /// Bots a user owns
    UserBots {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Post a server count, or per-shard counts
    PostCount {
        /// Bot to post for (defaults to the configured bot ID)
        #[arg(long)]
        bot_id: Option<String>,
        /// Treat the counts as per-shard counts even if there is only one
        #[arg(long)]
        shards: bool,
        #[arg(required = true)]
        counts: Vec<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        config.logging.level()?
    };

    logging::init(logging::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "botlist".to_string(),
        default_level: log_level,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let client = Client::with_transport(config.client.clone(), config.http.transport_config())
        .context("Failed to create botlist client")?;

    let payload = run(&client, args.command).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("Failed to serialize response")?
    );

    Ok(())
}

async fn run(client: &Client, command: Command) -> Result<Value> {
    let payload = match command {
        Command::Stats => single(client.fetch_stats(FetchOptions::new().raw(true)).await?)?,
        Command::Bots { page } => list(
            client
                .fetch_bots(MultiFetchOptions::new().raw(true).page(page))
                .await?,
        )?,
        Command::Bot { id } => single(
            client
                .fetch_bot(id.as_deref(), FetchOptions::new().raw(true))
                .await?,
        )?,
        Command::Upvotes { id, page } => list(
            client
                .fetch_upvotes(id.as_deref(), MultiFetchOptions::new().raw(true).page(page))
                .await?,
        )?,
        Command::User { id } => single(
            client
                .fetch_user(&id, FetchOptions::new().raw(true))
                .await?,
        )?,
        Command::UserBots { id, page } => list(
            client
                .fetch_bots_of_user(&id, MultiFetchOptions::new().raw(true).page(page))
                .await?,
        )?,
        Command::PostCount {
            bot_id,
            shards,
            counts,
        } => {
            let count_or_shards = count_or_shards(counts, shards)?;
            info!(?count_or_shards, "Posting server count");
            client
                .post_count(bot_id.as_deref(), PostOptions::from(count_or_shards))
                .await?
        }
    };
    Ok(payload)
}

fn count_or_shards(counts: Vec<u64>, shards: bool) -> Result<CountOrShards> {
    match counts.as_slice() {
        [] => anyhow::bail!("at least one count is required"),
        [count] if !shards => Ok(CountOrShards::Count(*count)),
        _ => Ok(CountOrShards::Shards(counts)),
    }
}

fn single<T>(fetched: Fetched<T>) -> Result<Value> {
    fetched.into_raw().context("Expected a raw payload")
}

fn list<T>(fetched: FetchedList<T>) -> Result<Value> {
    fetched.into_raw().context("Expected a raw payload")
}
