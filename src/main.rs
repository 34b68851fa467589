//! scout: command-line access to the configured search backend

use anyhow::Result;
use clap::{Parser, Subcommand};
use scout_rs::{
    config::{self, Settings},
    engines::EngineLoader,
    network::HttpClient,
    search::{SearchRequest, Window},
    EngineManager,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "scout", version, about = "Query and manage search indexes")]
struct Cli {
    /// Path to a settings file
    #[arg(short, long, env = "SCOUT_SETTINGS_PATH")]
    config: Option<PathBuf>,

    /// Driver to use instead of the configured one
    #[arg(short, long)]
    driver: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a search and print the raw backend answer
    Search {
        index: String,
        query: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Remove every document from an index
    Flush { index: String },
    /// Create an index
    CreateIndex {
        index: String,
        #[arg(short, long, default_value = "id")]
        key: String,
    },
    /// Delete an index
    DeleteIndex { index: String },
    /// List the drivers this build knows
    Drivers,
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => {
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            settings
        }
        None => config::load()?,
    };
    if let Some(driver) = cli.driver {
        settings.driver = driver;
    }

    info!("scout v{} using driver {}", scout_rs::VERSION, settings.driver);

    let client = HttpClient::with_settings(&settings.outgoing)?;
    let mut manager = EngineManager::new(settings, client);

    match cli.command {
        Command::Search {
            index,
            query,
            limit,
        } => {
            let engine = manager.default_engine()?;
            let mut request = SearchRequest::new(index, query);
            if let Some(limit) = limit {
                request = request.with_window(Window::Limit(limit));
            }
            let raw = engine.search(&request).await?;
            println!("{}", serde_json::to_string_pretty(&raw)?);
        }
        Command::Flush { index } => {
            manager.default_engine()?.flush_index(&index).await?;
        }
        Command::CreateIndex { index, key } => {
            manager.default_engine()?.create_index(&index, &key).await?;
        }
        Command::DeleteIndex { index } => {
            manager.default_engine()?.delete_index(&index).await?;
        }
        Command::Drivers => {
            for driver in EngineLoader::available_engines() {
                println!("{}", driver);
            }
        }
    }

    Ok(())
}
