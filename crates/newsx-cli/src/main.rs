use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsx_core::{feed::SortOrder, AppConfig, SourceMode};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "newsx")]
#[command(author, version, about = "Top headlines from NewsAPI or RSS, in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the configured source ("rest" or "rss")
    #[arg(long, global = true)]
    source: Option<SourceMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print headlines for a category
    Headlines {
        /// general, technology, business, health, sports or entertainment
        #[arg(short, long, default_value = "general")]
        category: String,
        /// Only show articles whose title or description contains this text
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// newest, oldest or title
        #[arg(short, long, default_value = "newest")]
        sort: SortOrder,
        /// Show at most this many cards
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print articles as JSON instead of cards
        #[arg(long)]
        json: bool,
    },
    /// List categories and their feeds
    Categories,
    /// Interactive session: switch categories, search and sort as you go
    Interactive,
    /// Write a default config file to ~/.config/newsx/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Runs before loading so a broken config file can be replaced
    if let Some(Commands::Init { force }) = cli.command {
        return commands::init::run(force);
    }

    let mut config = AppConfig::load()?;
    if let Some(mode) = cli.source {
        config.source.mode = mode;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Some(Commands::Headlines {
            category,
            search,
            sort,
            limit,
            json,
        }) => {
            let options = commands::headlines::Options {
                category,
                search: search.unwrap_or_default(),
                sort,
                limit,
                json,
            };
            commands::headlines::run(&config, options).await
        }
        None => commands::headlines::run(&config, commands::headlines::Options::default()).await,
        Some(Commands::Categories) => commands::categories::run(&config),
        Some(Commands::Interactive) => commands::interactive::run(&config).await,
        Some(Commands::Init { force }) => commands::init::run(force),
    }
}
