//! CLI for receipt scanning and expense entry.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{add, config, extract, list, prepare, scan, suggest};

/// Spendscan - turn receipt photos into expense entries
#[derive(Parser)]
#[command(name = "spendscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Backend base URL (overrides config and SPENDSCAN_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a receipt photo through the backend recognizer
    Scan(scan::ScanArgs),

    /// Extract expense fields from recognized receipt text
    Extract(extract::ExtractArgs),

    /// Suggest a category for a description
    Suggest(suggest::SuggestArgs),

    /// Downscale and re-encode a photo for upload
    Prepare(prepare::PrepareArgs),

    /// Add an expense
    Add(add::AddArgs),

    /// List a user's expenses
    List(list::ListArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let settings = commands::Settings {
        config_path: cli.config.as_deref(),
        api_base: cli.api_base.as_deref(),
    };

    match cli.command {
        Commands::Scan(args) => scan::run(args, settings).await,
        Commands::Extract(args) => extract::run(args, settings).await,
        Commands::Suggest(args) => suggest::run(args).await,
        Commands::Prepare(args) => prepare::run(args, settings).await,
        Commands::Add(args) => add::run(args, settings).await,
        Commands::List(args) => list::run(args, settings).await,
        Commands::Config(args) => config::run(args, settings).await,
    }
}
