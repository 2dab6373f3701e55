//! Scan command - send a receipt photo through the recognizer.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Mutex;
use tracing::info;

use spendscan_core::api::HttpBackend;
use spendscan_core::pipeline::ReceiptPipeline;
use spendscan_core::session::FormSession;

use super::extract::{format_result, OutputFormat};
use super::Settings;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt photo
    #[arg(required = true)]
    image: PathBuf,

    /// User the expense belongs to
    #[arg(short, long)]
    user: String,

    /// Save the extracted expense right away
    #[arg(long)]
    confirm: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: ScanArgs, settings: Settings<'_>) -> anyhow::Result<()> {
    let config = settings.load_config()?;

    if !args.image.exists() {
        anyhow::bail!("Input file not found: {}", args.image.display());
    }
    let data = fs::read(&args.image)?;
    let today = Local::now().date_naive();

    let session = Mutex::new(FormSession::new(today));
    session.lock().await.set_user_id(args.user.as_str());

    let backend = HttpBackend::from_config(&config.api)?;
    info!("Using backend at {}", backend.base_url());
    let pipeline = ReceiptPipeline::from_config(backend, &config);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Processing receipt...");

    let scanned = pipeline.scan_into_session(&session, data, today).await;
    pb.finish_and_clear();

    if let Err(e) = scanned {
        anyhow::bail!(
            "{}\nTry another photo or enter the expense manually with 'spendscan add'.",
            e
        );
    }

    {
        let guard = session.lock().await;
        let Some(result) = guard.slot().current() else {
            anyhow::bail!("Scan was superseded before it finished");
        };
        println!("{}", format_result(result, args.format)?);
    }

    if args.confirm {
        let (reviewed, _) = pipeline.confirm_session(&session, today).await?;
        println!(
            "{} Saved {} {} on {}",
            style("✓").green(),
            reviewed.amount,
            reviewed.category,
            reviewed.date
        );
    }

    Ok(())
}
