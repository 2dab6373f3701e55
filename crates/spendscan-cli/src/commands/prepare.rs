//! Prepare command - downscale and re-encode a receipt photo.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use spendscan_core::imaging::ImagePreparer;

use super::Settings;

/// Arguments for the prepare command.
#[derive(Args)]
pub struct PrepareArgs {
    /// Input photo
    #[arg(required = true)]
    input: PathBuf,

    /// Output JPEG file
    #[arg(short, long)]
    output: PathBuf,

    /// Maximum output width in pixels
    #[arg(long)]
    max_width: Option<u32>,

    /// JPEG quality in (0, 1]
    #[arg(long)]
    quality: Option<f32>,
}

pub async fn run(args: PrepareArgs, settings: Settings<'_>) -> anyhow::Result<()> {
    let mut config = settings.load_config()?;
    if let Some(width) = args.max_width {
        config.image.max_width = width;
    }
    if let Some(quality) = args.quality {
        config.image.quality = quality;
    }
    config.validate()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    debug!("Read {} bytes from {}", data.len(), args.input.display());

    let prepared = ImagePreparer::from_config(&config.image).prepare(&data)?;
    fs::write(&args.output, prepared.bytes())?;

    println!(
        "{} Wrote {}x{} JPEG ({} bytes) to {}",
        style("✓").green(),
        prepared.width(),
        prepared.height(),
        prepared.bytes().len(),
        args.output.display()
    );

    Ok(())
}
