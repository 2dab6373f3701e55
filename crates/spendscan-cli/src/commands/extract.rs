//! Extract command - run the receipt field extractor over recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::info;

use spendscan_core::models::expense::RawRecognizedText;
use spendscan_core::receipt::{ExtractionResult, ReceiptExtractor};

use super::Settings;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text file with the recognized receipt (default: stdin)
    input: Option<PathBuf>,

    /// Date used when the receipt has none (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, settings: Settings<'_>) -> anyhow::Result<()> {
    let config = settings.load_config()?;

    let text = match &args.input {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            fs::read_to_string(path)?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let extractor = ReceiptExtractor::from_config(&config.extraction);
    let result = extractor.extract_on(&RawRecognizedText::new(text), today);
    info!("Extracted with {} warnings", result.warnings.len());

    println!("{}", format_result(&result, args.format)?);
    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_text(result: &ExtractionResult) -> String {
    let candidate = &result.candidate;
    let mut output = String::new();

    let amount = candidate
        .amount
        .map(|a| a.to_string())
        .unwrap_or_else(|| "(not found)".to_string());
    output.push_str(&format!("Amount:      {}\n", amount));

    let date = candidate
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "(not found)".to_string());
    let note = if result.date_defaulted { " (today)" } else { "" };
    output.push_str(&format!("Date:        {}{}\n", date, note));

    output.push_str(&format!(
        "Description: {}\n",
        candidate.description.as_deref().unwrap_or("(not found)")
    ));

    let category = candidate
        .category
        .map(|c| c.label())
        .unwrap_or("(no match)");
    output.push_str(&format!("Category:    {}", category));

    if !candidate.is_complete() {
        output.push_str(&format!(
            "\nMissing:     {}",
            candidate.missing_fields().join(", ")
        ));
    }

    if !result.warnings.is_empty() {
        output.push_str("\n\nWarnings:");
        for warning in &result.warnings {
            output.push_str(&format!("\n  - {}", warning));
        }
    }

    output
}
