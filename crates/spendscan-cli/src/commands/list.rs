//! List command - show a user's expenses, newest first.

use clap::Args;

use spendscan_core::api::HttpBackend;
use spendscan_core::models::expense::{format_rupees, ExpenseLedger};
use spendscan_core::pipeline::ReceiptPipeline;

use super::Settings;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// User whose expenses to list
    #[arg(short, long)]
    user: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ListFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ListFormat {
    /// Plain text table
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

pub async fn run(args: ListArgs, settings: Settings<'_>) -> anyhow::Result<()> {
    let config = settings.load_config()?;
    let backend = HttpBackend::from_config(&config.api)?;
    let pipeline = ReceiptPipeline::from_config(backend, &config);

    let ledger = pipeline.list(&args.user).await?;

    let output = match args.format {
        ListFormat::Text => format_text(&ledger),
        ListFormat::Json => serde_json::to_string_pretty(ledger.records())?,
        ListFormat::Csv => format_csv(&ledger)?,
    };
    println!("{}", output);

    Ok(())
}

fn format_text(ledger: &ExpenseLedger) -> String {
    if ledger.is_empty() {
        return "No expenses recorded yet.".to_string();
    }

    let mut output = String::new();
    for record in ledger.records() {
        output.push_str(&format!(
            "{}  {:<14} {:>10}  {}\n",
            record.date,
            record.category,
            format_rupees(record.amount),
            record.description
        ));
    }
    output.push_str(&format!(
        "\n{} expenses, total {}",
        ledger.len(),
        format_rupees(ledger.total())
    ));
    output
}

fn format_csv(ledger: &ExpenseLedger) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "category", "amount", "description"])?;
    for record in ledger.records() {
        wtr.write_record([
            &record.date.to_string(),
            &record.category,
            &record.amount.to_string(),
            &record.description,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
