//! Add command - submit a quick or natural-language expense.

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use tracing::{debug, info};

use spendscan_core::api::HttpBackend;
use spendscan_core::models::expense::Category;
use spendscan_core::pipeline::ReceiptPipeline;
use spendscan_core::session::{EntryMode, FormSession};
use tokio::sync::Mutex;

use super::Settings;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// User the expense belongs to
    #[arg(short, long)]
    user: String,

    /// Describe the expense in plain words instead of fields
    #[arg(long, conflicts_with_all = ["amount", "category", "custom_category", "date", "description"])]
    text: Option<String>,

    /// Amount paid
    #[arg(long, required_unless_present = "text")]
    amount: Option<String>,

    /// Category (suggested from the description when omitted)
    #[arg(long)]
    category: Option<Category>,

    /// Label to use instead of "Other"
    #[arg(long)]
    custom_category: Option<String>,

    /// Date of the expense (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// What the money was spent on
    #[arg(long, required_unless_present = "text")]
    description: Option<String>,
}

pub async fn run(args: AddArgs, settings: Settings<'_>) -> anyhow::Result<()> {
    let config = settings.load_config()?;
    let today = Local::now().date_naive();

    let mut session = FormSession::new(today);
    session.set_user_id(args.user.as_str());

    match args.text {
        Some(text) => {
            session.switch_mode(EntryMode::NaturalLanguage);
            session.set_natural_text(text);
        }
        None => {
            let draft = session.quick_mut();
            draft.amount = args.amount.unwrap_or_default();
            draft.category = args.category;
            draft.custom_category = args.custom_category.unwrap_or_default();
            if let Some(date) = args.date {
                draft.date = Some(date);
            }
            if let Some(suggested) = draft.set_description(args.description.unwrap_or_default()) {
                debug!("Using suggested category {}", suggested);
            }
        }
    }

    // Fail on invalid input before a client is built.
    session.build_submission()?;

    let backend = HttpBackend::from_config(&config.api)?;
    info!("Submitting to {}", backend.base_url());
    let pipeline = ReceiptPipeline::from_config(backend, &config);
    let session = Mutex::new(session);
    let response = pipeline.submit_session(&session, today).await?;

    println!("{} Expense saved", style("✓").green());
    if !response.data.is_null() {
        println!("{}", serde_json::to_string_pretty(&response.data)?);
    }

    Ok(())
}
