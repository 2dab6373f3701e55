//! Suggest command - keyword category for a description.

use clap::Args;

use spendscan_core::category::classify;

/// Arguments for the suggest command.
#[derive(Args)]
pub struct SuggestArgs {
    /// Expense description
    #[arg(required = true)]
    text: Vec<String>,
}

pub async fn run(args: SuggestArgs) -> anyhow::Result<()> {
    let text = args.text.join(" ");
    match classify(&text) {
        Some(category) => println!("{}", category),
        None => println!("no match"),
    }
    Ok(())
}
