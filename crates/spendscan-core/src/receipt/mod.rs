//! Receipt field extraction.

mod extractor;
mod recognized;
pub mod rules;

pub use extractor::{ExtractionResult, ReceiptExtractor};
pub use recognized::RecognizedReceipt;
