//! Core library for receipt-driven expense entry.
//!
//! This crate provides:
//! - Receipt photo preparation (downscale to 1200px, JPEG re-encode)
//! - Keyword category suggestion for expense descriptions
//! - Rule-based receipt field extraction (amount, date, description, category)
//! - The expense backend contract and its HTTP client
//! - Form session state and the async receipt pipeline

pub mod api;
pub mod category;
pub mod error;
pub mod imaging;
pub mod models;
pub mod receipt;
pub mod session;

#[cfg(feature = "native")]
pub mod pipeline;

pub use api::{AddExpenseRequest, AddExpenseResponse, ExpenseBackend, ScanPayload};
#[cfg(feature = "native")]
pub use api::HttpBackend;
pub use category::classify;
pub use error::{ApiError, ImagePrepError, Result, SpendError, ValidationError};
pub use imaging::{ImagePreparer, PreparedImage};
pub use models::config::SpendConfig;
pub use models::expense::{
    Category, ExpenseLedger, ExpenseRecord, ExtractionCandidate, RawRecognizedText,
    ReviewedExpense,
};
#[cfg(feature = "native")]
pub use pipeline::ReceiptPipeline;
pub use receipt::{ExtractionResult, ReceiptExtractor, RecognizedReceipt};
pub use session::{CandidateSlot, EntryMode, FormSession, QuickEntryDraft, ScanTicket};
