//! Form session state.
//!
//! Everything the expense form remembers between user actions lives in one
//! [`FormSession`]: who is entering expenses, which entry mode is active, the
//! drafts for each mode and the single slot holding the current receipt
//! candidate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::AddExpenseRequest;
use crate::category::classify;
use crate::error::ValidationError;
use crate::models::expense::{Category, ReviewedExpense};
use crate::receipt::rules::parse_amount;
use crate::receipt::ExtractionResult;

/// How the user is entering the expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Structured fields.
    #[default]
    Quick,
    /// Free text parsed by the backend.
    NaturalLanguage,
    /// Photographed receipt.
    Receipt,
}

/// Fields of the quick-entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickEntryDraft {
    pub amount: String,
    pub category: Option<Category>,
    /// Label used instead of "Other" when non-empty.
    pub custom_category: String,
    pub date: Option<NaiveDate>,
    pub description: String,
}

impl QuickEntryDraft {
    /// Empty draft dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            category: None,
            custom_category: String::new(),
            date: Some(today),
            description: String::new(),
        }
    }

    /// Update the description and, if no category was picked yet, fill in
    /// the suggested one. Returns the suggestion that was applied.
    pub fn set_description(&mut self, text: impl Into<String>) -> Option<Category> {
        self.description = text.into();
        if self.category.is_some() {
            return None;
        }
        let suggested = classify(&self.description)?;
        debug!("Suggested category {} for {:?}", suggested, self.description);
        self.category = Some(suggested);
        Some(suggested)
    }

    /// Category label to submit.
    pub fn resolved_category(&self) -> Option<String> {
        match self.category? {
            Category::Other if !self.custom_category.trim().is_empty() => {
                Some(self.custom_category.trim().to_string())
            }
            category => Some(category.label().to_string()),
        }
    }

    /// Validate the draft into an add-expense body.
    pub fn to_request(&self, user_id: &str) -> Result<AddExpenseRequest, ValidationError> {
        let amount_text = self.amount.trim();
        if amount_text.is_empty() {
            return Err(ValidationError::MissingField("amount"));
        }
        let category = self
            .resolved_category()
            .ok_or(ValidationError::MissingField("category"))?;
        let date = self.date.ok_or(ValidationError::MissingField("date"))?;
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingField("description"));
        }

        let amount = parse_amount(amount_text)
            .ok_or_else(|| ValidationError::InvalidAmount(amount_text.to_string()))?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        Ok(AddExpenseRequest::Structured {
            user_id: user_id.to_string(),
            amount,
            category,
            date,
            description: description.to_string(),
        })
    }
}

/// Identifies one scan. Only the newest ticket may fill the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket(u64);

/// The single "current candidate" slot.
#[derive(Debug, Default)]
pub struct CandidateSlot {
    generation: u64,
    pending: bool,
    current: Option<ExtractionResult>,
}

impl CandidateSlot {
    /// Start a scan, superseding any scan in flight and clearing the slot.
    pub fn begin(&mut self) -> ScanTicket {
        self.generation += 1;
        self.pending = true;
        self.current = None;
        ScanTicket(self.generation)
    }

    /// Store a finished extraction. Stale tickets are ignored.
    pub fn complete(&mut self, ticket: ScanTicket, result: ExtractionResult) -> bool {
        if !self.is_current(ticket) {
            debug!("Dropping result of superseded scan {:?}", ticket);
            return false;
        }
        self.pending = false;
        self.current = Some(result);
        true
    }

    /// Record that a scan failed. Stale tickets are ignored.
    pub fn fail(&mut self, ticket: ScanTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = false;
        true
    }

    /// Discard any pending scan and the current candidate.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = false;
        self.current = None;
    }

    pub fn is_current(&self, ticket: ScanTicket) -> bool {
        self.pending && ticket.0 == self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn current(&self) -> Option<&ExtractionResult> {
        self.current.as_ref()
    }

    /// Clear the candidate a finished save came from.
    ///
    /// Does nothing if a scan was started or cancelled since, so a late save
    /// never clears a newer upload.
    pub fn clear_submitted(&mut self, ticket: ScanTicket) -> bool {
        if self.pending || ticket.0 != self.generation {
            return false;
        }
        self.current = None;
        true
    }
}

/// A reviewed receipt ready to be saved, with the scan it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedReceipt {
    pub reviewed: ReviewedExpense,
    pub request: AddExpenseRequest,
    pub ticket: ScanTicket,
}

/// State of one expense form.
#[derive(Debug)]
pub struct FormSession {
    user_id: Option<String>,
    mode: EntryMode,
    quick: QuickEntryDraft,
    natural_text: String,
    slot: CandidateSlot,
}

impl FormSession {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            user_id: None,
            mode: EntryMode::Quick,
            quick: QuickEntryDraft::new(today),
            natural_text: String::new(),
            slot: CandidateSlot::default(),
        }
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        let trimmed = user_id.trim();
        self.user_id = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// The entered user id, or a validation error if there is none.
    pub fn user_id(&self) -> Result<&str, ValidationError> {
        self.user_id.as_deref().ok_or(ValidationError::MissingUserId)
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn switch_mode(&mut self, mode: EntryMode) {
        debug!("Switching entry mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    pub fn quick(&self) -> &QuickEntryDraft {
        &self.quick
    }

    pub fn quick_mut(&mut self) -> &mut QuickEntryDraft {
        &mut self.quick
    }

    pub fn natural_text(&self) -> &str {
        &self.natural_text
    }

    pub fn set_natural_text(&mut self, text: impl Into<String>) {
        self.natural_text = text.into();
    }

    pub fn slot(&self) -> &CandidateSlot {
        &self.slot
    }

    /// Start a receipt scan. Any earlier scan is superseded.
    pub fn begin_scan(&mut self) -> ScanTicket {
        self.mode = EntryMode::Receipt;
        self.slot.begin()
    }

    pub fn complete_scan(&mut self, ticket: ScanTicket, result: ExtractionResult) -> bool {
        self.slot.complete(ticket, result)
    }

    pub fn fail_scan(&mut self, ticket: ScanTicket) -> bool {
        self.slot.fail(ticket)
    }

    /// User pressed cancel or retry; any in-flight result will be ignored.
    pub fn cancel_scan(&mut self) {
        self.slot.cancel();
    }

    /// Abandon the receipt and continue in the quick-entry form.
    pub fn skip_to_manual(&mut self, today: NaiveDate) {
        self.slot.cancel();
        self.mode = EntryMode::Quick;
        self.quick.date = Some(today);
    }

    /// Validate the active quick or natural-language form.
    pub fn build_submission(&self) -> Result<AddExpenseRequest, ValidationError> {
        let user_id = self.user_id()?;
        match self.mode {
            EntryMode::Quick => self.quick.to_request(user_id),
            EntryMode::NaturalLanguage => {
                let text = self.natural_text.trim();
                if text.is_empty() {
                    return Err(ValidationError::EmptyDescription);
                }
                Ok(AddExpenseRequest::NaturalLanguage {
                    user_id: user_id.to_string(),
                    text: text.to_string(),
                })
            }
            EntryMode::Receipt => Err(ValidationError::NoCandidate),
        }
    }

    /// Review the current candidate and turn it into a submission.
    ///
    /// The candidate stays in the slot until [`receipt_submitted`] is called,
    /// so a failed review or a failed save can be retried.
    ///
    /// [`receipt_submitted`]: Self::receipt_submitted
    pub fn confirm_candidate(&self, today: NaiveDate) -> Result<ConfirmedReceipt, ValidationError> {
        let user_id = self.user_id()?;
        let current = self.slot.current().ok_or(ValidationError::NoCandidate)?;
        let reviewed = ReviewedExpense::from_candidate(current.candidate.clone(), today)?;
        let request = AddExpenseRequest::from_reviewed(user_id, &reviewed);
        Ok(ConfirmedReceipt {
            reviewed,
            request,
            ticket: ScanTicket(self.slot.generation),
        })
    }

    /// The save of a confirmed receipt succeeded.
    pub fn receipt_submitted(&mut self, ticket: ScanTicket) -> bool {
        self.slot.clear_submitted(ticket)
    }

    /// Reset the draft of `mode` after its submission was saved.
    ///
    /// `mode` is the one the submission was built in, which may no longer be
    /// the active one.
    pub fn submission_succeeded(&mut self, mode: EntryMode, today: NaiveDate) {
        match mode {
            EntryMode::Quick => self.quick = QuickEntryDraft::new(today),
            EntryMode::NaturalLanguage => self.natural_text.clear(),
            // Receipts leave the slot through `receipt_submitted`.
            EntryMode::Receipt => {}
        }
    }
}
