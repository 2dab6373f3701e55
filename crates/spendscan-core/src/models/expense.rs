//! Expense data models shared by the form, the extractor and the backend client.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Expense category.
///
/// The first seven variants are the closed set the keyword classifier knows
/// about; `Other` is the open bucket a user may rename with a custom label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Health,
    Education,
    Other,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Bills,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    /// Label sent to the backend.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    /// Match a label case-insensitively. The recognizer says "Healthcare".
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("healthcare") {
            return Some(Category::Health);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Text returned by the external recognizer. Never modified after receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecognizedText(String);

impl RawRecognizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for RawRecognizedText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RawRecognizedText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// An unconfirmed expense derived from a receipt.
///
/// Every field is independently optional; a missing field is left for the
/// user to fill in during review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    /// Total paid, if one could be found.
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub amount: Option<Decimal>,

    /// Receipt date.
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Merchant line or first line of the receipt.
    #[serde(default)]
    pub description: Option<String>,

    /// Suggested category.
    #[serde(default)]
    pub category: Option<Category>,
}

impl ExtractionCandidate {
    /// True when all four fields were determined.
    pub fn is_complete(&self) -> bool {
        self.amount.is_some()
            && self.date.is_some()
            && self.description.is_some()
            && self.category.is_some()
    }

    /// Names of the fields that are still absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.amount.is_none() {
            missing.push("amount");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        missing
    }
}

/// A candidate the user has confirmed, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedExpense {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
    pub description: String,
}

impl ReviewedExpense {
    /// Promote a candidate after review.
    ///
    /// Amount and description are required. A missing category becomes
    /// `Other` and a missing date becomes `today`.
    pub fn from_candidate(
        candidate: ExtractionCandidate,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let amount = candidate
            .amount
            .ok_or(ValidationError::MissingField("amount"))?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        let description = candidate
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or(ValidationError::MissingField("description"))?;

        Ok(Self {
            amount,
            category: candidate.category.unwrap_or(Category::Other),
            date: candidate.date.unwrap_or(today),
            description,
        })
    }
}

/// A stored expense as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

/// A user's expenses ordered for display.
#[derive(Debug, Clone, Default)]
pub struct ExpenseLedger {
    records: Vec<ExpenseRecord>,
}

impl ExpenseLedger {
    /// Build a ledger, newest first. Records on the same date keep their
    /// backend order.
    pub fn from_records(mut records: Vec<ExpenseRecord>) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Self { records }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every amount.
    pub fn total(&self) -> Decimal {
        self.records.iter().map(|r| r.amount).sum()
    }
}

/// Format an amount as whole rupees, e.g. `₹1251`.
pub fn format_rupees(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("₹{}", rounded)
}
