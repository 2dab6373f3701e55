//! Contract with the expense backend.
//!
//! The backend stores and lists expenses and runs receipt recognition. Only
//! its request/response shapes live here; the transport is pluggable through
//! [`ExpenseBackend`].

#[cfg(feature = "native")]
mod http;

#[cfg(feature = "native")]
pub use http::HttpBackend;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::imaging::PreparedImage;
use crate::models::expense::{ExpenseRecord, ReviewedExpense};

/// Body of the add-expense call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AddExpenseRequest {
    /// Fields entered (or reviewed) by the user.
    Structured {
        user_id: String,
        #[serde(with = "rust_decimal::serde::float")]
        amount: Decimal,
        category: String,
        date: NaiveDate,
        description: String,
    },
    /// Free text the backend parses itself.
    NaturalLanguage { user_id: String, text: String },
}

impl AddExpenseRequest {
    /// Structured body for a confirmed receipt.
    pub fn from_reviewed(user_id: impl Into<String>, expense: &ReviewedExpense) -> Self {
        AddExpenseRequest::Structured {
            user_id: user_id.into(),
            amount: expense.amount,
            category: expense.category.label().to_string(),
            date: expense.date,
            description: expense.description.clone(),
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            AddExpenseRequest::Structured { user_id, .. } => user_id,
            AddExpenseRequest::NaturalLanguage { user_id, .. } => user_id,
        }
    }
}

/// Success body of the add-expense call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddExpenseResponse {
    #[serde(default)]
    pub status: Option<String>,
    /// Stored record(s) as echoed by the backend.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Payload returned by the scan-receipt call.
///
/// The recognizer may send raw text, fields it already extracted, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanPayload {
    #[serde(default, alias = "raw_text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The backend operations the form depends on.
#[async_trait]
pub trait ExpenseBackend: Send + Sync {
    /// Store a new expense.
    async fn add_expense(&self, request: &AddExpenseRequest) -> Result<AddExpenseResponse, ApiError>;

    /// List a user's expenses in whatever order the backend keeps them.
    async fn list_expenses(&self, user_id: &str) -> Result<Vec<ExpenseRecord>, ApiError>;

    /// Run recognition on a prepared receipt photo.
    async fn scan_receipt(&self, image: &PreparedImage) -> Result<ScanPayload, ApiError>;
}
