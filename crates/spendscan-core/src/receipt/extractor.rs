//! Turns recognized receipt text into an expense candidate.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::category::classify;
use crate::models::config::ExtractionConfig;
use crate::models::expense::{Category, ExtractionCandidate, RawRecognizedText};

use super::recognized::RecognizedReceipt;
use super::rules::{
    truncate_chars, AmountExtractor, DateExtractor, DescriptionExtractor, FieldExtractor,
};

const NO_AMOUNT: &str = "no amount found";
const NO_CATEGORY: &str = "no category keywords found";

/// Result of receipt extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted candidate.
    pub candidate: ExtractionCandidate,
    /// Text the candidate was derived from.
    pub raw_text: RawRecognizedText,
    /// True when no date was found and today's date was used.
    pub date_defaulted: bool,
    /// Human-readable notes about fields that could not be found.
    pub warnings: Vec<String>,
}

/// Deterministic receipt field extractor.
///
/// Each field is attempted independently; a field that cannot be found is
/// left absent. The date is the exception and defaults to today.
pub struct ReceiptExtractor {
    amounts: AmountExtractor,
    dates: DateExtractor,
    description: DescriptionExtractor,
    default_description: String,
    description_max_chars: usize,
}

impl ReceiptExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            amounts: AmountExtractor::new(),
            dates: DateExtractor::new(),
            description: DescriptionExtractor::new()
                .with_scan_lines(config.merchant_scan_lines)
                .with_max_chars(config.description_max_chars),
            default_description: config.default_description.clone(),
            description_max_chars: config.description_max_chars,
        }
    }

    /// Extract using the local calendar date as the date fallback.
    pub fn extract(&self, text: &RawRecognizedText) -> ExtractionResult {
        self.extract_on(text, Local::now().date_naive())
    }

    /// Extract with an explicit "today" for the date fallback.
    pub fn extract_on(&self, text: &RawRecognizedText, today: NaiveDate) -> ExtractionResult {
        let raw = text.as_str();
        let mut warnings = Vec::new();
        let mut candidate = ExtractionCandidate::default();

        match self.amounts.extract(raw) {
            Some(found) => {
                debug!("Amount {} from {} ({:?})", found.value, found.rule, found.source);
                candidate.amount = Some(found.value);
            }
            None => warnings.push(NO_AMOUNT.to_string()),
        }

        let date_defaulted = match self.dates.extract(raw) {
            Some(found) => {
                debug!("Date {} from {} ({:?})", found.value, found.rule, found.source);
                candidate.date = Some(found.value);
                false
            }
            None => {
                warnings.push(format!("no date found, using {}", today));
                candidate.date = Some(today);
                true
            }
        };

        candidate.description = Some(match self.description.extract(raw) {
            Some(found) => {
                debug!("Description from {}: {:?}", found.rule, found.value);
                found.value
            }
            None => {
                warnings.push("receipt has no text lines".to_string());
                self.default_description.clone()
            }
        });

        candidate.category = classify(raw);
        if candidate.category.is_none() {
            warnings.push(NO_CATEGORY.to_string());
        }

        ExtractionResult {
            candidate,
            raw_text: text.clone(),
            date_defaulted,
            warnings,
        }
    }

    /// Build a candidate from a recognizer response.
    ///
    /// Raw text goes through [`extract_on`](Self::extract_on) and wins field
    /// by field; the recognizer's own amount and category only fill gaps.
    /// Without raw text the recognizer's fields are used directly.
    pub fn extract_recognized(
        &self,
        receipt: &RecognizedReceipt,
        today: NaiveDate,
    ) -> ExtractionResult {
        let prefilled = &receipt.prefilled;

        if let Some(raw) = &receipt.raw_text {
            let mut result = self.extract_on(raw, today);
            let candidate = &mut result.candidate;
            if candidate.amount.is_none() && prefilled.amount.is_some() {
                candidate.amount = prefilled.amount;
                result.warnings.retain(|w| w != NO_AMOUNT);
            }
            if candidate.category.is_none() {
                candidate.category = prefilled.category.as_deref().and_then(Category::from_label);
                if candidate.category.is_some() {
                    result.warnings.retain(|w| w != NO_CATEGORY);
                }
            }
            return result;
        }

        let mut warnings = Vec::new();

        let parsed_date = prefilled
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        let date_defaulted = parsed_date.is_none();
        if date_defaulted {
            warnings.push(format!("no date found, using {}", today));
        }

        let description = prefilled
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| truncate_chars(d, self.description_max_chars))
            .unwrap_or_else(|| self.default_description.clone());

        let category = prefilled
            .category
            .as_deref()
            .and_then(Category::from_label)
            .or_else(|| classify(&description));

        if prefilled.amount.is_none() {
            warnings.push(NO_AMOUNT.to_string());
        }

        ExtractionResult {
            candidate: ExtractionCandidate {
                amount: prefilled.amount,
                date: Some(parsed_date.unwrap_or(today)),
                description: Some(description),
                category,
            },
            raw_text: RawRecognizedText::new(String::new()),
            date_defaulted,
            warnings,
        }
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}
