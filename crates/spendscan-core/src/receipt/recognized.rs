//! Recognizer output and its conversion into a candidate.

use crate::api::ScanPayload;
use crate::models::expense::RawRecognizedText;

/// What came back from one recognition call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedReceipt {
    /// Raw recognized text, when the recognizer sent it.
    pub raw_text: Option<RawRecognizedText>,
    /// Fields the recognizer extracted itself.
    pub prefilled: ScanPayload,
}

impl From<ScanPayload> for RecognizedReceipt {
    fn from(payload: ScanPayload) -> Self {
        let raw_text = payload
            .text
            .as_deref()
            .map(RawRecognizedText::from)
            .filter(|t| !t.is_blank());
        Self {
            raw_text,
            prefilled: payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::{Category, ExtractionCandidate};
    use crate::receipt::{ExtractionResult, ReceiptExtractor};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn convert(payload: ScanPayload) -> ExtractionResult {
        ReceiptExtractor::new().extract_recognized(&RecognizedReceipt::from(payload), ymd(2024, 7, 1))
    }

    #[test]
    fn test_raw_text_goes_through_extractor() {
        let result = convert(ScanPayload {
            text: Some("City Mart\n03/06/2024\nGrand total ₹ 820".to_string()),
            amount: Some(Decimal::new(1, 0)),
            ..Default::default()
        });
        assert_eq!(result.candidate.amount, Some(Decimal::new(820, 0)));
        assert_eq!(result.candidate.date, Some(ymd(2024, 6, 3)));
        assert_eq!(result.candidate.description.as_deref(), Some("City Mart"));
    }

    #[test]
    fn test_prefilled_fields_fill_gaps() {
        let result = convert(ScanPayload {
            text: Some("xq 77 zz".to_string()),
            amount: Some(Decimal::new(77, 0)),
            category: Some("Bills".to_string()),
            ..Default::default()
        });
        assert_eq!(result.candidate.amount, Some(Decimal::new(77, 0)));
        assert_eq!(result.candidate.category, Some(Category::Bills));
    }

    #[test]
    fn test_fields_only_payload() {
        let result = convert(ScanPayload {
            amount: Some(Decimal::new(45000, 2)),
            category: Some("Healthcare".to_string()),
            date: Some("2024-05-12".to_string()),
            description: Some("Apollo Pharmacy".to_string()),
            ..Default::default()
        });
        assert_eq!(
            result.candidate,
            ExtractionCandidate {
                amount: Some(Decimal::new(45000, 2)),
                date: Some(ymd(2024, 5, 12)),
                description: Some("Apollo Pharmacy".to_string()),
                category: Some(Category::Health),
            }
        );
        assert!(!result.date_defaulted);
    }

    #[test]
    fn test_fields_only_payload_defaults() {
        let result = convert(ScanPayload {
            date: Some("12/05/2024".to_string()),
            category: Some("Groceries".to_string()),
            description: Some("veg and milk".to_string()),
            ..Default::default()
        });
        assert_eq!(result.candidate.amount, None);
        assert_eq!(result.candidate.date, Some(ymd(2024, 7, 1)));
        assert_eq!(result.candidate.category, Some(Category::Food));
        assert!(result.date_defaulted);
    }

    #[test]
    fn test_blank_text_is_treated_as_missing() {
        let receipt = RecognizedReceipt::from(ScanPayload {
            text: Some("   ".to_string()),
            ..Default::default()
        });
        assert_eq!(receipt.raw_text, None);
    }
}
