//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amounts (Indian receipts: Rs / ₹ / INR, optional thousands commas)
    pub static ref CURRENCY_THEN_NUMBER: Regex = Regex::new(
        r"(?i)(?:rs\.?|₹|inr)\s*(\d+(?:,\d{3})*(?:\.\d{2})?)"
    ).unwrap();

    pub static ref NUMBER_THEN_CURRENCY: Regex = Regex::new(
        r"(?i)(\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:rs\.?|₹|inr)"
    ).unwrap();

    pub static ref TOTAL_LINE: Regex = Regex::new(
        r"(?i)total[:\s]+(?:rs\.?|₹)?\s*(\d+(?:,\d{3})*(?:\.\d{2})?)"
    ).unwrap();

    pub static ref AMOUNT_LINE: Regex = Regex::new(
        r"(?i)amount[:\s]+(?:rs\.?|₹)?\s*(\d+(?:,\d{3})*(?:\.\d{2})?)"
    ).unwrap();

    pub static ref GRAND_TOTAL_LINE: Regex = Regex::new(
        r"(?i)grand\s+total[:\s]+(?:rs\.?|₹)?\s*(\d+(?:,\d{3})*(?:\.\d{2})?)"
    ).unwrap();

    // Dates
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4}|\d{2})[-/](\d{1,2})[-/](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_TEXTUAL: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+(\d{4}|\d{2})\b"
    ).unwrap();
}

/// Lowercase words that mark a line as the merchant name.
pub const MERCHANT_KEYWORDS: [&str; 9] = [
    "restaurant", "cafe", "store", "shop", "mart", "mall", "pvt", "ltd", "inc",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(CURRENCY_THEN_NUMBER.is_match("Rs. 100"));
        assert!(NUMBER_THEN_CURRENCY.is_match("100 INR"));
        assert!(TOTAL_LINE.is_match("TOTAL: 100"));
        assert!(AMOUNT_LINE.is_match("Amount 100"));
        assert!(GRAND_TOTAL_LINE.is_match("Grand Total: ₹100"));
        assert!(DATE_DMY.is_match("12/05/2024"));
        assert!(DATE_YMD.is_match("2024-05-12"));
        assert!(DATE_TEXTUAL.is_match("12 May 2024"));
    }

    #[test]
    fn test_dmy_does_not_match_inside_iso_date() {
        assert!(!DATE_DMY.is_match("2024-05-12"));
    }
}
