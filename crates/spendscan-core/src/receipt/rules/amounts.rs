//! Amount extraction for receipts.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{
    AMOUNT_LINE, CURRENCY_THEN_NUMBER, GRAND_TOTAL_LINE, NUMBER_THEN_CURRENCY, TOTAL_LINE,
};
use super::{ExtractionMatch, FieldExtractor};

/// The amount pattern families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountPattern {
    /// `Rs 1,250.50`, `₹450`, `INR 99`
    CurrencyThenNumber,
    /// `450 INR`, `1,200.00 Rs`
    NumberThenCurrency,
    /// `Total: Rs. 900`
    TotalLine,
    /// `Amount 900.00`
    AmountLine,
    /// `Grand Total ₹900`
    GrandTotalLine,
}

/// Order in which the families are tried. The first one that yields a
/// number wins.
pub const AMOUNT_PRIORITY: [AmountPattern; 5] = [
    AmountPattern::CurrencyThenNumber,
    AmountPattern::NumberThenCurrency,
    AmountPattern::TotalLine,
    AmountPattern::AmountLine,
    AmountPattern::GrandTotalLine,
];

impl AmountPattern {
    pub fn name(&self) -> &'static str {
        match self {
            AmountPattern::CurrencyThenNumber => "currency_then_number",
            AmountPattern::NumberThenCurrency => "number_then_currency",
            AmountPattern::TotalLine => "total_line",
            AmountPattern::AmountLine => "amount_line",
            AmountPattern::GrandTotalLine => "grand_total_line",
        }
    }

    pub fn regex(&self) -> &'static Regex {
        match self {
            AmountPattern::CurrencyThenNumber => &*CURRENCY_THEN_NUMBER,
            AmountPattern::NumberThenCurrency => &*NUMBER_THEN_CURRENCY,
            AmountPattern::TotalLine => &*TOTAL_LINE,
            AmountPattern::AmountLine => &*AMOUNT_LINE,
            AmountPattern::GrandTotalLine => &*GRAND_TOTAL_LINE,
        }
    }

    /// First match of this family, parsed.
    pub fn find(&self, text: &str) -> Option<ExtractionMatch<Decimal>> {
        let caps = self.regex().captures(text)?;
        let full_match = caps.get(0)?;
        let amount = parse_amount(&caps[1])?;
        Some(
            ExtractionMatch::new(amount, self.name(), full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}

/// Amount field extractor.
pub struct AmountExtractor {
    priority: Vec<AmountPattern>,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self {
            priority: AMOUNT_PRIORITY.to_vec(),
        }
    }

    /// Replace the pattern order.
    pub fn with_priority(mut self, priority: &[AmountPattern]) -> Self {
        self.priority = priority.to_vec();
        self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.priority.iter().find_map(|pattern| pattern.find(text))
    }
}

/// Parse a receipt amount such as "1,250.50", dropping thousands separators.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
