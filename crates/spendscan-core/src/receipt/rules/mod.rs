//! Rule-based field extractors for receipts.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod patterns;

pub use amounts::{parse_amount, AmountExtractor, AmountPattern, AMOUNT_PRIORITY};
pub use dates::{DateExtractor, DatePattern, DATE_PRIORITY};
pub use description::{truncate_chars, DescriptionExtractor};
pub use patterns::MERCHANT_KEYWORDS;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// An extracted value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the rule that produced the value.
    pub rule: &'static str,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            rule,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
