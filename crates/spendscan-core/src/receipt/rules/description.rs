//! Merchant / description extraction for receipts.

use super::patterns::MERCHANT_KEYWORDS;
use super::{ExtractionMatch, FieldExtractor};

/// Picks the line that best describes the purchase.
///
/// Looks for a merchant keyword in the first few non-empty lines and falls
/// back to the first non-empty line.
pub struct DescriptionExtractor {
    scan_lines: usize,
    max_chars: usize,
}

impl DescriptionExtractor {
    pub fn new() -> Self {
        Self {
            scan_lines: 5,
            max_chars: 50,
        }
    }

    /// Number of leading non-empty lines searched for a merchant keyword.
    pub fn with_scan_lines(mut self, lines: usize) -> Self {
        self.scan_lines = lines;
        self
    }

    /// Maximum description length in characters.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

impl Default for DescriptionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DescriptionExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

        let merchant = lines.iter().take(self.scan_lines).find(|line| {
            let lowered = line.to_lowercase();
            MERCHANT_KEYWORDS.iter().any(|k| lowered.contains(k))
        });

        if let Some(line) = merchant {
            let value = truncate_chars(line.trim(), self.max_chars);
            return Some(ExtractionMatch::new(value, "merchant_line", *line));
        }

        let first = lines.first()?;
        let value = truncate_chars(first.trim(), self.max_chars);
        Some(ExtractionMatch::new(value, "first_line", *first))
    }
}

/// Keep at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
