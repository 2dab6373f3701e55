//! Date extraction for receipts.

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::patterns::{DATE_DMY, DATE_TEXTUAL, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};

/// Date layouts recognized on receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `12/05/2024`, `12-05-24` (day first)
    DayFirst,
    /// `2024/05/12`, `2024-05-12`
    YearFirst,
    /// `12 May 2024`, `3 Sept 24`
    Textual,
}

/// Order in which the layouts are tried.
pub const DATE_PRIORITY: [DatePattern; 3] = [
    DatePattern::DayFirst,
    DatePattern::YearFirst,
    DatePattern::Textual,
];

impl DatePattern {
    pub fn name(&self) -> &'static str {
        match self {
            DatePattern::DayFirst => "day_first",
            DatePattern::YearFirst => "year_first",
            DatePattern::Textual => "textual",
        }
    }

    pub fn regex(&self) -> &'static Regex {
        match self {
            DatePattern::DayFirst => &*DATE_DMY,
            DatePattern::YearFirst => &*DATE_YMD,
            DatePattern::Textual => &*DATE_TEXTUAL,
        }
    }

    fn to_date(&self, caps: &Captures<'_>) -> Option<NaiveDate> {
        let (year, month, day) = match self {
            DatePattern::DayFirst => (
                parse_year(&caps[3])?,
                caps[2].parse().ok()?,
                caps[1].parse().ok()?,
            ),
            DatePattern::YearFirst => (
                parse_year(&caps[1])?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            ),
            DatePattern::Textual => (
                parse_year(&caps[3])?,
                month_from_name(&caps[2])?,
                caps[1].parse().ok()?,
            ),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Parse the first match of this layout. `None` if there is no match or
    /// the matched text is not a real calendar date.
    pub fn find(&self, text: &str) -> Option<ExtractionMatch<NaiveDate>> {
        let caps = self.regex().captures(text)?;
        let full_match = caps.get(0)?;
        let date = self.to_date(&caps)?;
        Some(
            ExtractionMatch::new(date, self.name(), full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        DATE_PRIORITY.iter().find_map(|pattern| pattern.find(text))
    }
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() <= 2 {
        // Two-digit year: 00-50 is 2000s, 51-99 is 1900s
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}

fn month_from_name(month: &str) -> Option<u32> {
    let prefix: String = month.chars().take(3).collect::<String>().to_lowercase();
    let number = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_first() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("Date: 12/05/2024").unwrap();
        assert_eq!(result.value, ymd(2024, 5, 12));
        assert_eq!(result.rule, "day_first");
        assert_eq!(result.source, "12/05/2024");
    }

    #[test]
    fn test_day_first_two_digit_year() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("03-11-24").unwrap().value, ymd(2024, 11, 3));
        assert_eq!(extractor.extract("03-11-99").unwrap().value, ymd(1999, 11, 3));
    }

    #[test]
    fn test_year_first() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("Bill dt 2024-05-12 10:31").unwrap();
        assert_eq!(result.value, ymd(2024, 5, 12));
        assert_eq!(result.rule, "year_first");
    }

    #[test]
    fn test_textual() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("12 May 2024").unwrap().value, ymd(2024, 5, 12));
        assert_eq!(extractor.extract("3 SEPTEMBER 2023").unwrap().value, ymd(2023, 9, 3));
        assert_eq!(extractor.extract("1 jan 25").unwrap().value, ymd(2025, 1, 1));
    }

    #[test]
    fn test_dates_glued_to_text_are_not_matched() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("Dt12/05/2024"), None);

        let result = extractor.extract("2024-05-12").unwrap();
        assert_eq!(result.value, ymd(2024, 5, 12));
        assert_eq!(result.rule, "year_first");
    }

    #[test]
    fn test_invalid_match_falls_through_to_next_layout() {
        let extractor = DateExtractor::new();
        let text = "Ref 31/02/2024\nPrinted 2024-03-15";
        let result = extractor.extract(text).unwrap();
        assert_eq!(result.value, ymd(2024, 3, 15));
        assert_eq!(result.rule, "year_first");
    }

    #[test]
    fn test_invalid_everywhere_is_absent() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("45/13/2024").is_none());
        assert!(extractor.extract("no dates here").is_none());
    }

    #[test]
    fn test_month_from_name() {
        assert_eq!(month_from_name("Sept"), Some(9));
        assert_eq!(month_from_name("DECEMBER"), Some(12));
        assert_eq!(month_from_name("xyz"), None);
    }
}
