//! WASM bindings for the expense form.
//!
//! Exposes category suggestion, receipt field extraction and photo
//! preparation so the browser can run them without a round trip.

use chrono::{Local, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use spendscan_core::category::classify;
use spendscan_core::imaging::ImagePreparer;
use spendscan_core::models::config::ExtractionConfig;
use spendscan_core::models::expense::{format_rupees as rupees, Category, RawRecognizedText};
use spendscan_core::receipt::ReceiptExtractor;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse an optional `YYYY-MM-DD` date, falling back to the local date.
fn resolve_today(today: Option<String>) -> Result<NaiveDate, JsValue> {
    match today {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(to_js_error),
        None => Ok(Local::now().date_naive()),
    }
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Suggest a category for a description as the user types.
#[wasm_bindgen]
pub fn suggest_category(text: &str) -> Option<String> {
    classify(text).map(|c| c.label().to_string())
}

/// Labels of every category, in display order.
#[wasm_bindgen]
pub fn category_names() -> Result<JsValue, JsValue> {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    serde_wasm_bindgen::to_value(&names).map_err(to_js_error)
}

/// Extract expense fields from recognized receipt text.
///
/// `today` (`YYYY-MM-DD`) is used when the receipt has no date; it defaults
/// to the browser's local date.
#[wasm_bindgen]
pub fn extract_receipt(text: &str, today: Option<String>) -> Result<JsValue, JsValue> {
    let today = resolve_today(today)?;
    let result = ReceiptExtractor::new().extract_on(&RawRecognizedText::new(text), today);
    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

/// Downscale a photo and re-encode it as JPEG.
#[wasm_bindgen]
pub fn prepare_image(bytes: &[u8], max_width: u32, quality: f32) -> Result<Vec<u8>, JsValue> {
    if max_width == 0 || !(quality > 0.0 && quality <= 1.0) {
        return Err(JsValue::from_str("max_width must be positive and quality in (0, 1]"));
    }
    let prepared = ImagePreparer::new()
        .with_max_width(max_width)
        .with_quality(quality)
        .prepare(bytes)
        .map_err(to_js_error)?;
    Ok(prepared.into_bytes())
}

/// Format an amount as whole rupees, e.g. `₹1251`.
#[wasm_bindgen]
pub fn format_rupees(amount: f64) -> Option<String> {
    Decimal::from_f64(amount).map(rupees)
}

/// Receipt extractor with custom description settings.
#[wasm_bindgen]
pub struct ReceiptReader {
    extractor: ReceiptExtractor,
}

#[wasm_bindgen]
impl ReceiptReader {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: ReceiptExtractor::new(),
        }
    }

    /// Reader with a custom fallback description and length limit.
    #[wasm_bindgen]
    pub fn with_description(default_description: &str, max_chars: usize) -> Self {
        let config = ExtractionConfig {
            default_description: default_description.to_string(),
            description_max_chars: max_chars.max(1),
            ..ExtractionConfig::default()
        };
        Self {
            extractor: ReceiptExtractor::from_config(&config),
        }
    }

    /// Extract fields; see [`extract_receipt`].
    #[wasm_bindgen]
    pub fn extract(&self, text: &str, today: Option<String>) -> Result<JsValue, JsValue> {
        let today = resolve_today(today)?;
        let result = self.extractor.extract_on(&RawRecognizedText::new(text), today);
        serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
    }
}

impl Default for ReceiptReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_suggest_category() {
        assert_eq!(suggest_category("Uber to airport").as_deref(), Some("Transport"));
        assert_eq!(suggest_category("   "), None);
    }

    #[wasm_bindgen_test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(1250.5).as_deref(), Some("₹1251"));
        assert_eq!(format_rupees(f64::NAN), None);
    }

    #[wasm_bindgen_test]
    fn test_prepare_rejects_bad_settings() {
        assert!(prepare_image(&[], 0, 0.8).is_err());
        assert!(prepare_image(&[], 1200, 1.5).is_err());
    }

    #[wasm_bindgen_test]
    fn test_extract_receipt_with_explicit_date() {
        assert!(extract_receipt("Cafe\nTotal Rs 10", Some("2024-07-01".to_string())).is_ok());
        assert!(extract_receipt("Cafe", Some("yesterday".to_string())).is_err());
    }
}
