//! Async receipt pipeline.
//!
//! A receipt goes through named stages, each with its own result type:
//! `prepare` -> [`PreparedImage`], `recognize` -> [`RecognizedReceipt`],
//! `extract` -> [`ExtractionResult`], `review` -> [`ReviewedExpense`], and
//! finally `submit`.

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{AddExpenseRequest, AddExpenseResponse, ExpenseBackend};
use crate::error::{ApiError, ImagePrepError, Result, ValidationError};
use crate::imaging::{ImagePreparer, PreparedImage};
use crate::models::config::SpendConfig;
use crate::models::expense::{ExpenseLedger, ReviewedExpense};
use crate::receipt::{ExtractionResult, ReceiptExtractor, RecognizedReceipt};
use crate::session::FormSession;

/// Runs receipt stages against an [`ExpenseBackend`].
pub struct ReceiptPipeline<B> {
    backend: B,
    preparer: ImagePreparer,
    extractor: ReceiptExtractor,
}

impl<B: ExpenseBackend> ReceiptPipeline<B> {
    /// Pipeline with default image and extraction settings.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            preparer: ImagePreparer::new(),
            extractor: ReceiptExtractor::new(),
        }
    }

    pub fn from_config(backend: B, config: &SpendConfig) -> Self {
        Self {
            backend,
            preparer: ImagePreparer::from_config(&config.image),
            extractor: ReceiptExtractor::from_config(&config.extraction),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Downscale and re-encode a photo on the blocking pool.
    pub async fn prepare(&self, bytes: Vec<u8>) -> std::result::Result<PreparedImage, ImagePrepError> {
        let preparer = self.preparer.clone();
        tokio::task::spawn_blocking(move || preparer.prepare(&bytes))
            .await
            .map_err(|e| ImagePrepError::Task(e.to_string()))?
    }

    /// Send a prepared photo to the recognizer.
    pub async fn recognize(
        &self,
        image: &PreparedImage,
    ) -> std::result::Result<RecognizedReceipt, ApiError> {
        let payload = self.backend.scan_receipt(image).await?;
        Ok(RecognizedReceipt::from(payload))
    }

    pub fn extract(&self, receipt: &RecognizedReceipt, today: NaiveDate) -> ExtractionResult {
        self.extractor.extract_recognized(receipt, today)
    }

    pub fn review(
        &self,
        result: ExtractionResult,
        today: NaiveDate,
    ) -> std::result::Result<ReviewedExpense, ValidationError> {
        ReviewedExpense::from_candidate(result.candidate, today)
    }

    pub async fn submit(
        &self,
        request: &AddExpenseRequest,
    ) -> std::result::Result<AddExpenseResponse, ApiError> {
        info!("Submitting expense for {}", request.user_id());
        self.backend.add_expense(request).await
    }

    /// Fetch a user's expenses, newest first.
    pub async fn list(&self, user_id: &str) -> Result<ExpenseLedger> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ValidationError::MissingUserId.into());
        }
        let records = self.backend.list_expenses(user_id).await?;
        debug!("Fetched {} expenses for {}", records.len(), user_id);
        Ok(ExpenseLedger::from_records(records))
    }

    /// Prepare, recognize and extract one photo.
    pub async fn scan(&self, bytes: Vec<u8>, today: NaiveDate) -> Result<ExtractionResult> {
        let image = self.prepare(bytes).await?;
        info!(
            "Prepared receipt image {}x{} ({} bytes)",
            image.width(),
            image.height(),
            image.bytes().len()
        );
        let receipt = self.recognize(&image).await?;
        let result = self.extract(&receipt, today);
        for warning in &result.warnings {
            debug!("Extraction: {}", warning);
        }
        Ok(result)
    }

    /// Scan a photo and store the result in the session's candidate slot.
    ///
    /// The scan holds a ticket taken when it starts. If another scan starts
    /// or the user cancels before this one finishes, the result is dropped
    /// and `Ok(false)` is returned.
    pub async fn scan_into_session(
        &self,
        session: &Mutex<FormSession>,
        bytes: Vec<u8>,
        today: NaiveDate,
    ) -> Result<bool> {
        let ticket = session.lock().await.begin_scan();

        match self.scan(bytes, today).await {
            Ok(result) => Ok(session.lock().await.complete_scan(ticket, result)),
            Err(e) => {
                if session.lock().await.fail_scan(ticket) {
                    warn!("Receipt scan failed: {}", e);
                    Err(e)
                } else {
                    debug!("Ignoring failure of superseded scan: {}", e);
                    Ok(false)
                }
            }
        }
    }

    /// Review the session's candidate and submit it.
    ///
    /// The candidate leaves the slot only once the backend has stored it, so
    /// a failed save can be confirmed again.
    pub async fn confirm_session(
        &self,
        session: &Mutex<FormSession>,
        today: NaiveDate,
    ) -> Result<(ReviewedExpense, AddExpenseResponse)> {
        let confirmed = session.lock().await.confirm_candidate(today)?;
        let response = self.submit(&confirmed.request).await?;
        if !session.lock().await.receipt_submitted(confirmed.ticket) {
            debug!("Slot changed while the receipt was being saved");
        }
        Ok((confirmed.reviewed, response))
    }

    /// Submit the session's quick or natural-language form.
    ///
    /// On success the draft of the mode that was submitted is reset, even if
    /// the user has switched modes in the meantime.
    pub async fn submit_session(
        &self,
        session: &Mutex<FormSession>,
        today: NaiveDate,
    ) -> Result<AddExpenseResponse> {
        let (mode, request) = {
            let guard = session.lock().await;
            (guard.mode(), guard.build_submission()?)
        };
        let response = self.submit(&request).await?;
        session.lock().await.submission_succeeded(mode, today);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScanPayload;
    use crate::error::SpendError;
    use crate::models::expense::{Category, ExpenseRecord};
    use crate::session::EntryMode;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::io::Cursor;
    use std::sync::Mutex as StdMutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn photo(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([250, 250, 245]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[derive(Default)]
    struct FakeBackend {
        scan: ScanPayload,
        scan_error: Option<String>,
        add_error: Option<(u16, String)>,
        records: Vec<ExpenseRecord>,
        added: StdMutex<Vec<AddExpenseRequest>>,
        scanned_widths: StdMutex<Vec<u32>>,
    }

    #[async_trait]
    impl ExpenseBackend for FakeBackend {
        async fn add_expense(
            &self,
            request: &AddExpenseRequest,
        ) -> std::result::Result<AddExpenseResponse, ApiError> {
            if let Some((status, message)) = &self.add_error {
                return Err(ApiError::Backend {
                    status: *status,
                    message: message.clone(),
                });
            }
            self.added.lock().unwrap().push(request.clone());
            Ok(AddExpenseResponse {
                status: Some("success".to_string()),
                data: serde_json::Value::Null,
            })
        }

        async fn list_expenses(
            &self,
            _user_id: &str,
        ) -> std::result::Result<Vec<ExpenseRecord>, ApiError> {
            Ok(self.records.clone())
        }

        async fn scan_receipt(
            &self,
            image: &PreparedImage,
        ) -> std::result::Result<ScanPayload, ApiError> {
            self.scanned_widths.lock().unwrap().push(image.width());
            match &self.scan_error {
                Some(message) => Err(ApiError::Recognition(message.clone())),
                None => Ok(self.scan.clone()),
            }
        }
    }

    fn backend_with_text(text: &str) -> FakeBackend {
        FakeBackend {
            scan: ScanPayload {
                text: Some(text.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scan_prepares_before_recognizing() {
        let pipeline = ReceiptPipeline::new(backend_with_text(
            "Fresh Mart\n02/06/2024\nGroceries\nTotal: ₹ 640.00",
        ));
        let result = pipeline.scan(photo(2400, 1200), today()).await.unwrap();

        assert_eq!(*pipeline.backend().scanned_widths.lock().unwrap(), vec![1200]);
        assert_eq!(result.candidate.amount, Some(Decimal::new(64000, 2)));
        assert_eq!(result.candidate.description.as_deref(), Some("Fresh Mart"));
        assert_eq!(result.candidate.category, Some(Category::Food));
    }

    #[tokio::test]
    async fn test_unreadable_photo_never_reaches_backend() {
        let pipeline = ReceiptPipeline::new(FakeBackend::default());
        let err = pipeline.scan(b"not an image".to_vec(), today()).await.unwrap_err();
        assert!(matches!(err, SpendError::Image(ImagePrepError::Decode(_))));
        assert!(pipeline.backend().scanned_widths.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_confirm_submit() {
        let pipeline = ReceiptPipeline::new(backend_with_text(
            "Cafe Mocha\n15/06/2024\nCoffee x2\nTotal Rs. 360",
        ));
        let session = Mutex::new(FormSession::new(today()));
        session.lock().await.set_user_id("u42");

        assert!(pipeline
            .scan_into_session(&session, photo(100, 200), today())
            .await
            .unwrap());

        let (reviewed, response) = pipeline.confirm_session(&session, today()).await.unwrap();
        assert_eq!(response.status.as_deref(), Some("success"));
        assert_eq!(
            reviewed,
            ReviewedExpense {
                amount: Decimal::new(360, 0),
                category: Category::Food,
                date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                description: "Cafe Mocha".to_string(),
            }
        );
        let added = pipeline.backend().added.lock().unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].user_id(), "u42");
        assert!(session.lock().await.slot().current().is_none());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_candidate_for_retry() {
        let mut backend = backend_with_text("Cafe Mocha\n15/06/2024\nTotal Rs. 360");
        backend.add_error = Some((503, "Service unavailable".to_string()));
        let pipeline = ReceiptPipeline::new(backend);
        let session = Mutex::new(FormSession::new(today()));
        session.lock().await.set_user_id("u42");

        assert!(pipeline
            .scan_into_session(&session, photo(40, 40), today())
            .await
            .unwrap());

        let err = pipeline.confirm_session(&session, today()).await.unwrap_err();
        assert!(matches!(
            err,
            SpendError::Api(ApiError::Backend { status: 503, .. })
        ));
        assert!(err.is_recoverable());
        assert!(session.lock().await.slot().current().is_some());

        let retry = pipeline.confirm_session(&session, today()).await.unwrap_err();
        assert!(matches!(retry, SpendError::Api(_)));
        assert!(session.lock().await.slot().current().is_some());
    }

    #[tokio::test]
    async fn test_submit_session_resets_submitted_draft() {
        let pipeline = ReceiptPipeline::new(FakeBackend::default());
        let session = Mutex::new(FormSession::new(today()));
        {
            let mut guard = session.lock().await;
            guard.set_user_id("u7");
            guard.switch_mode(EntryMode::NaturalLanguage);
            guard.set_natural_text("auto fare 80");
        }

        let response = pipeline.submit_session(&session, today()).await.unwrap();
        assert_eq!(response.status.as_deref(), Some("success"));
        assert_eq!(session.lock().await.natural_text(), "");
        assert_eq!(pipeline.backend().added.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_form_save_keeps_draft() {
        let pipeline = ReceiptPipeline::new(FakeBackend {
            add_error: Some((500, "Database error".to_string())),
            ..Default::default()
        });
        let session = Mutex::new(FormSession::new(today()));
        {
            let mut guard = session.lock().await;
            guard.set_user_id("u7");
            guard.quick_mut().amount = "120".to_string();
            guard.quick_mut().set_description("movie tickets");
        }

        assert!(pipeline.submit_session(&session, today()).await.is_err());
        assert_eq!(session.lock().await.quick().amount, "120");
    }

    #[tokio::test]
    async fn test_superseded_scan_is_dropped() {
        let pipeline = ReceiptPipeline::new(backend_with_text("Metro Store\nTotal: Rs 99"));
        let session = Mutex::new(FormSession::new(today()));

        let (first, second) = tokio::join!(
            pipeline.scan_into_session(&session, photo(50, 50), today()),
            pipeline.scan_into_session(&session, photo(60, 60), today()),
        );
        assert!(!first.unwrap());
        assert!(second.unwrap());
        assert!(session.lock().await.slot().current().is_some());
    }

    #[tokio::test]
    async fn test_recognition_failure_clears_pending() {
        let pipeline = ReceiptPipeline::new(FakeBackend {
            scan_error: Some("Failed to process receipt".to_string()),
            ..Default::default()
        });
        let session = Mutex::new(FormSession::new(today()));

        let err = pipeline
            .scan_into_session(&session, photo(10, 10), today())
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
        let guard = session.lock().await;
        assert!(!guard.slot().is_pending());
        assert!(guard.slot().current().is_none());
    }

    #[tokio::test]
    async fn test_confirm_without_candidate() {
        let pipeline = ReceiptPipeline::new(FakeBackend::default());
        let session = Mutex::new(FormSession::new(today()));
        session.lock().await.set_user_id("u1");

        let err = pipeline.confirm_session(&session, today()).await.unwrap_err();
        assert!(matches!(
            err,
            SpendError::Validation(ValidationError::NoCandidate)
        ));
        assert!(pipeline.backend().added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sorts_newest_first() {
        let record = |d: u32, amount: i64| ExpenseRecord {
            amount: Decimal::from(amount),
            category: "Food".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            description: format!("day {}", d),
        };
        let pipeline = ReceiptPipeline::new(FakeBackend {
            records: vec![record(1, 10), record(20, 30), record(5, 20)],
            ..Default::default()
        });

        let ledger = pipeline.list("u1").await.unwrap();
        let days: Vec<_> = ledger.records().iter().map(|r| r.description.as_str()).collect();
        assert_eq!(days, vec!["day 20", "day 5", "day 1"]);
        assert_eq!(ledger.total(), Decimal::from(60));

        assert!(matches!(
            pipeline.list("  ").await.unwrap_err(),
            SpendError::Validation(ValidationError::MissingUserId)
        ));
    }
}
