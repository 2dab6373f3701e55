//! Error types for the spendscan-core library.

use thiserror::Error;

/// Main error type for the spendscan library.
#[derive(Error, Debug)]
pub enum SpendError {
    /// Image preparation error.
    #[error("image error: {0}")]
    Image(#[from] ImagePrepError),

    /// Backend or transport error.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    /// Form validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SpendError {
    /// Whether the user should be offered a retry or manual entry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SpendError::Image(_) | SpendError::Api(_) | SpendError::Validation(_)
        )
    }
}

/// Errors raised while downscaling and re-encoding a photo.
#[derive(Error, Debug)]
pub enum ImagePrepError {
    /// The input bytes could not be decoded as an image.
    #[error("unreadable image: {0}")]
    Decode(String),

    /// Re-encoding the resized image failed.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// The decoded image has no pixels.
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The preparation task was aborted before finishing.
    #[error("preparation task failed: {0}")]
    Task(String),
}

/// Errors from the expense backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response.
    #[cfg(feature = "native")]
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The recognizer could not read the receipt.
    #[error("receipt recognition failed: {0}")]
    Recognition(String),
}

/// Errors raised before a submission leaves the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No user identifier was entered.
    #[error("please enter a user id")]
    MissingUserId,

    /// A required field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The amount is not a number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The amount is zero or negative.
    #[error("amount must be greater than 0")]
    NonPositiveAmount,

    /// Natural-language mode with nothing typed.
    #[error("please describe your expense")]
    EmptyDescription,

    /// Confirm was requested with no candidate in the slot.
    #[error("no receipt data to save")]
    NoCandidate,
}

/// Result type for the spendscan library.
pub type Result<T> = std::result::Result<T, SpendError>;
