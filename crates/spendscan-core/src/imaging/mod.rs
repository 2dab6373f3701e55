//! Photo preparation for receipt upload.

mod prepare;

pub use prepare::{ImagePreparer, PreparedImage, PREPARED_MIME_TYPE};
