//! Downscaling and re-encoding of receipt photos before upload.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::ImagePrepError;
use crate::models::config::ImageConfig;

/// MIME type of every prepared image.
pub const PREPARED_MIME_TYPE: &str = "image/jpeg";

/// A re-encoded photo ready to be sent to the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl PreparedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        PREPARED_MIME_TYPE
    }

    /// `data:image/jpeg;base64,...` form used in the scan request body.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", PREPARED_MIME_TYPE, STANDARD.encode(&self.bytes))
    }
}

/// Image preparer for the upload path.
#[derive(Debug, Clone)]
pub struct ImagePreparer {
    /// Maximum output width.
    max_width: u32,
    /// JPEG quality in (0.0, 1.0].
    quality: f32,
}

impl ImagePreparer {
    /// Create a preparer with default settings (1200px, quality 0.8).
    pub fn new() -> Self {
        Self::from_config(&ImageConfig::default())
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            max_width: config.max_width.max(1),
            quality: config.quality,
        }
    }

    /// Set maximum output width.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = width.max(1);
        self
    }

    /// Set lossy quality in (0.0, 1.0].
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    /// Quality on the JPEG encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Output size for an input of `width` x `height`.
    ///
    /// Images wider than the maximum are scaled down to it, with the height
    /// scaled by the same factor and rounded. Narrower images keep their size.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width {
            return (width, height);
        }

        let scaled = (height as f64 * self.max_width as f64 / width as f64).round() as u32;
        (self.max_width, scaled.max(1))
    }

    /// Decode, downscale and re-encode an encoded image file.
    pub fn prepare(&self, data: &[u8]) -> Result<PreparedImage, ImagePrepError> {
        let image =
            image::load_from_memory(data).map_err(|e| ImagePrepError::Decode(e.to_string()))?;
        self.prepare_image(&image)
    }

    /// Downscale and re-encode an already decoded image.
    pub fn prepare_image(&self, image: &DynamicImage) -> Result<PreparedImage, ImagePrepError> {
        let (orig_width, orig_height) = image.dimensions();
        if orig_width == 0 || orig_height == 0 {
            return Err(ImagePrepError::InvalidDimensions {
                width: orig_width,
                height: orig_height,
            });
        }

        let (width, height) = self.target_dimensions(orig_width, orig_height);
        debug!(
            "Preparing image {}x{} -> {}x{} (quality {})",
            orig_width,
            orig_height,
            width,
            height,
            self.jpeg_quality()
        );

        let rgb = if (width, height) == (orig_width, orig_height) {
            image.to_rgb8()
        } else {
            image.resize_exact(width, height, FilterType::Triangle).to_rgb8()
        };

        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality());
        encoder
            .encode_image(&rgb)
            .map_err(|e| ImagePrepError::Encode(e.to_string()))?;

        Ok(PreparedImage {
            bytes,
            width,
            height,
        })
    }
}

impl Default for ImagePreparer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_target_dimensions() {
        let preparer = ImagePreparer::new();
        assert_eq!(preparer.target_dimensions(3000, 2000), (1200, 800));
        assert_eq!(preparer.target_dimensions(800, 600), (800, 600));
        assert_eq!(preparer.target_dimensions(1200, 5), (1200, 5));
        // 1000 * 1200 / 1333 = 900.22
        assert_eq!(preparer.target_dimensions(1333, 1000), (1200, 900));
        assert_eq!(preparer.target_dimensions(100_000, 10), (1200, 1));
    }

    #[test]
    fn test_jpeg_quality() {
        assert_eq!(ImagePreparer::new().jpeg_quality(), 80);
        assert_eq!(ImagePreparer::new().with_quality(1.0).jpeg_quality(), 100);
        assert_eq!(ImagePreparer::new().with_quality(0.001).jpeg_quality(), 1);
    }

    #[test]
    fn test_large_image_is_downscaled_to_jpeg() {
        let preparer = ImagePreparer::new();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3000, 2000, Rgb([240, 240, 230])));

        let prepared = preparer.prepare_image(&img).unwrap();
        assert_eq!((prepared.width(), prepared.height()), (1200, 800));
        assert_eq!(image::guess_format(prepared.bytes()).unwrap(), ImageFormat::Jpeg);

        let decoded = image::load_from_memory(prepared.bytes()).unwrap();
        assert_eq!(decoded.dimensions(), (1200, 800));
    }

    #[test]
    fn test_small_png_with_alpha_is_reencoded() {
        let preparer = ImagePreparer::new();
        let input = png_bytes(64, 48);

        let prepared = preparer.prepare(&input).unwrap();
        assert_eq!((prepared.width(), prepared.height()), (64, 48));
        assert_eq!(prepared.mime_type(), "image/jpeg");
        assert_ne!(prepared.bytes(), input.as_slice());
        assert_eq!(image::guess_format(prepared.bytes()).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_corrupt_input_is_an_error() {
        let preparer = ImagePreparer::new();
        let err = preparer.prepare(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImagePrepError::Decode(_)));

        let mut truncated = png_bytes(32, 32);
        truncated.truncate(40);
        assert!(preparer.prepare(&truncated).is_err());
    }

    #[test]
    fn test_data_url() {
        let prepared = ImagePreparer::new()
            .prepare_image(&DynamicImage::ImageRgb8(RgbImage::new(4, 4)))
            .unwrap();
        let url = prepared.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,/9j/"));
    }
}
