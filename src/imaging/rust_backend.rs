//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (adaptive row filters) |

use super::backend::{BackendError, ImageBackend};
use super::params::{PngCompression, ResampleFilter, ResizeParams};
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::borrow::Cow;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

fn compression_type(compression: PngCompression) -> CompressionType {
    match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    }
}

/// PNG has no float sample formats; everything else encodes as-is.
fn png_encodable(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        _ => Cow::Borrowed(image),
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
            })
    }

    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Invalid resize target {}x{}",
                params.width, params.height
            )));
        }
        Ok(image.resize_exact(params.width, params.height, filter_type(params.filter)))
    }

    fn encode_png(
        &self,
        image: &DynamicImage,
        compression: PngCompression,
    ) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let encoder = PngEncoder::new_with_quality(
            &mut buf,
            compression_type(compression),
            PngFilterType::Adaptive,
        );
        png_encodable(image)
            .write_with_encoder(encoder)
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
        Ok(buf)
    }
}
