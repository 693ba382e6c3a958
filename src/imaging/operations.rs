//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They never
//! touch the output filesystem: a [`Rendition`] is an in-memory PNG, and
//! persisting it is the sink's job.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::height_for_width;
use super::params::{PngCompression, ResizeParams};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A decoded source image. Read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

impl SourceImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.image)
    }
}

/// One resized and encoded icon, ready to be handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub width: u32,
    pub height: u32,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Canonical file (or archive entry) name for a width.
pub fn rendition_filename(width: u32) -> String {
    format!("icon_{}.png", width)
}

/// Decode the source image using the backend.
pub fn load_source(backend: &impl ImageBackend, path: &Path) -> Result<SourceImage> {
    let image = backend.decode(path)?;
    Ok(SourceImage {
        path: path.to_path_buf(),
        image,
    })
}

/// Resample to `width`, deriving the height from the source aspect ratio.
///
/// Lanczos3 is used in both directions, so small sources are upscaled with
/// the same kernel used to downscale large ones.
pub fn resample(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    width: u32,
) -> Result<DynamicImage> {
    if width == 0 {
        return Err(BackendError::ProcessingFailed(
            "Target width must be positive".to_string(),
        ));
    }
    let height = height_for_width((image.width(), image.height()), width);
    backend.resize(image, &ResizeParams::lanczos(width, height))
}

/// Resample and PNG-encode one width.
pub fn render(
    backend: &impl ImageBackend,
    source: &SourceImage,
    width: u32,
    compression: PngCompression,
) -> Result<Rendition> {
    let resized = resample(backend, &source.image, width)?;
    let bytes = backend.encode_png(&resized, compression)?;
    Ok(Rendition {
        width: resized.width(),
        height: resized.height(),
        filename: rendition_filename(width),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::gradient_image;

    fn source(width: u32, height: u32) -> SourceImage {
        SourceImage {
            path: PathBuf::from("/icon.png"),
            image: gradient_image(width, height),
        }
    }

    #[test]
    fn rendition_filename_format() {
        assert_eq!(rendition_filename(48), "icon_48.png");
        assert_eq!(rendition_filename(196), "icon_196.png");
    }

    #[test]
    fn load_source_calls_backend() {
        let backend = MockBackend::with_source(1024, 512);
        let src = load_source(&backend, Path::new("/in/icon.png")).unwrap();

        assert_eq!(src.path, PathBuf::from("/in/icon.png"));
        assert_eq!(
            src.dimensions(),
            Dimensions {
                width: 1024,
                height: 512
            }
        );
    }

    #[test]
    fn resample_passes_derived_height_to_backend() {
        let backend = MockBackend::new();
        let img = DynamicImage::new_rgba8(1024, 512);

        resample(&backend, &img, 96).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Resize {
                width: 96,
                height: 48
            }]
        );
    }

    #[test]
    fn resample_zero_width_is_error() {
        let backend = MockBackend::new();
        let img = DynamicImage::new_rgba8(10, 10);

        assert!(resample(&backend, &img, 0).is_err());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn resample_width_is_exact_with_real_backend() {
        let backend = RustBackend::new();
        let img = gradient_image(333, 221);
        for w in [29, 87, 167, 512] {
            let out = resample(&backend, &img, w).unwrap();
            assert_eq!(out.width(), w);
            let expected = 221.0 * w as f64 / 333.0;
            assert!((out.height() as f64 - expected).abs() <= 1.0);
        }
    }

    #[test]
    fn render_resizes_then_encodes() {
        let backend = MockBackend::new();
        let rendition = render(&backend, &source(512, 512), 72, PngCompression::Fast).unwrap();

        assert_eq!(rendition.filename, "icon_72.png");
        assert_eq!((rendition.width, rendition.height), (72, 72));
        assert_eq!(rendition.bytes, b"png:72x72");

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], RecordedOp::Resize { width: 72, .. }));
        assert_eq!(
            ops[1],
            RecordedOp::Encode {
                width: 72,
                compression: PngCompression::Fast
            }
        );
    }

    #[test]
    fn render_propagates_encode_failure() {
        let backend = MockBackend::new().failing_encode_at(48);
        let result = render(&backend, &source(64, 64), 48, PngCompression::Best);
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn render_with_real_backend_decodes_to_declared_size() {
        let backend = RustBackend::new();
        let rendition = render(&backend, &source(1024, 512), 120, PngCompression::Best).unwrap();

        let decoded = image::load_from_memory(&rendition.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 60));
        assert_eq!((rendition.width, rendition.height), (120, 60));
    }
}
