//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three primitives the rendition
//! pipeline needs from an imaging library: decode, resize and PNG encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests swap in a recording mock so pipeline logic can be exercised
//! without real pixels.

use super::params::{PngCompression, ResizeParams};
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared by every render worker.
pub trait ImageBackend: Sync {
    /// Read and decode an image file. Format detection is the backend's job.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Resample to exactly the requested dimensions.
    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Encode as PNG into an in-memory buffer.
    fn encode_png(
        &self,
        image: &DynamicImage,
        compression: PngCompression,
    ) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and returns blank images.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    pub struct MockBackend {
        pub source: Dimensions,
        pub fail_encode_at: Option<u32>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Resize { width: u32, height: u32 },
        Encode { width: u32, compression: PngCompression },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::with_source(512, 512)
        }

        pub fn with_source(width: u32, height: u32) -> Self {
            Self {
                source: Dimensions { width, height },
                fail_encode_at: None,
                operations: Mutex::new(Vec::new()),
            }
        }

        /// Make `encode_png` fail for images of the given width.
        pub fn failing_encode_at(mut self, width: u32) -> Self {
            self.fail_encode_at = Some(width);
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));
            Ok(DynamicImage::new_rgba8(self.source.width, self.source.height))
        }

        fn resize(
            &self,
            _image: &DynamicImage,
            params: &ResizeParams,
        ) -> Result<DynamicImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                width: params.width,
                height: params.height,
            });
            Ok(DynamicImage::new_rgba8(params.width, params.height))
        }

        fn encode_png(
            &self,
            image: &DynamicImage,
            compression: PngCompression,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width: image.width(),
                compression,
            });
            if self.fail_encode_at == Some(image.width()) {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock encode failure at {}px",
                    image.width()
                )));
            }
            Ok(format!("png:{}x{}", image.width(), image.height()).into_bytes())
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_source(800, 600);

        let img = backend.decode(Path::new("/test/icon.png")).unwrap();
        assert_eq!(Dimensions::of(&img), Dimensions { width: 800, height: 600 });

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/test/icon.png"));
    }

    #[test]
    fn mock_records_resize() {
        let backend = MockBackend::new();
        let src = DynamicImage::new_rgba8(10, 10);

        let out = backend
            .resize(&src, &ResizeParams::lanczos(48, 48))
            .unwrap();
        assert_eq!(out.width(), 48);

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Resize {
                width: 48,
                height: 48
            }]
        );
    }

    #[test]
    fn mock_encode_failure_only_at_configured_width() {
        let backend = MockBackend::new().failing_encode_at(72);

        assert!(
            backend
                .encode_png(&DynamicImage::new_rgba8(48, 48), PngCompression::Best)
                .is_ok()
        );
        assert!(
            backend
                .encode_png(&DynamicImage::new_rgba8(72, 72), PngCompression::Best)
                .is_err()
        );
    }
}
