//! Image processing in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Resample** | `resize_exact` + Lanczos3, height derived from width |
//! | **Encode** | `PngEncoder`, lossless |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Resampler and renderer built on a backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::height_for_width;
pub use operations::{
    Rendition, SourceImage, load_source, render, rendition_filename, resample,
};
pub use params::{PngCompression, ResampleFilter, ResizeParams};
pub use rust_backend::RustBackend;
