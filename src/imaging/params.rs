//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! and the [`backend`](super::backend), which does the pixel work.
//!
//! ## Types
//!
//! - [`PngCompression`]: zlib effort for the lossless PNG encoder. Never
//!   changes pixels, only file size and encode time.
//! - [`ResampleFilter`]: interpolation kernel; icons always use Lanczos3.
//! - [`ResizeParams`]: exact output dimensions plus filter.

use serde::{Deserialize, Serialize};

/// PNG compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

impl PngCompression {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Default => "default",
            Self::Best => "best",
        }
    }
}

/// Resampling kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleFilter {
    Lanczos3,
}

/// Parameters for an exact-size resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub filter: ResampleFilter,
}

impl ResizeParams {
    pub fn lanczos(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: ResampleFilter::Lanczos3,
        }
    }
}
