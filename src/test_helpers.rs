//! Shared test utilities for the appiconizer test suite.
//!
//! Provides synthetic source images, output lookups that panic with a clear
//! message on miss, and archive readers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let source = tmp.path().join("icon.png");
//! write_test_png(&source, 512, 512);
//!
//! // ... run the pipeline into tmp ...
//!
//! let archive = find_output(tmp.path(), OutputKind::Archive);
//! assert_eq!(zip_entry_names(&archive), vec!["icon_48.png", "icon_72.png"]);
//! ```

use image::{DynamicImage, ImageEncoder, RgbImage, RgbaImage};
use std::io::Read;
use std::path::{Path, PathBuf};

// =========================================================================
// Synthetic images
// =========================================================================

/// A deterministic RGBA gradient with some alpha variation.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([
            (x % 256) as u8,
            (y % 256) as u8,
            ((x + y) % 256) as u8,
            255 - ((x * y) % 128) as u8,
        ])
    }))
}

/// Write a PNG source image with the given dimensions.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a small valid JPEG file with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

// =========================================================================
// Output lookups panic with a clear message on a miss
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Directory,
    Archive,
}

/// Find the single generated output inside `parent`. Panics unless exactly one exists.
pub fn find_output(parent: &Path, kind: OutputKind) -> PathBuf {
    let matches: Vec<PathBuf> = std::fs::read_dir(parent)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            let is_output = p
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("appiconizer "));
            let right_kind = match kind {
                OutputKind::Directory => p.is_dir(),
                OutputKind::Archive => p.extension().is_some_and(|e| e == "zip"),
            };
            is_output && right_kind
        })
        .collect();
    assert_eq!(
        matches.len(),
        1,
        "expected exactly one {kind:?} output in {}, found {matches:?}",
        parent.display()
    );
    matches.into_iter().next().unwrap()
}

/// Sorted file names inside a directory.
pub fn dir_entry_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =========================================================================
// Archive readers
// =========================================================================

/// Entry names in central-directory order.
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Raw bytes of one archive entry. Panics if missing.
pub fn read_zip_entry(path: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("entry '{name}' not in {}: {e}", path.display()));
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    bytes
}
