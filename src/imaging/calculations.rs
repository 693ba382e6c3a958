//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the height that keeps the source aspect ratio at `target_width`.
///
/// Rounds to the nearest pixel and never returns less than 1, so very wide
/// sources still produce a valid image.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target_width` - Output width in pixels
///
/// # Examples
/// ```
/// # use appiconizer::imaging::height_for_width;
/// // square stays square
/// assert_eq!(height_for_width((512, 512), 48), 48);
///
/// // 2:1 landscape halves the height
/// assert_eq!(height_for_width((1024, 512), 96), 48);
/// ```
pub fn height_for_width(source: (u32, u32), target_width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return 1;
    }
    let h = (src_h as f64 * target_width as f64 / src_w as f64).round() as u32;
    h.max(1)
}
