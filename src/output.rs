//! CLI output formatting.
//!
//! # Output Format
//!
//! ## create
//!
//! ```text
//! ==> Rendering 5 icons (android) from art/icon.png
//!     Output: art/appiconizer 2026-10-19 14.03.27
//! 001 created icon_48.png (48x48)
//! 002 created icon_72.png (72x72)
//! ...
//! ***Done*** 5 icons → art/appiconizer 2026-10-19 14.03.27
//! ```
//!
//! ## sizes
//!
//! ```text
//! android (5 sizes)
//!     001 48px → icon_48.png
//!     002 72px → icon_72.png
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::catalog::{PlatformProfile, SizeSet};
use crate::imaging::rendition_filename;
use crate::pipeline::PipelineEvent;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// create
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Started {
            source,
            profile,
            destination,
            total,
        } => vec![
            format!(
                "==> Rendering {} ({}) from {}",
                plural(*total, "icon"),
                profile,
                source.display()
            ),
            format!("    Output: {}", destination.display()),
        ],
        PipelineEvent::RenditionWritten {
            index,
            filename,
            width,
            height,
            ..
        } => vec![format!(
            "{} created {} ({}x{})",
            format_index(*index),
            filename,
            width,
            height
        )],
        PipelineEvent::Finished { destination, count } => vec![format!(
            "***Done*** {} \u{2192} {}",
            plural(*count, "icon"),
            destination.display()
        )],
    }
}

/// Print a pipeline event to stdout.
pub fn print_pipeline_event(event: &PipelineEvent) {
    for line in format_pipeline_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// sizes
// ============================================================================

/// Format the widths a profile renders, with the file each one produces.
pub fn format_sizes(profile: PlatformProfile, sizes: &SizeSet) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", profile, plural(sizes.len(), "size"))];
    for (i, width) in sizes.widths().iter().enumerate() {
        lines.push(format!(
            "    {} {}px \u{2192} {}",
            format_index(i + 1),
            width,
            rendition_filename(*width)
        ));
    }
    lines
}

/// Print size listings to stdout.
pub fn print_sizes(profile: PlatformProfile, sizes: &SizeSet) {
    for line in format_sizes(profile, sizes) {
        println!("{}", line);
    }
}
