//! # appiconizer
//!
//! Generates the full set of iOS and/or Android app icon renditions from one
//! source image, written either as loose PNG files in a directory or as a
//! single zip archive.
//!
//! # Architecture: Rendition Pipeline
//!
//! ```text
//! source image ─► decode ─► for each width: resample ─► PNG encode ─► sink
//!                              (size catalog)                     (dir | zip)
//! ```
//!
//! Decoding, resampling and encoding are pure in-memory steps; only the sink
//! touches the output filesystem. That keeps everything up to the sink
//! testable without temp directories, and lets renders run in parallel while
//! the sink sees exactly one writer.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Platform profiles and their ordered icon widths |
//! | [`imaging`] | Backend trait, Lanczos resampler, PNG renderer |
//! | [`sink`] | Directory and zip output behind one `Sink` trait |
//! | [`pipeline`] | Orchestrates decode → resolve → render → finalize |
//! | [`config`] | `appiconizer.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting for progress and size listings |
//!
//! # Design Decisions
//!
//! ## Unknown Profiles Are Errors
//!
//! A profile string that is not `ios`, `android` or `all` is rejected when
//! parsed. Falling back to a default would silently produce the wrong icon
//! set. The default profile (`all`) applies only when no profile is given.
//!
//! ## One File Name Per Width
//!
//! Renditions are named `icon_<width>.png`. The `all` profile lists 48px for
//! both platforms; it is rendered once, so archives never contain duplicate
//! entries. Its widths come in a fixed combined order (the Android sizes sit
//! between iOS 167px and the newer 172px and 196px), which is also the
//! archive entry order.
//!
//! ## Fresh Output Every Run
//!
//! Output goes to `appiconizer <YYYY-MM-DD HH.MM.SS>` (plus `.zip` in archive
//! mode). An existing path is never reused, so a run can't mix its icons
//! with another run's.
//!
//! ## Typed Failures
//!
//! Every failure is a [`pipeline::PipelineError`] carrying the source path,
//! failing width and destination as applicable. Nothing in the library exits
//! the process.

pub mod catalog;
pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod sink;

pub use pipeline::{PipelineConfig, PipelineError, RunOutput, RunRequest, RunResult, generate_icons};

#[cfg(test)]
pub(crate) mod test_helpers;
