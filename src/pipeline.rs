//! Rendition pipeline.
//!
//! Turns one source image into the full icon set for a platform profile and
//! hands every rendition to a [`Sink`].
//!
//! ```text
//! Decoding ──► Resolving ──► Rendering(1..n) ──► Finalizing ──► Done
//!    │             │               │                  │
//!    └─────────────┴───────────────┴──────────────────┴──► Failed
//! ```
//!
//! - **Decoding**: a missing source is [`PipelineError::SourceNotFound`], an
//!   undecodable one [`PipelineError::Decode`]. Nothing is written yet.
//! - **Resolving**: the profile becomes a [`SizeSet`] (duplicates collapsed),
//!   and the destination parent is the explicit target or the source's
//!   directory.
//! - **Rendering**: the catalog is walked in batches as wide as the local
//!   rayon pool. Each batch is resized and encoded in parallel, then written
//!   one at a time, in catalog order, from the calling thread, before the next
//!   batch starts. The sink only ever has one writer, and a failure stops the
//!   renders that have not started yet.
//! - **Finalizing**: the sink is closed. An archive that fails to close is a
//!   failed run even though its entries were written.
//!
//! Any failure after the sink is opened still closes it before the error is
//! returned. Those errors name the destination because partial output can
//! remain there.
//!
//! ## Progress and cancellation
//!
//! Progress is reported as [`PipelineEvent`]s over an optional channel. A
//! [`CancelToken`] is checked before every render and every write;
//! cancelling closes the sink cleanly and returns
//! [`PipelineError::Cancelled`].

use crate::catalog::{self, PlatformProfile, SizeSet, UnknownProfileError};
use crate::config::{IconizerConfig, effective_threads};
use crate::imaging::{
    BackendError, ImageBackend, PngCompression, Rendition, RustBackend, SourceImage, load_source,
    render,
};
use crate::sink::{self, PackagingMode, Sink, SinkError};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode { path: PathBuf, source: BackendError },
    #[error(transparent)]
    UnknownProfile(#[from] UnknownProfileError),
    #[error("Failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Cannot create {}: {source}", .destination.display())]
    SinkOpen {
        destination: PathBuf,
        source: SinkError,
    },
    #[error(
        "Failed to render {width}px icon from {}: {source} (partial output may remain in {})",
        .source_path.display(),
        .destination.display()
    )]
    Render {
        source_path: PathBuf,
        width: u32,
        destination: PathBuf,
        source: BackendError,
    },
    #[error(
        "Failed to write {filename} ({width}px): {source} (partial output may remain in {})",
        .destination.display()
    )]
    SinkWrite {
        width: u32,
        filename: String,
        destination: PathBuf,
        source: SinkError,
    },
    #[error("Failed to finalize {}: {source}", .destination.display())]
    Finalize {
        destination: PathBuf,
        source: SinkError,
    },
    #[error("Cancelled (partial output may remain in {})", .destination.display())]
    Cancelled { destination: PathBuf },
}

/// Everything that identifies one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub source: PathBuf,
    /// Directory receiving the output; `None` means next to the source.
    pub target: Option<PathBuf>,
    pub profile: PlatformProfile,
    pub packaging: PackagingMode,
}

impl RunRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        target: Option<PathBuf>,
        profile: PlatformProfile,
        packaging: PackagingMode,
    ) -> Self {
        Self {
            source: source.into(),
            target,
            profile,
            packaging,
        }
    }

    /// Where the output directory or archive is created.
    pub fn output_parent(&self) -> PathBuf {
        if let Some(target) = &self.target {
            return target.clone();
        }
        self.source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Per-run settings. Passed explicitly; the pipeline reads no global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub threads: usize,
    pub png_compression: PngCompression,
    pub prefix: String,
}

impl PipelineConfig {
    pub fn from_config(config: &IconizerConfig) -> Self {
        Self {
            threads: effective_threads(&config.processing),
            png_compression: config.output.png_compression,
            prefix: config.output.prefix.clone(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&IconizerConfig::default())
    }
}

/// Cooperative cancellation flag shared between a caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress report sent while a run executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Started {
        source: PathBuf,
        profile: PlatformProfile,
        destination: PathBuf,
        total: usize,
    },
    RenditionWritten {
        /// 1-based position in catalog order.
        index: usize,
        total: usize,
        filename: String,
        width: u32,
        height: u32,
    },
    Finished {
        destination: PathBuf,
        count: usize,
    },
}

/// A rendition that reached the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRendition {
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

/// Successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub destination: PathBuf,
    pub profile: PlatformProfile,
    pub renditions: Vec<WrittenRendition>,
}

pub type RunResult = Result<RunOutput, PipelineError>;

/// Generate icons from plain arguments.
///
/// The profile string is parsed before anything touches the filesystem, so
/// an unknown profile leaves no trace.
pub fn generate_icons(
    source: &Path,
    target: Option<&Path>,
    profile: &str,
    package_as_archive: bool,
    config: &PipelineConfig,
) -> RunResult {
    let profile: PlatformProfile = profile.parse()?;
    let packaging = if package_as_archive {
        PackagingMode::Archive
    } else {
        PackagingMode::Directory
    };
    let request = RunRequest::new(source, target.map(Path::to_path_buf), profile, packaging);
    run(&request, config, None, &CancelToken::new())
}

/// Run with the production backend, stamped with the local time.
pub fn run(
    request: &RunRequest,
    config: &PipelineConfig,
    events: Option<Sender<PipelineEvent>>,
    cancel: &CancelToken,
) -> RunResult {
    let backend = RustBackend::new();
    let now = chrono::Local::now().naive_local();
    run_with_backend(&backend, request, config, now, events, cancel)
}

/// Run using a specific backend and timestamp (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    request: &RunRequest,
    config: &PipelineConfig,
    timestamp: NaiveDateTime,
    events: Option<Sender<PipelineEvent>>,
    cancel: &CancelToken,
) -> RunResult {
    // Decoding
    if !request.source.exists() {
        return Err(PipelineError::SourceNotFound(request.source.clone()));
    }
    let source = load_source(backend, &request.source).map_err(|e| PipelineError::Decode {
        path: request.source.clone(),
        source: e,
    })?;
    let dims = source.dimensions();
    log::info!(
        "decoded {} ({}x{})",
        request.source.display(),
        dims.width,
        dims.height
    );

    // Resolving
    let sizes = catalog::resolve(request.profile).distinct();
    let parent = request.output_parent();
    let name = sink::output_name(&config.prefix, timestamp);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    log::debug!(
        "profile {} resolved to {} widths, {} workers",
        request.profile,
        sizes.len(),
        config.threads
    );

    let destination = sink::destination_path(request.packaging, &parent, &name);
    let sink = sink::open_sink(request.packaging, &parent, &name).map_err(|e| {
        PipelineError::SinkOpen {
            destination: destination.clone(),
            source: e,
        }
    })?;

    emit(
        &events,
        PipelineEvent::Started {
            source: request.source.clone(),
            profile: request.profile,
            destination,
            total: sizes.len(),
        },
    );

    let job = RenderJob {
        backend,
        source: &source,
        sizes: &sizes,
        compression: config.png_compression,
        pool: &pool,
    };
    let (destination, renditions) = fill_sink(&job, sink, &events, cancel)?;

    Ok(RunOutput {
        destination,
        profile: request.profile,
        renditions,
    })
}

/// What to render, and where the parallel work runs.
struct RenderJob<'a, B> {
    backend: &'a B,
    source: &'a SourceImage,
    sizes: &'a SizeSet,
    compression: PngCompression,
    pool: &'a rayon::ThreadPool,
}

/// Rendering and Finalizing: write every width into `sink`, then close it.
///
/// The sink is closed on every path. `Finished` is sent only after a
/// successful close.
fn fill_sink<B: ImageBackend>(
    job: &RenderJob<'_, B>,
    mut sink: Box<dyn Sink>,
    events: &Option<Sender<PipelineEvent>>,
    cancel: &CancelToken,
) -> Result<(PathBuf, Vec<WrittenRendition>), PipelineError> {
    let destination = sink.destination().to_path_buf();
    let written = match write_batches(job, sink.as_mut(), events, cancel) {
        Ok(written) => written,
        Err(err) => {
            if let Err(close_err) = sink.close() {
                log::warn!(
                    "failed to close {} after error: {}",
                    destination.display(),
                    close_err
                );
            }
            return Err(err);
        }
    };

    let destination = sink.close().map_err(|e| PipelineError::Finalize {
        destination: destination.clone(),
        source: e,
    })?;

    emit(
        events,
        PipelineEvent::Finished {
            destination: destination.clone(),
            count: written.len(),
        },
    );
    Ok((destination, written))
}

/// Render one batch per pool-width slice of the catalog and write it before
/// rendering the next, so a failure or cancel stops the remaining renders.
fn write_batches<B: ImageBackend>(
    job: &RenderJob<'_, B>,
    sink: &mut dyn Sink,
    events: &Option<Sender<PipelineEvent>>,
    cancel: &CancelToken,
) -> Result<Vec<WrittenRendition>, PipelineError> {
    let total = job.sizes.len();
    let mut writer = Writer {
        sink,
        source_path: &job.source.path,
        events,
        total,
        written: Vec::with_capacity(total),
    };
    let batch = job.pool.current_num_threads().max(1);
    for widths in job.sizes.widths().chunks(batch) {
        writer.write_batch(render_batch(job, widths, cancel), cancel)?;
    }
    Ok(writer.written)
}

/// Outcome of rendering one width.
#[derive(Debug)]
enum Rendered {
    Done(Rendition),
    Failed { width: u32, error: BackendError },
    Skipped,
}

/// Render `widths` in parallel. The result keeps their order.
fn render_batch<B: ImageBackend>(
    job: &RenderJob<'_, B>,
    widths: &[u32],
    cancel: &CancelToken,
) -> Vec<Rendered> {
    job.pool.install(|| {
        widths
            .par_iter()
            .map(|&width| {
                if cancel.is_cancelled() {
                    return Rendered::Skipped;
                }
                match render(job.backend, job.source, width, job.compression) {
                    Ok(rendition) => Rendered::Done(rendition),
                    Err(error) => Rendered::Failed { width, error },
                }
            })
            .collect()
    })
}

/// The single writer of a run.
struct Writer<'a> {
    sink: &'a mut dyn Sink,
    source_path: &'a Path,
    events: &'a Option<Sender<PipelineEvent>>,
    total: usize,
    written: Vec<WrittenRendition>,
}

impl Writer<'_> {
    /// Write renditions in order, stopping at the first failure.
    fn write_batch(
        &mut self,
        rendered: Vec<Rendered>,
        cancel: &CancelToken,
    ) -> Result<(), PipelineError> {
        for item in rendered {
            let destination = self.sink.destination().to_path_buf();
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled { destination });
            }
            let rendition = match item {
                Rendered::Done(rendition) => rendition,
                Rendered::Failed { width, error } => {
                    return Err(PipelineError::Render {
                        source_path: self.source_path.to_path_buf(),
                        width,
                        destination,
                        source: error,
                    });
                }
                Rendered::Skipped => return Err(PipelineError::Cancelled { destination }),
            };

            self.sink
                .write(&rendition.filename, &rendition.bytes)
                .map_err(|e| PipelineError::SinkWrite {
                    width: rendition.width,
                    filename: rendition.filename.clone(),
                    destination,
                    source: e,
                })?;
            log::info!("created {}", rendition.filename);

            emit(
                self.events,
                PipelineEvent::RenditionWritten {
                    index: self.written.len() + 1,
                    total: self.total,
                    filename: rendition.filename.clone(),
                    width: rendition.width,
                    height: rendition.height,
                },
            );
            self.written.push(WrittenRendition {
                width: rendition.width,
                height: rendition.height,
                filename: rendition.filename,
            });
        }
        Ok(())
    }
}

fn emit(events: &Option<Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}
