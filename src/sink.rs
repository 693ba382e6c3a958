//! Output sinks: where renditions are persisted.
//!
//! Two variants share the [`Sink`] interface and are chosen once, when the
//! sink is opened, from a [`PackagingMode`]:
//!
//! ```text
//! Directory   <parent>/appiconizer 2026-10-19 14.03.27/icon_48.png
//!                                                     /icon_72.png ...
//! Archive     <parent>/appiconizer 2026-10-19 14.03.27.zip
//!                 icon_48.png, icon_72.png ...   (deflate entries)
//! ```
//!
//! ## Lifecycle
//!
//! `open_sink` acquires the resource, `write` stores one entry, and
//! [`Sink::close`] releases it. Closing consumes the sink, so a closed sink
//! cannot be written to. For archives, `close` writes the central directory;
//! an archive is only valid after a successful close.
//!
//! ## Collisions
//!
//! Opening never reuses an existing path: the directory is created with
//! `create_dir` and the archive with `create_new`, so a second run within the
//! same second fails instead of mixing outputs. Inside a directory, writing
//! an existing file name overwrites it. Inside an archive, a repeated entry
//! name is [`SinkError::DuplicateEntry`].
//!
//! ## Reproducible archives
//!
//! Every entry carries the same fixed modification time (the zip epoch,
//! 1980-01-01) and entries appear in write order, so identical inputs give
//! byte-identical archives.

use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),
}

/// How the renditions of one run are packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackagingMode {
    #[default]
    Directory,
    Archive,
}

/// Timestamp layout used in output names. Sorts lexically, no `:` so it is
/// a valid file name on every platform.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Output name without extension, e.g. `appiconizer 2026-10-19 14.03.27`.
pub fn output_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{} {}", prefix, timestamp.format(TIMESTAMP_FORMAT))
}

/// Full path the sink for `mode` will occupy.
pub fn destination_path(mode: PackagingMode, parent: &Path, name: &str) -> PathBuf {
    match mode {
        PackagingMode::Directory => parent.join(name),
        PackagingMode::Archive => parent.join(format!("{}.zip", name)),
    }
}

/// A place renditions are written to.
pub trait Sink {
    /// Directory or archive path being written.
    fn destination(&self) -> &Path;

    /// Store one entry.
    fn write(&mut self, filename: &str, bytes: &[u8]) -> Result<(), SinkError>;

    /// Release the resource, finalizing any pending metadata.
    fn close(self: Box<Self>) -> Result<PathBuf, SinkError>;
}

/// Open the sink for `mode` inside `parent`, creating `parent` if needed.
pub fn open_sink(
    mode: PackagingMode,
    parent: &Path,
    name: &str,
) -> Result<Box<dyn Sink>, SinkError> {
    fs::create_dir_all(parent)?;
    let destination = destination_path(mode, parent, name);
    let sink: Box<dyn Sink> = match mode {
        PackagingMode::Directory => Box::new(DirectorySink::open(destination)?),
        PackagingMode::Archive => Box::new(ArchiveSink::open(destination)?),
    };
    log::debug!("opened {:?} sink at {}", mode, sink.destination().display());
    Ok(sink)
}

// ============================================================================
// Directory
// ============================================================================

/// One file per rendition inside a freshly created directory.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn open(dir: PathBuf) -> Result<Self, SinkError> {
        fs::create_dir(&dir)?;
        Ok(Self { dir })
    }
}

impl Sink for DirectorySink {
    fn destination(&self) -> &Path {
        &self.dir
    }

    fn write(&mut self, filename: &str, bytes: &[u8]) -> Result<(), SinkError> {
        fs::write(self.dir.join(filename), bytes)?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<PathBuf, SinkError> {
        Ok(self.dir)
    }
}

// ============================================================================
// Archive
// ============================================================================

/// One deflate entry per rendition inside a single zip file.
pub struct ArchiveSink {
    path: PathBuf,
    writer: ZipWriter<BufWriter<File>>,
    entries: HashSet<String>,
}

impl ArchiveSink {
    pub fn open(path: PathBuf) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(Self {
            path,
            writer: ZipWriter::new(BufWriter::new(file)),
            entries: HashSet::new(),
        })
    }

    fn entry_options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644)
    }
}

impl Sink for ArchiveSink {
    fn destination(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, filename: &str, bytes: &[u8]) -> Result<(), SinkError> {
        if !self.entries.insert(filename.to_string()) {
            return Err(SinkError::DuplicateEntry(filename.to_string()));
        }
        self.writer.start_file(filename, Self::entry_options())?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<PathBuf, SinkError> {
        let Self {
            path,
            writer,
            entries,
        } = *self;
        let buffered = writer.finish()?;
        let mut file = buffered.into_inner().map_err(|e| e.into_error())?;
        file.flush()?;
        log::debug!("finalized {} ({} entries)", path.display(), entries.len());
        Ok(path)
    }
}
