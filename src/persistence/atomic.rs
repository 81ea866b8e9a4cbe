//! All-or-nothing replacement of a destination file.
//!
//! Regular destinations use the write-to-temp-then-rename pattern:
//! 1. Create a temporary file next to the destination
//! 2. Write everything through a buffer
//! 3. fsync the temporary file
//! 4. Rename it over the destination
//! 5. fsync the directory
//!
//! Until step 4 completes the destination keeps its prior content. Dropping
//! the writer without calling [`AtomicFileWriter::commit`] discards the
//! temporary file.
//!
//! Device destinations (see [`DestinationKind`]) cannot be replaced, so they
//! are opened in append mode and every write is visible immediately.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::destination::DestinationKind;
use super::fsync::{fsync_dir, fsync_file, parent_dir};
use crate::error::{HistoryError, Result};

/// Permission bits for files created by histrionic.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// A writer for a destination path, selected once by probing the destination.
#[derive(Debug)]
pub enum AtomicFileWriter {
    /// Buffered writes to a temporary sibling, renamed into place on commit.
    Replace(ReplaceWriter),
    /// Unbuffered appends to a device.
    Append(AppendWriter),
}

/// The atomic-replace variant.
#[derive(Debug)]
pub struct ReplaceWriter {
    path: PathBuf,
    temp: BufWriter<NamedTempFile>,
}

/// The append-only variant used for devices.
#[derive(Debug)]
pub struct AppendWriter {
    path: PathBuf,
    file: File,
}

impl AtomicFileWriter {
    /// Opens a writer for `path`. New content gets permission bits `mode`.
    pub fn create(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let kind = DestinationKind::probe(&path)
            .map_err(|e| HistoryError::io("inspecting destination", &path, e))?;

        if kind.supports_atomic_replace() {
            let temp = create_temp_sibling(&path, mode)?;
            return Ok(AtomicFileWriter::Replace(ReplaceWriter {
                path,
                temp: BufWriter::new(temp),
            }));
        }

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| HistoryError::io("opening for append", &path, e))?;
        Ok(AtomicFileWriter::Append(AppendWriter { path, file }))
    }

    /// The destination path.
    pub fn path(&self) -> &Path {
        match self {
            AtomicFileWriter::Replace(w) => &w.path,
            AtomicFileWriter::Append(w) => &w.path,
        }
    }

    /// Returns true if [`commit`](Self::commit) replaces the destination atomically.
    pub fn is_atomic(&self) -> bool {
        matches!(self, AtomicFileWriter::Replace(_))
    }

    /// Makes everything written so far visible at the destination.
    ///
    /// On error the destination keeps its prior content (atomic variant only).
    pub fn commit(self) -> Result<()> {
        match self {
            AtomicFileWriter::Replace(w) => w.commit(),
            AtomicFileWriter::Append(mut w) => w
                .file
                .flush()
                .map_err(|e| HistoryError::io("flushing", &w.path, e)),
        }
    }

    /// The temporary file backing an atomic writer.
    #[cfg(test)]
    pub(crate) fn temp_path(&self) -> Option<&Path> {
        match self {
            AtomicFileWriter::Replace(w) => Some(w.temp.get_ref().path()),
            AtomicFileWriter::Append(_) => None,
        }
    }
}

impl ReplaceWriter {
    fn commit(self) -> Result<()> {
        let ReplaceWriter { path, temp } = self;

        let temp = temp
            .into_inner()
            .map_err(|e| HistoryError::io("flushing temporary file for", &path, e.into_error()))?;
        fsync_file(temp.as_file())
            .map_err(|e| HistoryError::io("syncing temporary file for", &path, e))?;

        // The commit point. A failed persist drops (and deletes) the temp file.
        temp.persist(&path)
            .map_err(|e| HistoryError::io("renaming temporary file onto", &path, e.error))?;

        let dir = parent_dir(&path);
        fsync_dir(dir).map_err(|e| HistoryError::io("syncing directory", dir, e))?;

        tracing::debug!(path = %path.display(), "committed atomic write");
        Ok(())
    }
}

fn create_temp_sibling(path: &Path, mode: u32) -> Result<NamedTempFile> {
    let dir = parent_dir(path);
    let prefix = match path.file_name() {
        Some(name) => format!(".{}.", name.to_string_lossy()),
        None => ".histrionic.".to_string(),
    };

    let temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| HistoryError::io("creating temporary file for", path, e))?;

    set_mode(temp.as_file(), mode)
        .map_err(|e| HistoryError::io("setting permissions on temporary file for", path, e))?;

    Ok(temp)
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

impl Write for AtomicFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            AtomicFileWriter::Replace(w) => w.temp.write(buf),
            AtomicFileWriter::Append(w) => w.file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            AtomicFileWriter::Replace(w) => w.temp.flush(),
            AtomicFileWriter::Append(w) => w.file.flush(),
        }
    }
}
