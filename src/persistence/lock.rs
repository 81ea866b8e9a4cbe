//! Advisory, cross-process mutual exclusion keyed by destination path.
//!
//! The lock is `flock(2)` based (via `fs2`), so it only excludes processes
//! that take the same lock; writers that bypass it are not stopped.
//!
//! # Lock File
//!
//! For a regular destination the lock is held on a sidecar file
//! `<destination>.lock`. The destination itself is replaced by rename on
//! every merge, and a lock held on the old inode would not exclude a process
//! that opens the new one. A device destination is never renamed, so the
//! device itself is locked.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::destination::DestinationKind;
use crate::error::{HistoryError, Result};

/// An exclusive advisory lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Blocks until the lock associated with `target` is held.
    ///
    /// Fails if the lock file cannot be opened, e.g. because the directory
    /// holding `target` does not exist.
    pub fn lock(target: impl AsRef<Path>) -> Result<Self> {
        let (file, path) = open_lock_file(target.as_ref())?;
        file.lock_exclusive()
            .map_err(|e| HistoryError::lock(&path, e))?;
        tracing::debug!(lock = %path.display(), "acquired lock");
        Ok(FileLock { file, path })
    }

    /// Takes the lock if it is free; returns `Ok(None)` if another holder has it.
    pub fn try_lock(target: impl AsRef<Path>) -> Result<Option<Self>> {
        let (file, path) = open_lock_file(target.as_ref())?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(FileLock { file, path })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(HistoryError::lock(&path, e)),
        }
    }

    /// Releases the lock.
    pub fn unlock(self) -> Result<()> {
        FileExt::unlock(&self.file).map_err(|e| HistoryError::lock(&self.path, e))?;
        tracing::debug!(lock = %self.path.display(), "released lock");
        Ok(())
    }

    /// The file the lock is held on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The file whose lock guards writes to `target`.
pub fn lock_path_for(target: &Path) -> io::Result<PathBuf> {
    if !DestinationKind::probe(target)?.supports_atomic_replace() {
        return Ok(target.to_path_buf());
    }
    let mut name: OsString = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("histrionic"));
    name.push(".lock");
    Ok(target.with_file_name(name))
}

fn open_lock_file(target: &Path) -> Result<(File, PathBuf)> {
    let path = lock_path_for(target).map_err(|e| HistoryError::lock(target, e))?;

    let mut options = OpenOptions::new();
    if path == target {
        // Device: must already exist, never truncate.
        options.append(true);
    } else {
        options.create(true).truncate(false).write(true);
    }

    let file = options
        .open(&path)
        .map_err(|e| HistoryError::lock(&path, e))?;
    Ok((file, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn lock_path_is_a_sidecar_for_regular_files() {
        let path = lock_path_for(Path::new("/tmp/histrionic/history.json")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/histrionic/history.json.lock"));
    }

    #[cfg(unix)]
    #[test]
    fn lock_path_is_the_device_itself() {
        let path = lock_path_for(Path::new("/dev/null")).unwrap();
        assert_eq!(path, PathBuf::from("/dev/null"));
    }

    #[test]
    fn lock_and_unlock() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("history.json");

        let lock = FileLock::lock(&target).unwrap();
        assert_eq!(lock.path(), dir.path().join("history.json.lock"));
        lock.unlock().unwrap();

        // Free again after unlock
        let again = FileLock::try_lock(&target).unwrap();
        assert!(again.is_some());
    }

    #[test]
    fn try_lock_reports_contention() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("history.json");

        let held = FileLock::lock(&target).unwrap();
        assert!(FileLock::try_lock(&target).unwrap().is_none());

        drop(held);
        assert!(FileLock::try_lock(&target).unwrap().is_some());
    }

    #[test]
    fn second_locker_blocks_until_release() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("history.json");

        let held = FileLock::lock(&target).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter_target = target.clone();
        let waiter = thread::spawn(move || {
            let lock = FileLock::lock(&waiter_target).unwrap();
            tx.send(()).unwrap();
            lock.unlock().unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        held.unlock().unwrap();
        rx.recv_timeout(Duration::from_secs(10)).unwrap();
        waiter.join().unwrap();
    }

    #[test]
    fn missing_directory_is_a_lock_error() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing/history.json");

        let err = FileLock::lock(&target).unwrap_err();
        assert!(matches!(err, HistoryError::Lock { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn redirected_dev_path_is_locked_directly() {
        use std::os::fd::AsRawFd;

        let dir = tempdir().unwrap();
        let file = File::create(dir.path().join("out.txt")).unwrap();
        let alias = PathBuf::from(format!("/dev/fd/{}", file.as_raw_fd()));

        assert_eq!(lock_path_for(&alias).unwrap(), alias);
        FileLock::lock(&alias).unwrap().unlock().unwrap();
    }
}
