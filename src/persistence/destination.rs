//! Destination capability probing.
//!
//! Atomic replacement needs a regular file (or a path that does not exist yet)
//! in a directory we can create a sibling in. Character devices, FIFOs and
//! sockets such as `/dev/stdout` cannot be renamed over, so they are written
//! in append mode instead.
//!
//! Anything under `/dev/` is a device regardless of what it resolves to.
//! `/dev/stdout` is a symlink into `/proc/self/fd`, so when the shell
//! redirects stdout to a file it would otherwise probe as a regular file and
//! get replaced by a temporary sibling created in `/dev`.

use std::fs;
use std::io;
use std::path::Path;

/// Paths under this directory are always written as devices.
const DEVICE_DIR: &str = "/dev";

/// How a destination path can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    /// A regular file or a path that does not exist yet. Supports atomic replace.
    Regular,
    /// A device, FIFO or socket. Append-only, no atomicity.
    Device,
}

impl DestinationKind {
    /// Probes `path` once, following symlinks. Paths under `/dev` are
    /// devices without looking at the filesystem.
    ///
    /// A directory is rejected with `io::ErrorKind::InvalidInput`.
    pub fn probe(path: &Path) -> io::Result<Self> {
        if path.starts_with(DEVICE_DIR) {
            return Ok(DestinationKind::Device);
        }
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(DestinationKind::Regular),
            Err(e) => return Err(e),
        };

        let file_type = metadata.file_type();
        if file_type.is_file() {
            Ok(DestinationKind::Regular)
        } else if file_type.is_dir() {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination is a directory",
            ))
        } else {
            Ok(DestinationKind::Device)
        }
    }

    /// Returns true if writes to this destination can be committed atomically.
    pub fn supports_atomic_replace(self) -> bool {
        matches!(self, DestinationKind::Regular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_path_is_regular() {
        let dir = tempdir().unwrap();
        let kind = DestinationKind::probe(&dir.path().join("new.json")).unwrap();
        assert_eq!(kind, DestinationKind::Regular);
        assert!(kind.supports_atomic_replace());
    }

    #[test]
    fn existing_file_is_regular() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, b"").unwrap();
        assert_eq!(DestinationKind::probe(&path).unwrap(), DestinationKind::Regular);
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempdir().unwrap();
        let err = DestinationKind::probe(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn dev_null_is_a_device() {
        let kind = DestinationKind::probe(Path::new("/dev/null")).unwrap();
        assert_eq!(kind, DestinationKind::Device);
        assert!(!kind.supports_atomic_replace());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn dev_path_resolving_to_a_regular_file_is_a_device() {
        use std::os::fd::AsRawFd;

        let dir = tempdir().unwrap();
        let file = fs::File::create(dir.path().join("redirected.txt")).unwrap();
        let alias = format!("/dev/fd/{}", file.as_raw_fd());

        assert!(fs::metadata(&alias).unwrap().is_file());
        assert_eq!(
            DestinationKind::probe(Path::new(&alias)).unwrap(),
            DestinationKind::Device
        );
    }

    #[test]
    fn dev_prefix_matches_whole_components() {
        let path = Path::new("/devices/history.json");
        assert_eq!(DestinationKind::probe(path).unwrap(), DestinationKind::Regular);
    }
}
