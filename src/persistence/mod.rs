//! Crash-safe storage of history records.
//!
//! # Architecture
//!
//! - **Streams**: per-session files of JSON records, appended one line at a time
//! - **Atomic writer**: merge and dump outputs are written to a temporary
//!   sibling and renamed into place, so readers see either the old or the new
//!   file, never a partial one
//! - **Locks**: an advisory lock per output path serializes whole merge cycles
//!   across processes
//!
//! # Crash Safety
//!
//! - Appends: one `write_all` per record on an `O_APPEND` descriptor, then fsync
//! - Replacement: temp file fsync, rename, directory fsync
//! - Devices such as `/dev/stdout` are append-only and get none of the above

pub mod atomic;
pub mod destination;
pub mod fsync;
pub mod lock;
pub mod stream;

pub use atomic::{AtomicFileWriter, DEFAULT_FILE_MODE};
pub use destination::DestinationKind;
pub use fsync::{fsync_dir, fsync_file};
pub use lock::{FileLock, lock_path_for};
pub use stream::{
    RecordReader, RecordWriter, append_record, encode_line, read_all, read_records,
};
