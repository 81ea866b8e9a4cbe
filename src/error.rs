//! Error types for history recording and reconciliation.
//!
//! Every failure aborts the operation that hit it. Nothing here is retried:
//! the output side is protected by the atomic writer, and the input side is
//! fully read before anything is written.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced while reading, writing, locking, or reconciling history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// An open, read, write, sync, or rename failed.
    #[error("I/O error while {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stream object did not decode into a record.
    ///
    /// A truncated trailing object is reported here as well.
    #[error("malformed record in {source_name} at line {line}, column {column}: {source}")]
    MalformedRecord {
        source_name: String,
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The advisory lock could not be acquired or released.
    #[error("lock error on {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A bash history file is not a sequence of `#<unix>` / command pairs.
    #[error("malformed bash history in {source_name} at line {line}: {reason}")]
    MalformedHistory {
        source_name: String,
        line: usize,
        reason: String,
    },

    /// A unix timestamp outside the representable range.
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    /// A record could not be serialized.
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Invalid pruning configuration.
    #[error("invalid prune configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Problems with a [`PruneConfig`](crate::history::PruneConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two limit entries can match the same command, so which one is charged
    /// would depend on table order.
    #[error("limit prefixes {first:?} and {second:?} overlap")]
    OverlappingLimitPrefixes { first: String, second: String },

    /// `HISTRIONIC_PRUNE_LIMIT` is set but is not a non-negative integer.
    #[error("HISTRIONIC_PRUNE_LIMIT must be a non-negative integer, got {0:?}")]
    InvalidLimit(String),
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

impl HistoryError {
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        HistoryError::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn lock(path: impl AsRef<Path>, source: io::Error) -> Self {
        HistoryError::Lock {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns true for errors caused by input that failed to parse.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            HistoryError::MalformedRecord { .. } | HistoryError::MalformedHistory { .. }
        )
    }
}
