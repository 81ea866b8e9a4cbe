//! Histrionic - shell history recorded per session and merged into one file.
//!
//! Each shell session appends JSON records to its own file; a periodic merge
//! folds those files into a canonical history under an exclusive lock, with
//! optional coalescing and pruning along the way.

pub mod cli;
pub mod commands;
pub mod error;
pub mod history;
pub mod interop;
pub mod persistence;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use error::{ConfigError, HistoryError, Result};
