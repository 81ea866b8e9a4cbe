//! Core domain types.

pub mod record;

pub use record::{Record, now_seconds, timestamp_from_unix};
