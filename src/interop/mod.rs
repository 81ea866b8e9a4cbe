//! Interoperability with shell-native history formats.

pub mod format;
pub mod import;

pub use format::{ListingOptions, listing_entry, write_bash_history, write_listing};
pub use import::{BashEntry, BashHistoryReader, IMPORT_SESSION_ID};
