//! The operations behind each `histrionic` subcommand.
//!
//! - `append`: record one command execution in a session file
//! - `dump`: render a merged, optionally filtered view
//! - `import`: convert a bash history file to records
//! - `merge`: reconcile session files into one history file

pub mod append;
pub mod dump;
pub mod import;
pub mod merge;

pub use append::{AppendOptions, append};
pub use dump::{DumpFormat, DumpOptions, dump, filter_hostname};
pub use import::{ImportOptions, import};
pub use merge::{MergeOptions, merge};
