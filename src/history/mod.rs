//! Reconciliation of per-session histories.
//!
//! Sessions are merged into one time-ordered history, optionally with
//! duplicate commands collapsed ([`coalesce`]) and noisy commands capped or
//! dropped ([`Pruner`]). Neither pass touches files; only [`Merger::merge`]
//! writes, under the output's lock.

pub mod coalesce;
pub mod merge;
pub mod pruning;

pub use coalesce::coalesce;
pub use merge::{MergeSummary, Merger, merge, read_inputs, sort_by_time, write_records};
pub use pruning::{
    DEFAULT_EXCLUDE, DEFAULT_LIMIT, DEFAULT_PER_COMMAND_LIMIT, PruneConfig, Pruner,
    has_command_prefix,
};
