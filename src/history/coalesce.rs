//! Collapsing of repeated commands.
//!
//! Identical command text (byte for byte, whitespace included) collapses to
//! its most recent occurrence. The surviving record reports success if any
//! occurrence succeeded, so a command that was fixed by retrying is not
//! remembered as failing.

use std::collections::HashMap;

use crate::types::Record;

/// Collapses duplicate commands into their most recent occurrence.
///
/// `records` must be ascending by time; the result is too. A kept record that
/// failed is replaced by a copy with exit code 0 if an older occurrence of
/// the same command succeeded.
pub fn coalesce(records: &[Record]) -> Vec<Record> {
    let mut kept: Vec<Record> = Vec::with_capacity(records.len());
    let mut index_by_command: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().rev() {
        match index_by_command.get(record.command.as_str()) {
            Some(&index) => {
                if !kept[index].succeeded() && record.succeeded() {
                    kept[index] = kept[index].clone().with_exit_code(0);
                }
            }
            None => {
                index_by_command.insert(&record.command, kept.len());
                kept.push(record.clone());
            }
        }
    }

    kept.reverse();
    kept
}
