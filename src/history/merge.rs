//! Reconciliation of many session files into one canonical history.
//!
//! # Merge Cycle
//!
//! 1. Lock the output path (blocks while another merge holds it)
//! 2. Read every input in the order given; any failure aborts before writing
//! 3. Stable sort ascending by timestamp
//! 4. Optionally coalesce, then optionally prune
//! 5. Write all records through the atomic writer and commit
//! 6. Unlock, whatever the outcome of the write
//!
//! A failed unlock is logged and never masks or invalidates the write result.

use std::path::Path;

use super::coalesce::coalesce;
use super::pruning::Pruner;
use crate::error::Result;
use crate::persistence::{
    AtomicFileWriter, DEFAULT_FILE_MODE, FileLock, RecordWriter, read_records,
};
use crate::types::Record;

/// Counts reported by a completed merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Records read across all inputs.
    pub read: usize,
    /// Records written to the output.
    pub written: usize,
}

/// The merge pipeline and its optional dedup/prune passes.
#[derive(Debug, Clone)]
pub struct Merger {
    coalesce: bool,
    pruner: Option<Pruner>,
    mode: u32,
}

impl Default for Merger {
    fn default() -> Self {
        Merger {
            coalesce: false,
            pruner: None,
            mode: DEFAULT_FILE_MODE,
        }
    }
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse duplicate commands after sorting.
    pub fn with_coalesce(mut self, coalesce: bool) -> Self {
        self.coalesce = coalesce;
        self
    }

    /// Prune with `pruner` after sorting (and coalescing, if enabled).
    pub fn with_pruner(mut self, pruner: Option<Pruner>) -> Self {
        self.pruner = pruner;
        self
    }

    /// Permission bits for a newly written output.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Sorts, then applies the enabled passes. Touches no files.
    pub fn reconcile(&self, mut records: Vec<Record>) -> Vec<Record> {
        sort_by_time(&mut records);
        if self.coalesce {
            records = coalesce(&records);
        }
        if let Some(pruner) = &self.pruner {
            records = pruner.prune(&records);
        }
        records
    }

    /// Merges `inputs` into `output` under the output's lock.
    ///
    /// Zero inputs produce an empty output file.
    pub fn merge<P: AsRef<Path>>(&self, output: &Path, inputs: &[P]) -> Result<MergeSummary> {
        let lock = FileLock::lock(output)?;

        let result = self.merge_locked(output, inputs);

        if let Err(e) = lock.unlock() {
            tracing::warn!(output = %output.display(), error = %e, "failed to release merge lock");
        }

        if let Ok(summary) = &result {
            tracing::info!(
                output = %output.display(),
                inputs = inputs.len(),
                read = summary.read,
                written = summary.written,
                "merge complete"
            );
        }
        result
    }

    fn merge_locked<P: AsRef<Path>>(&self, output: &Path, inputs: &[P]) -> Result<MergeSummary> {
        let records = read_inputs(inputs)?;
        let read = records.len();

        let records = self.reconcile(records);
        write_records(output, &records, self.mode)?;

        Ok(MergeSummary {
            read,
            written: records.len(),
        })
    }
}

/// Merges with no dedup or pruning.
pub fn merge<P: AsRef<Path>>(output: &Path, inputs: &[P]) -> Result<MergeSummary> {
    Merger::default().merge(output, inputs)
}

/// Reads and concatenates all inputs in the order given.
pub fn read_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(1024);
    for input in inputs {
        records.extend(read_records(input.as_ref())?);
    }
    Ok(records)
}

/// Stable ascending sort by timestamp; equal timestamps keep input order.
pub fn sort_by_time(records: &mut [Record]) {
    records.sort_by_key(|r| r.timestamp);
}

/// Replaces `output` with `records`, one JSON line each.
pub fn write_records(output: &Path, records: &[Record], mode: u32) -> Result<()> {
    let mut writer = RecordWriter::new(AtomicFileWriter::create(output, mode)?, output);
    for record in records {
        writer.write_record(record)?;
    }
    writer.into_inner().commit()
}
