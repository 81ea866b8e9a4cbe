//! Rendering a merged, filtered view of one or more histories.
//!
//! Dump reads its inputs but never rewrites them; only the destination is
//! written, atomically unless it is a device such as `/dev/stdout`.

use std::path::PathBuf;

use crate::error::{HistoryError, Result};
use crate::history::{Merger, Pruner, read_inputs};
use crate::interop::{ListingOptions, write_bash_history, write_listing};
use crate::persistence::{AtomicFileWriter, DEFAULT_FILE_MODE};
use crate::types::Record;

/// Output format for [`dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Listing(ListingOptions),
    BashHistory,
}

/// Options for [`dump`].
#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub coalesce: bool,
    pub prune: Option<Pruner>,
    /// Keep only records from this host (or with no host recorded).
    pub hostname: Option<String>,
    pub format: DumpFormat,
}

/// Keeps records whose hostname is empty or equal to `hostname`.
pub fn filter_hostname(records: Vec<Record>, hostname: &str) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| r.hostname.is_empty() || r.hostname == hostname)
        .collect()
}

/// Writes the reconciled view of `inputs`; returns the number of records written.
pub fn dump(options: &DumpOptions) -> Result<usize> {
    let merger = Merger::new()
        .with_coalesce(options.coalesce)
        .with_pruner(options.prune.clone());

    let mut records = merger.reconcile(read_inputs(&options.inputs)?);
    if let Some(hostname) = options.hostname.as_deref().filter(|h| !h.is_empty()) {
        records = filter_hostname(records, hostname);
    }

    let mut writer = AtomicFileWriter::create(&options.output, DEFAULT_FILE_MODE)?;
    let rendered = match options.format {
        DumpFormat::Listing(listing) => write_listing(&mut writer, &records, listing),
        DumpFormat::BashHistory => write_bash_history(&mut writer, &records),
    };
    rendered.map_err(|e| HistoryError::io("writing", &options.output, e))?;
    writer.commit()?;

    tracing::debug!(
        output = %options.output.display(),
        records = records.len(),
        "dump complete"
    );
    Ok(records.len())
}
