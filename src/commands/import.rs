//! Importing a bash history file as records.
//!
//! Records are streamed straight into the atomic writer, so a parse error part
//! way through leaves the destination as it was.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::error::{HistoryError, Result};
use crate::interop::BashHistoryReader;
use crate::persistence::{AtomicFileWriter, DEFAULT_FILE_MODE, RecordWriter};

/// Options for [`import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Bash history file written with `HISTTIMEFORMAT` set.
    pub history_file: PathBuf,
    pub output: PathBuf,
    /// Hostname attached to every imported record.
    pub hostname: String,
}

/// Converts the history file; returns the number of records written.
pub fn import(options: &ImportOptions) -> Result<usize> {
    let source = File::open(&options.history_file)
        .map_err(|e| HistoryError::io("opening", &options.history_file, e))?;
    let entries = BashHistoryReader::new(
        BufReader::new(source),
        options.history_file.display().to_string(),
    );

    let mut writer = RecordWriter::new(
        AtomicFileWriter::create(&options.output, DEFAULT_FILE_MODE)?,
        &options.output,
    );
    let mut count = 0;
    for entry in entries {
        let record = entry?.into_record(&options.hostname)?;
        writer.write_record(&record)?;
        count += 1;
    }
    writer.into_inner().commit()?;

    tracing::debug!(
        source = %options.history_file.display(),
        records = count,
        "import complete"
    );
    Ok(count)
}
