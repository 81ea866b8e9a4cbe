//! Parsing of bash's timestamped history files.
//!
//! With `HISTTIMEFORMAT` set, bash writes each entry as a `#<unix-seconds>`
//! comment line followed by the command line. Anything else is rejected
//! rather than guessed at.

use std::io::BufRead;

use crate::error::{HistoryError, Result};
use crate::types::{Record, timestamp_from_unix};

/// Session id given to every imported record.
pub const IMPORT_SESSION_ID: &str = "import";

/// One parsed history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BashEntry {
    pub unix_seconds: i64,
    pub command: String,
}

impl BashEntry {
    /// Converts to a record with exit code 0 and the import session id.
    pub fn into_record(self, hostname: &str) -> Result<Record> {
        let timestamp = timestamp_from_unix(self.unix_seconds)?;
        Ok(Record::new(timestamp, self.command)
            .with_session_id(IMPORT_SESSION_ID)
            .with_hostname(hostname))
    }
}

/// Streaming parser over a bash history source.
pub struct BashHistoryReader<R: BufRead> {
    reader: R,
    source_name: String,
    line: usize,
    failed: bool,
}

impl<R: BufRead> BashHistoryReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        BashHistoryReader {
            reader,
            source_name: source_name.into(),
            line: 0,
            failed: false,
        }
    }

    /// Reads one line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| HistoryError::io("reading", &self.source_name, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    fn malformed(&self, reason: impl Into<String>) -> HistoryError {
        HistoryError::MalformedHistory {
            source_name: self.source_name.clone(),
            line: self.line,
            reason: reason.into(),
        }
    }

    fn next_entry(&mut self) -> Result<Option<BashEntry>> {
        let Some(stamp_line) = self.read_line()? else {
            return Ok(None);
        };
        let Some(digits) = stamp_line.strip_prefix('#') else {
            return Err(self.malformed(format!("bad timestamp comment {stamp_line:?}")));
        };
        let unix_seconds: i64 = digits
            .trim()
            .parse()
            .map_err(|_| self.malformed(format!("bad timestamp comment {stamp_line:?}")))?;

        let Some(command_line) = self.read_line()? else {
            return Err(self.malformed("timestamp without a command"));
        };

        Ok(Some(BashEntry {
            unix_seconds,
            command: command_line.trim().to_string(),
        }))
    }
}

impl<R: BufRead> Iterator for BashHistoryReader<R> {
    type Item = Result<BashEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_entry().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}
