//! Recording one command execution.

use std::io::Read;
use std::path::PathBuf;

use crate::error::{HistoryError, Result};
use crate::persistence::append_record;
use crate::types::{Record, now_seconds, timestamp_from_unix};

/// Options for [`append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOptions {
    /// Session file to append to. Created if missing.
    pub output: PathBuf,
    pub hostname: String,
    pub session_id: String,
    pub exit_code: i64,
    /// Unix seconds to record instead of the current time.
    pub timestamp: Option<i64>,
}

/// Reads the command text from `command_source`, trims it, and appends one
/// record to the session file.
pub fn append<R: Read>(options: &AppendOptions, mut command_source: R) -> Result<Record> {
    let mut raw = Vec::new();
    command_source
        .read_to_end(&mut raw)
        .map_err(|e| HistoryError::io("reading command from", "standard input", e))?;
    let command = String::from_utf8_lossy(&raw).trim().to_string();

    let timestamp = match options.timestamp {
        Some(seconds) => timestamp_from_unix(seconds)?,
        None => now_seconds(),
    };

    let record = Record::new(timestamp, command)
        .with_session_id(options.session_id.as_str())
        .with_hostname(options.hostname.as_str())
        .with_exit_code(options.exit_code);

    append_record(&options.output, &record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::read_records;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn options(output: PathBuf) -> AppendOptions {
        AppendOptions {
            output,
            hostname: "box".to_string(),
            session_id: "s-1".to_string(),
            exit_code: 0,
            timestamp: Some(1_600_000_000),
        }
    }

    #[test]
    fn appends_trimmed_command() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path().join("session.json"));

        let record = append(&opts, Cursor::new("  git status \n")).unwrap();

        assert_eq!(record.command, "git status");
        assert_eq!(record.unix_seconds(), 1_600_000_000);
        assert_eq!(read_records(&opts.output).unwrap(), vec![record]);
    }

    #[test]
    fn carries_session_host_and_exit_code() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path().join("session.json"));
        opts.exit_code = 127;

        append(&opts, Cursor::new("nosuchcmd")).unwrap();
        append(&opts, Cursor::new("ls")).unwrap();

        let records = read_records(&opts.output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].exit_code, 127);
        assert_eq!(records[0].session_id, "s-1");
        assert_eq!(records[0].hostname, "box");
    }

    #[test]
    fn defaults_to_now() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path().join("session.json"));
        opts.timestamp = None;

        let before = chrono::Utc::now().timestamp();
        let record = append(&opts, Cursor::new("ls")).unwrap();
        let after = chrono::Utc::now().timestamp();

        assert!(before <= record.unix_seconds() && record.unix_seconds() <= after);
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path().join("session.json"));
        opts.timestamp = Some(i64::MAX);

        let err = append(&opts, Cursor::new("ls")).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidTimestamp(_)));
        assert!(!opts.output.exists());
    }
}
